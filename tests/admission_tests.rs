mod support;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ordergate::application::admission::{AdmissionRejection, AdmissionRequest};
use ordergate::application::idempotency::random_key;
use ordergate::domain::{OrderStatus, Portfolio, Side, VenueId, VetoReason};
use ordergate::infrastructure::bootstrap::{build_paper, ControlPlane};
use ordergate::port::Ledger;
use ordergate::testkit::config::minimal;
use ordergate::testkit::domain::{decision, safe_decision};
use rust_decimal_macros::dec;
use support::epoch_secs;
use tokio::sync::Barrier;

fn plane() -> ControlPlane {
    build_paper(&minimal())
}

fn request(now: DateTime<Utc>) -> AdmissionRequest {
    let ts = epoch_secs(now);
    AdmissionRequest {
        symbol: "BTCUSDT".into(),
        side: Side::Buy,
        qty: dec!(0.002),
        px: dec!(50000),
        tick_size: dec!(0.1),
        intent_ts_ms: now.timestamp_millis(),
        event_ts: ts - 0.02,
        ingest_ts: ts - 0.01,
        decision: safe_decision(),
        client_key: None,
    }
}

fn portfolio() -> Portfolio {
    Portfolio::flat(dec!(100000))
}

#[tokio::test]
async fn admitted_order_is_acknowledged_on_the_routed_venue() {
    let plane = plane();
    let now = Utc::now();
    let outcome = plane
        .admission
        .admit(request(now), &portfolio(), now)
        .await
        .unwrap();

    let order = outcome.order().expect("admitted");
    assert_eq!(order.status(), OrderStatus::Ack);
    assert_eq!(order.venue().as_str(), "binance");
}

#[tokio::test]
async fn identical_intents_racing_admit_once() {
    let plane = Arc::new(plane());
    let now = Utc::now();
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let plane = Arc::clone(&plane);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                plane
                    .admission
                    .admit(request(now), &portfolio(), now)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut admitted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap().rejection() {
            None => admitted += 1,
            Some(AdmissionRejection::Duplicate) => duplicates += 1,
            Some(other) => panic!("unexpected rejection {other}"),
        }
    }
    assert_eq!((admitted, duplicates), (1, 1));
}

#[tokio::test]
async fn random_keys_bypass_deduplication() {
    let plane = plane();
    let now = Utc::now();
    for _ in 0..3 {
        let mut retry = request(now);
        retry.client_key = Some(random_key());
        let outcome = plane.admission.admit(retry, &portfolio(), now).await.unwrap();
        assert!(outcome.order().is_some());
    }
}

#[tokio::test]
async fn skewed_event_is_turned_away() {
    let plane = plane();
    let now = Utc::now();
    let mut skewed = request(now);
    skewed.event_ts = skewed.ingest_ts - 0.3;

    let outcome = plane.admission.admit(skewed, &portfolio(), now).await.unwrap();
    assert_eq!(outcome.rejection(), Some(AdmissionRejection::Skewed));
}

#[tokio::test]
async fn drawdown_brake_vetoes() {
    let plane = plane();
    let now = Utc::now();
    let drawn_down = Portfolio {
        drawdown_nav: dec!(0.07),
        ..portfolio()
    };

    let outcome = plane
        .admission
        .admit(request(now), &drawn_down, now)
        .await
        .unwrap();
    assert_eq!(
        outcome.rejection(),
        Some(AdmissionRejection::Vetoed(VetoReason::MddBrake))
    );
}

#[tokio::test]
async fn vetoed_intent_never_reaches_the_ledger() {
    let plane = plane();
    let now = Utc::now();
    let mut risky = request(now);
    risky.decision = decision(dec!(0.01), dec!(100), 0);

    let outcome = plane.admission.admit(risky, &portfolio(), now).await.unwrap();
    assert!(outcome.order().is_none());
    assert!(plane.oms.ledger().list_open().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_venue_is_not_routed_to() {
    let plane = plane();
    plane.registry.set_reachable(&VenueId::from("binance"), false);
    let now = Utc::now();

    let outcome = plane
        .admission
        .admit(request(now), &portfolio(), now)
        .await
        .unwrap();
    assert_eq!(outcome.rejection(), Some(AdmissionRejection::NoEligibleVenue));
}
