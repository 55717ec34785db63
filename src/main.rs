use clap::Parser;

use ordergate::adapter::inbound::cli::{self, command::Cli};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
