use std::io::Write;

use tempfile::NamedTempFile;

/// Write `contents` to a temp `.toml` file removed on drop.
pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("ordergate-config-test-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file.flush().expect("flush temp config");
    file
}
