use std::fs;
use std::net::TcpListener;
use std::process::Command;
use tempfile::tempdir;

fn converter() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ypbank_mt940_sek2eur"));
    cmd.env_remove("EXCHANGE_API_KEY").env_remove("EXCHANGE_API_URL");
    cmd
}

#[test]
fn count_mode_prints_transaction_count() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.mt940");
    let mut text = String::from(":20:X\n:25:123SEK\n:60F:C240101SEK1,00\n");
    for day in 1..=5 {
        text.push_str(&format!(":61:2401{:02}C1,00NTRFREF{}\n:86:Entry {}\n", day, day, day));
    }
    text.push_str(":62F:C240131SEK6,00\n");
    fs::write(&input, text).unwrap();

    let out = converter().arg(&input).arg("--count").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("The number of transactions in the statement: 5"));
    assert!(!dir.path().join("converted_statement.mt940").exists());
}

#[test]
fn missing_path_prints_usage() {
    let out = converter().output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn convert_without_api_key_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.mt940");
    fs::write(&input, ":20:X\n").unwrap();

    let out = converter().arg(&input).current_dir(dir.path()).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("EXCHANGE_API_KEY"));
    assert!(!dir.path().join("converted_statement.mt940").exists());
}

#[test]
fn api_settings_read_from_dotenv_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("statement.mt940");
    fs::write(&input, ":20:X\n:61:240105C1,00NTRFREF\n").unwrap();

    // Nothing listens on this port, so the lookup itself fails
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let api_url = format!("http://{}/v6", listener.local_addr().unwrap());
    drop(listener);
    fs::write(
        dir.path().join(".env"),
        format!("EXCHANGE_API_KEY=from-dotenv\nEXCHANGE_API_URL={}\n", api_url),
    )
    .unwrap();

    let out = converter().arg(&input).current_dir(dir.path()).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Rate lookup failed"), "{stderr}");
    assert!(!stderr.contains("Configuration error"), "{stderr}");
    assert!(!dir.path().join("converted_statement.mt940").exists());
}
