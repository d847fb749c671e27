//! Tests for `src/credentials.rs`.

use std::collections::BTreeMap;

use bazaar::credentials::{load_credentials, Credentials};

fn creds(pairs: &[(&str, &str)]) -> Credentials {
    Credentials::from_map(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<BTreeMap<_, _>>(),
    )
}

#[test]
fn blank_values_are_absent() {
    let c = creds(&[("BAZAAR_BOT_TOKEN", "   "), ("OTHER", "x")]);
    assert_eq!(c.get("BAZAAR_BOT_TOKEN"), None);
    assert_eq!(c.get("OTHER"), Some("x"));
    assert_eq!(c.get("MISSING"), None);
}

#[test]
fn dotenv_value_wins_over_environment() {
    let c = creds(&[("BAZAAR_BOT_TOKEN", "from-file")]);
    let token = c
        .require_with("BAZAAR_BOT_TOKEN", |_| Some("from-env".to_owned()))
        .expect("token present");
    assert_eq!(token, "from-file");
}

#[test]
fn environment_is_the_fallback() {
    let c = Credentials::default();
    let token = c
        .require_with("BAZAAR_BOT_TOKEN", |key| {
            (key == "BAZAAR_BOT_TOKEN").then(|| "from-env".to_owned())
        })
        .expect("token present");
    assert_eq!(token, "from-env");
}

#[test]
fn missing_secret_names_the_key() {
    let c = Credentials::default();
    let err = c
        .require_with("BAZAAR_BOT_TOKEN", |_| Some(String::new()))
        .expect_err("blank env value must not count");
    assert!(err.to_string().contains("BAZAAR_BOT_TOKEN"));
}

#[test]
fn debug_output_redacts_values() {
    let c = creds(&[("BAZAAR_BOT_TOKEN", "123:secret")]);
    let debug = format!("{c:?}");
    assert!(debug.contains("BAZAAR_BOT_TOKEN"));
    assert!(!debug.contains("123:secret"));
    assert!(debug.contains("[REDACTED]"));
}

#[test]
fn missing_file_yields_empty_credentials() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let c = load_credentials(&dir.path().join(".env")).expect("missing file is fine");
    assert_eq!(c.get("BAZAAR_BOT_TOKEN"), None);
}

#[test]
fn env_file_is_parsed() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join(".env");
    std::fs::write(
        &path,
        "# bot secrets\nBAZAAR_BOT_TOKEN=123:abc\nQUOTED=\"hello world\"\n",
    )
    .expect("should write .env");

    let c = load_credentials(&path).expect("should parse");
    assert_eq!(c.get("BAZAAR_BOT_TOKEN"), Some("123:abc"));
    assert_eq!(c.get("QUOTED"), Some("hello world"));
}
