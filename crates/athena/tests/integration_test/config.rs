//! Tests for AthenaConfig and Credentials: environment loading and profiles.

use std::env;
use std::sync::Mutex;

use athena_fetch::*;

// Env-based tests must run serially to avoid interfering with each other.
static ENV_LOCK: Mutex<()> = Mutex::new(());

// Helper: clear all ATHENA_*, AWS_* and profile env vars the loaders read.
fn clear_env() {
    let keys = [
        "ATHENA_FETCH_PROFILE",
        "ATHENA_REGION",
        "ATHENA_DATABASE",
        "ATHENA_WORKGROUP",
        "ATHENA_OUTPUT_LOCATION",
        "ATHENA_RESULT_BUCKET",
        "ATHENA_RESULT_PREFIX",
        "ATHENA_POLL_INTERVAL_SECONDS",
        "ATHENA_TIMEOUT_SECONDS",
        "AWS_REGION",
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
        "TEST_ATHENA_DATABASE",
        "TEST_ATHENA_OUTPUT_LOCATION",
        "TEST_ATHENA_REGION",
        "TEST_AWS_ACCESS_KEY_ID",
        "TEST_AWS_SECRET_ACCESS_KEY",
    ];
    for k in keys {
        env::remove_var(k);
    }
}

#[test]
fn test_config_from_env() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();

    env::set_var("ATHENA_DATABASE", "analytics");
    env::set_var("ATHENA_WORKGROUP", "custom");
    env::set_var("ATHENA_OUTPUT_LOCATION", "s3://my-bucket/results/");
    env::set_var("ATHENA_RESULT_BUCKET", "my-bucket");
    env::set_var("ATHENA_RESULT_PREFIX", "results");
    env::set_var("ATHENA_POLL_INTERVAL_SECONDS", "3");
    env::set_var("ATHENA_TIMEOUT_SECONDS", "600");

    let cfg = AthenaConfig::from_env();

    assert_eq!(cfg.database, "analytics");
    assert_eq!(cfg.workgroup.as_deref(), Some("custom"));
    assert_eq!(cfg.output_location, "s3://my-bucket/results/");
    assert_eq!(cfg.poll_interval_seconds, 3);
    assert_eq!(cfg.timeout_seconds, Some(600));
    assert!(cfg.validate().is_ok());

    let location = ResultLocation::for_query(&cfg, "abc");
    assert_eq!(location.uri(), "s3://my-bucket/results/abc.csv");

    clear_env();
}

#[test]
fn test_config_profile() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();

    env::set_var("ATHENA_DATABASE", "base_db");
    env::set_var("ATHENA_FETCH_PROFILE", "test");
    env::set_var("TEST_ATHENA_DATABASE", "test_db");
    env::set_var("TEST_ATHENA_OUTPUT_LOCATION", "s3://test-bucket/");

    let cfg = AthenaConfig::from_env();

    // Profile name is upper-cased before prefixing.
    assert_eq!(cfg.database, "test_db");
    assert_eq!(cfg.output_location, "s3://test-bucket/");
    // Unprofiled defaults still apply.
    assert_eq!(cfg.result_prefix, "credit_risk");

    clear_env();
}

#[test]
fn test_credentials_from_env() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();

    assert!(matches!(
        Credentials::from_env(),
        Err(AthenaError::Construction(_))
    ));

    env::set_var("AWS_ACCESS_KEY_ID", "AKIABASE");
    env::set_var("AWS_SECRET_ACCESS_KEY", "base-secret");
    env::set_var("AWS_REGION", "us-east-2");

    let creds = Credentials::from_env().expect("credentials");
    assert_eq!(creds.access_key_id, "AKIABASE");
    assert_eq!(creds.region, "us-east-2");
    assert!(creds.validate().is_ok());
    assert!(!format!("{creds:?}").contains("base-secret"));

    env::set_var("ATHENA_FETCH_PROFILE", "TEST");
    env::set_var("TEST_AWS_ACCESS_KEY_ID", "AKIATEST");
    env::set_var("TEST_AWS_SECRET_ACCESS_KEY", "test-secret");
    env::set_var("TEST_ATHENA_REGION", "eu-west-1");

    let creds = Credentials::from_env().expect("profiled credentials");
    assert_eq!(creds.access_key_id, "AKIATEST");
    assert_eq!(creds.secret_access_key.expose(), "test-secret");
    assert_eq!(creds.region, "eu-west-1");

    clear_env();
}

/// This test requires valid AWS credentials and network access.
///
/// Run with: `cargo test test_real_athena_query -- --ignored`
///
/// Set environment variables before running:
/// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_REGION`
/// - `ATHENA_DATABASE=<your-database>`
/// - `ATHENA_OUTPUT_LOCATION=s3://<your-bucket>/<prefix>`
/// - `ATHENA_RESULT_BUCKET=<your-bucket>` and `ATHENA_RESULT_PREFIX=<prefix>`
#[test]
#[ignore]
fn test_real_athena_query() {
    let rt = tokio::runtime::Runtime::new().unwrap();

    rt.block_on(async {
        let credentials = Credentials::from_env().expect("AWS credentials in env");
        let client = AthenaClient::new(credentials, AthenaConfig::from_env())
            .await
            .expect("Failed to create AthenaClient");

        let table = client
            .fetch_as_table("SELECT 1 AS test_column")
            .await
            .expect("Query execution failed");

        assert_eq!(table.column_count(), 1);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get_value(0, "test_column"), Some("1"));
        assert_eq!(table.metadata.state, QueryStatus::Succeeded);

        println!("{}", table);
    });
}
