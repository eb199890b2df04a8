use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AthenaError;

pub(crate) const DEFAULT_REGION: &str = "ap-southeast-1";
pub(crate) const DEFAULT_DATABASE: &str = "some_db_schema";
pub(crate) const DEFAULT_OUTPUT_LOCATION: &str = "s3://some_bucket/some_folder";
pub(crate) const DEFAULT_RESULT_BUCKET: &str = "s3_bucket_";
pub(crate) const DEFAULT_RESULT_PREFIX: &str = "credit_risk";
pub(crate) const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;

/// Env var selecting the profile prefix.
pub const PROFILE_ENV: &str = "ATHENA_FETCH_PROFILE";

// ── Env helpers ──────────────────────────────────────────────────

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
pub(crate) fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str) -> Option<u64> {
    profiled_env_opt(profile, key).and_then(|v| v.parse().ok())
}

/// Active profile from [`PROFILE_ENV`], upper-cased; empty when unset.
pub(crate) fn active_profile() -> String {
    env_opt(PROFILE_ENV)
        .map(|s| s.to_uppercase())
        .unwrap_or_default()
}

// ── AthenaConfig ─────────────────────────────────────────────────

/// Settings for query submission, polling and result retrieval.
///
/// Reads from environment variables with optional profile prefix.
/// When `ATHENA_FETCH_PROFILE=PROD`, checks `PROD_ATHENA_DATABASE` before `ATHENA_DATABASE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// Database used when the caller does not name one.
    pub database: String,
    /// Athena workgroup; `None` leaves the account default.
    #[serde(default)]
    pub workgroup: Option<String>,
    /// S3 URI where Athena is told to stage results.
    pub output_location: String,
    /// Bucket the result CSV is read from.
    pub result_bucket: String,
    /// Key prefix of the result CSV (`<prefix>/<query_id>.csv`).
    pub result_prefix: String,
    /// Fixed wait between status polls.
    pub poll_interval_seconds: u64,
    /// Upper bound on the wait for a terminal state. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for AthenaConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            workgroup: None,
            output_location: DEFAULT_OUTPUT_LOCATION.to_string(),
            result_bucket: DEFAULT_RESULT_BUCKET.to_string(),
            result_prefix: DEFAULT_RESULT_PREFIX.to_string(),
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            timeout_seconds: None,
        }
    }
}

impl AthenaConfig {
    /// Build config from environment variables.
    ///
    /// Reads `ATHENA_FETCH_PROFILE` to determine profile prefix.
    /// For each key, tries `{PROFILE}_ATHENA_*` first, then `ATHENA_*`.
    pub fn from_env() -> Self {
        Self::from_env_profiled(&active_profile())
    }

    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        Self {
            database: profiled_env_or(profile, "ATHENA_DATABASE", DEFAULT_DATABASE),
            workgroup: profiled_env_opt(profile, "ATHENA_WORKGROUP"),
            output_location: profiled_env_or(
                profile,
                "ATHENA_OUTPUT_LOCATION",
                DEFAULT_OUTPUT_LOCATION,
            ),
            result_bucket: profiled_env_or(profile, "ATHENA_RESULT_BUCKET", DEFAULT_RESULT_BUCKET),
            result_prefix: profiled_env_or(profile, "ATHENA_RESULT_PREFIX", DEFAULT_RESULT_PREFIX),
            poll_interval_seconds: profiled_env_u64(profile, "ATHENA_POLL_INTERVAL_SECONDS")
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS),
            timeout_seconds: profiled_env_u64(profile, "ATHENA_TIMEOUT_SECONDS"),
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_output_location(mut self, output_location: impl Into<String>) -> Self {
        self.output_location = output_location.into();
        self
    }

    pub fn with_result_bucket(mut self, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.result_bucket = bucket.into();
        self.result_prefix = prefix.into();
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Reject settings the client cannot work with.
    pub fn validate(&self) -> Result<(), AthenaError> {
        if !self.output_location.starts_with("s3://") {
            return Err(AthenaError::Construction(format!(
                "output location must be an s3:// URI, got {:?}",
                self.output_location
            )));
        }
        if self.result_bucket.is_empty() {
            return Err(AthenaError::Construction("result bucket is empty".into()));
        }
        if self.poll_interval_seconds == 0 {
            return Err(AthenaError::Construction(
                "poll interval must be at least one second".into(),
            ));
        }
        Ok(())
    }
}

/// Resolve the region: `ATHENA_REGION`, then `AWS_REGION`, then `ap-southeast-1`.
pub(crate) fn profiled_region(profile: &str) -> String {
    profiled_env_opt(profile, "ATHENA_REGION")
        .or_else(|| profiled_env_opt(profile, "AWS_REGION"))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

/// Region names are lowercase ASCII letters, digits and dashes (`ap-southeast-1`).
pub(crate) fn validate_region(region: &str) -> Result<(), AthenaError> {
    if region.is_empty() {
        return Err(AthenaError::Construction("region is empty".into()));
    }
    let well_formed = region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !well_formed {
        return Err(AthenaError::Construction(format!(
            "malformed region name: {region:?}"
        )));
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────

/// Env-based tests anywhere in the crate must hold this lock.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
