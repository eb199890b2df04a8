//! Static AWS credentials handed to the client at construction.

use std::fmt;

use crate::config::{active_profile, profiled_env_opt, profiled_region, validate_region, DEFAULT_REGION};
use crate::error::AthenaError;

/// Secret string whose `Debug`/`Display` never reveal the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret. Only the SDK credential provider should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Access key pair plus the region both Athena and S3 are addressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub region: String,
}

impl Credentials {
    /// Credentials in the default region (`ap-southeast-1`).
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::new(secret_access_key),
            region: DEFAULT_REGION.to_string(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Read `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`, honouring the
    /// `ATHENA_FETCH_PROFILE` prefix. The region comes from `ATHENA_REGION`,
    /// then `AWS_REGION`.
    pub fn from_env() -> Result<Self, AthenaError> {
        Self::from_env_profiled(&active_profile())
    }

    pub fn from_env_profiled(profile: &str) -> Result<Self, AthenaError> {
        let access_key_id = profiled_env_opt(profile, "AWS_ACCESS_KEY_ID").ok_or_else(|| {
            AthenaError::Construction("AWS_ACCESS_KEY_ID is not set".into())
        })?;
        let secret = profiled_env_opt(profile, "AWS_SECRET_ACCESS_KEY").ok_or_else(|| {
            AthenaError::Construction("AWS_SECRET_ACCESS_KEY is not set".into())
        })?;
        Ok(Self::new(access_key_id, secret).with_region(profiled_region(profile)))
    }

    pub fn validate(&self) -> Result<(), AthenaError> {
        if self.access_key_id.trim().is_empty() {
            return Err(AthenaError::Construction("access key id is empty".into()));
        }
        if self.secret_access_key.is_empty() {
            return Err(AthenaError::Construction("secret access key is empty".into()));
        }
        validate_region(&self.region)
    }
}
