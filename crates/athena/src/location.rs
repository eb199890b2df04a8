use serde::{Deserialize, Serialize};

use crate::config::AthenaConfig;

/// Where the result CSV of one query execution is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLocation {
    pub bucket: String,
    /// `<prefix>/<query_id>.csv`
    pub key: String,
    /// Output location handed to Athena at submission.
    pub output_location: String,
}

impl ResultLocation {
    /// Derive the location for `query_id`. Computed fresh for every execution.
    pub fn for_query(config: &AthenaConfig, query_id: &str) -> Self {
        Self {
            bucket: config.result_bucket.clone(),
            key: result_key(&config.result_prefix, query_id),
            output_location: config.output_location.clone(),
        }
    }

    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

fn result_key(prefix: &str, query_id: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{query_id}.csv")
    } else {
        format!("{prefix}/{query_id}.csv")
    }
}
