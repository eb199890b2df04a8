//! Error types for Athena query execution and result retrieval.

use crate::status::QueryStatus;

/// Errors that can occur during Athena operations.
#[derive(Debug, thiserror::Error)]
pub enum AthenaError {
    /// The client could not be built from the supplied credentials or settings.
    #[error("Client construction failed: {0}")]
    Construction(String),

    /// The query reached `FAILED` or `CANCELLED` on the Athena side.
    #[error("Query {query_id} ended in state {status}{}", reason_suffix(.reason))]
    QueryExecution {
        query_id: String,
        status: QueryStatus,
        reason: Option<String>,
    },

    /// The query exceeded the configured timeout.
    #[error("Query {query_id} timed out after {seconds}s")]
    Timeout { query_id: String, seconds: u64 },

    /// An Athena SDK call failed (stringified).
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// Fetching the result object from S3 failed.
    #[error("Failed to fetch s3://{bucket}/{key}: {reason}")]
    Storage {
        bucket: String,
        key: String,
        reason: String,
    },

    /// The result object is not valid UTF-8 CSV.
    #[error("Parse error: {0}")]
    Parse(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {r}"),
        None => String::new(),
    }
}

impl AthenaError {
    /// Terminal status carried by a [`AthenaError::QueryExecution`], if any.
    pub fn query_status(&self) -> Option<QueryStatus> {
        match self {
            AthenaError::QueryExecution { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Query execution id the error relates to, if known.
    pub fn query_id(&self) -> Option<&str> {
        match self {
            AthenaError::QueryExecution { query_id, .. } | AthenaError::Timeout { query_id, .. } => {
                Some(query_id)
            }
            _ => None,
        }
    }
}

impl From<arrow::error::ArrowError> for AthenaError {
    fn from(err: arrow::error::ArrowError) -> Self {
        AthenaError::Parse(err.to_string())
    }
}
