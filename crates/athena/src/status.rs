use std::fmt;
use std::str::FromStr;

use aws_sdk_athena::types::QueryExecutionState;
use serde::{Deserialize, Serialize};

/// Execution state of an Athena query, as reported by `GetQueryExecution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryStatus {
    /// `SUCCEEDED`, `FAILED` and `CANCELLED` are terminal; no further transition occurs.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QueryStatus::Succeeded | QueryStatus::Failed | QueryStatus::Cancelled
        )
    }

    /// Terminal states that abort the caller with an error.
    pub fn is_failure(self) -> bool {
        matches!(self, QueryStatus::Failed | QueryStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryStatus::Queued => "QUEUED",
            QueryStatus::Running => "RUNNING",
            QueryStatus::Succeeded => "SUCCEEDED",
            QueryStatus::Failed => "FAILED",
            QueryStatus::Cancelled => "CANCELLED",
        }
    }

    /// Map an SDK state. Values added to the SDK after this was written map to `None`.
    pub fn from_sdk(state: &QueryExecutionState) -> Option<Self> {
        match state {
            QueryExecutionState::Queued => Some(QueryStatus::Queued),
            QueryExecutionState::Running => Some(QueryStatus::Running),
            QueryExecutionState::Succeeded => Some(QueryStatus::Succeeded),
            QueryExecutionState::Failed => Some(QueryStatus::Failed),
            QueryExecutionState::Cancelled => Some(QueryStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "QUEUED" => Ok(QueryStatus::Queued),
            "RUNNING" => Ok(QueryStatus::Running),
            "SUCCEEDED" => Ok(QueryStatus::Succeeded),
            "FAILED" => Ok(QueryStatus::Failed),
            "CANCELLED" => Ok(QueryStatus::Cancelled),
            other => Err(format!("unknown query status: {other}")),
        }
    }
}

/// Snapshot of a query execution returned by one status poll.
///
/// `state` is `None` before Athena has assigned one; the poll loop treats that
/// like `QUEUED`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub state: Option<QueryStatus>,
    /// Athena's `StateChangeReason`, usually set on failure.
    pub reason: Option<String>,
    pub bytes_scanned: u64,
    pub execution_time_ms: u64,
    /// Output location recorded on the execution, if Athena reports one.
    pub output_location: Option<String>,
}

impl ExecutionStatus {
    pub fn new(state: QueryStatus) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_some_and(QueryStatus::is_terminal)
    }
}
