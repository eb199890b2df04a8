//! Query-engine seam and its AWS Athena implementation.

use async_trait::async_trait;
use aws_sdk_athena::types::{QueryExecution, QueryExecutionContext, ResultConfiguration};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AthenaError;
use crate::status::{ExecutionStatus, QueryStatus};

/// One query submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission<'a> {
    pub sql: &'a str,
    pub database: &'a str,
    pub output_location: &'a str,
    pub workgroup: Option<&'a str>,
}

/// The three calls the client makes against a managed query engine.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Start executing `submission` and return the query execution id.
    async fn submit(&self, submission: Submission<'_>) -> Result<String, AthenaError>;

    /// Current status of a query execution.
    async fn status(&self, query_id: &str) -> Result<ExecutionStatus, AthenaError>;

    /// Ask the engine to stop a running query.
    async fn cancel(&self, query_id: &str) -> Result<(), AthenaError>;
}

/// [`QueryEngine`] backed by the AWS SDK Athena client.
#[derive(Debug, Clone)]
pub struct AthenaEngine {
    client: aws_sdk_athena::Client,
}

impl AthenaEngine {
    pub fn new(client: aws_sdk_athena::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(sdk_config: &aws_types::SdkConfig) -> Self {
        Self::new(aws_sdk_athena::Client::new(sdk_config))
    }
}

#[async_trait]
impl QueryEngine for AthenaEngine {
    async fn submit(&self, submission: Submission<'_>) -> Result<String, AthenaError> {
        let mut request = self
            .client
            .start_query_execution()
            .query_string(submission.sql)
            .client_request_token(Uuid::new_v4().to_string())
            .query_execution_context(
                QueryExecutionContext::builder()
                    .database(submission.database)
                    .build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(submission.output_location)
                    .build(),
            );
        if let Some(workgroup) = submission.workgroup {
            request = request.work_group(workgroup);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        let query_id = resp
            .query_execution_id()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution ID returned".into()))?
            .to_string();

        debug!(query_id = %query_id, database = %submission.database, "StartQueryExecution accepted");
        Ok(query_id)
    }

    async fn status(&self, query_id: &str) -> Result<ExecutionStatus, AthenaError> {
        let resp = self
            .client
            .get_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        let qe = resp
            .query_execution()
            .ok_or_else(|| AthenaError::AwsSdk("No query execution in response".into()))?;

        Ok(execution_status(query_id, qe))
    }

    async fn cancel(&self, query_id: &str) -> Result<(), AthenaError> {
        info!(query_id = %query_id, "Cancelling query");

        self.client
            .stop_query_execution()
            .query_execution_id(query_id)
            .send()
            .await
            .map_err(|e| AthenaError::AwsSdk(e.to_string()))?;

        info!(query_id = %query_id, "Query cancellation requested");
        Ok(())
    }
}

/// Extract an [`ExecutionStatus`] from an SDK [`QueryExecution`].
fn execution_status(query_id: &str, qe: &QueryExecution) -> ExecutionStatus {
    let stats = qe.statistics();
    let status = qe.status();

    let raw_state = status.and_then(|s| s.state());
    let state = raw_state.and_then(QueryStatus::from_sdk);
    if let (Some(raw), None) = (raw_state, state) {
        warn!(query_id = %query_id, state = %raw.as_str(), "Unrecognised query state, treating as pending");
    }

    ExecutionStatus {
        state,
        reason: status
            .and_then(|s| s.state_change_reason())
            .map(str::to_string),
        bytes_scanned: stats
            .and_then(|s| s.data_scanned_in_bytes())
            .unwrap_or(0)
            .max(0) as u64,
        execution_time_ms: stats
            .and_then(|s| s.engine_execution_time_in_millis())
            .unwrap_or(0)
            .max(0) as u64,
        output_location: qe
            .result_configuration()
            .and_then(|rc| rc.output_location())
            .map(str::to_string),
    }
}
