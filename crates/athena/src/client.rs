//! AWS Athena query client.
//!
//! Provides [`AthenaClient`] for running SQL against Athena: submit, poll at a
//! fixed interval until the execution is terminal, then either read the result
//! CSV from S3 into a [`ResultTable`] or just report the terminal status.

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_athena::config::Credentials as SdkCredentials;
use aws_types::region::Region;
use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::AthenaConfig;
use crate::credentials::Credentials;
use crate::decode::decode_csv;
use crate::engine::{AthenaEngine, QueryEngine, Submission};
use crate::error::AthenaError;
use crate::location::ResultLocation;
use crate::status::{ExecutionStatus, QueryStatus};
use crate::store::{ResultStore, S3ResultStore};
use crate::table::{QueryMetadata, ResultTable};

/// Name the static credentials are registered under in the SDK.
const CREDENTIALS_PROVIDER_NAME: &str = "athena-fetch";

/// A query that reached `SUCCEEDED`.
#[derive(Debug, Clone)]
struct CompletedQuery {
    query_id: String,
    status: ExecutionStatus,
}

/// Client for executing queries against AWS Athena.
///
/// Holds the engine and store seams behind `Arc`s; cloning is cheap and clones
/// share nothing mutable.
#[derive(Clone)]
pub struct AthenaClient {
    config: AthenaConfig,
    engine: Arc<dyn QueryEngine>,
    store: Arc<dyn ResultStore>,
}

impl std::fmt::Debug for AthenaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AthenaClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AthenaClient {
    /// Build a client authenticated with `credentials`.
    ///
    /// Returns [`AthenaError::Construction`] for empty keys, a malformed region
    /// or unusable settings in `config`.
    pub async fn new(credentials: Credentials, config: AthenaConfig) -> Result<Self, AthenaError> {
        credentials.validate()?;
        config.validate()?;

        let provider = SdkCredentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.expose().to_string(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(provider)
            .load()
            .await;

        info!(
            region = %credentials.region,
            database = %config.database,
            output_location = %config.output_location,
            "AthenaClient initialised"
        );

        Ok(Self {
            engine: Arc::new(AthenaEngine::from_sdk_config(&sdk_config)),
            store: Arc::new(S3ResultStore::from_sdk_config(&sdk_config)),
            config,
        })
    }

    /// Build a client over caller-supplied engine and store implementations.
    pub fn with_backends(
        config: AthenaConfig,
        engine: Arc<dyn QueryEngine>,
        store: Arc<dyn ResultStore>,
    ) -> Result<Self, AthenaError> {
        config.validate()?;
        Ok(Self {
            config,
            engine,
            store,
        })
    }

    pub fn config(&self) -> &AthenaConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Run `sql` against the default database and read its result CSV into a table.
    pub async fn fetch_as_table(&self, sql: &str) -> Result<ResultTable, AthenaError> {
        self.fetch_as_table_in(sql, &self.config.database).await
    }

    /// Run `sql` against `database` and read its result CSV into a table.
    ///
    /// The result object is fetched exactly once, from the key derived from the
    /// execution id of this submission.
    pub async fn fetch_as_table_in(
        &self,
        sql: &str,
        database: &str,
    ) -> Result<ResultTable, AthenaError> {
        let completed = self.submit_and_await(sql, database).await?;
        let location = ResultLocation::for_query(&self.config, &completed.query_id);

        debug!(
            query_id = %completed.query_id,
            bucket = %location.bucket,
            key = %location.key,
            "Fetching result object"
        );
        let body = self.store.get(&location.bucket, &location.key).await?;
        let decoded = decode_csv(&body)?;

        info!(
            query_id = %completed.query_id,
            columns = decoded.columns.len(),
            rows = decoded.rows.len(),
            "Query result loaded"
        );

        Ok(ResultTable {
            columns: decoded.columns,
            rows: decoded.rows,
            metadata: QueryMetadata {
                result_uri: location.uri(),
                query_id: completed.query_id,
                state: QueryStatus::Succeeded,
                bytes_scanned: completed.status.bytes_scanned,
                execution_time_ms: completed.status.execution_time_ms,
                output_location: completed.status.output_location,
                completed_at: Utc::now(),
            },
        })
    }

    /// Run a statement (CREATE VIEW, CREATE TABLE, DDL) against the default database.
    pub async fn execute_statement(&self, sql: &str) -> Result<QueryStatus, AthenaError> {
        self.execute_statement_in(sql, &self.config.database).await
    }

    /// Run a statement against `database` and report its terminal status.
    ///
    /// The result bucket is never read.
    pub async fn execute_statement_in(
        &self,
        sql: &str,
        database: &str,
    ) -> Result<QueryStatus, AthenaError> {
        let completed = self.submit_and_await(sql, database).await?;
        let status = QueryStatus::Succeeded;
        info!(query_id = %completed.query_id, status = %status, "Statement finished");
        Ok(status)
    }

    /// Get the current status of an existing query execution.
    pub async fn query_status(&self, query_id: &str) -> Result<ExecutionStatus, AthenaError> {
        self.engine.status(query_id).await
    }

    /// Cancel a running query.
    pub async fn cancel_query(&self, query_id: &str) -> Result<(), AthenaError> {
        self.engine.cancel(query_id).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Submit `sql` and poll until the execution is terminal.
    ///
    /// Polls once, then sleeps `poll_interval` between polls for as long as the
    /// state is `QUEUED`, `RUNNING` or unset. With `timeout_seconds` set, a
    /// query still pending once the timeout has elapsed is cancelled
    /// (best-effort) and reported as [`AthenaError::Timeout`].
    async fn submit_and_await(
        &self,
        sql: &str,
        database: &str,
    ) -> Result<CompletedQuery, AthenaError> {
        info!(database = %database, sql = %sql, "Starting Athena query");

        let query_id = self
            .engine
            .submit(Submission {
                sql,
                database,
                output_location: &self.config.output_location,
                workgroup: self.config.workgroup.as_deref(),
            })
            .await?;

        info!(query_id = %query_id, "Query execution started");

        let start = Instant::now();
        let interval = self.config.poll_interval();
        let timeout = self.config.timeout();

        loop {
            let status = self.engine.status(&query_id).await?;

            debug!(
                query_id = %query_id,
                state = ?status.state,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Polling query status"
            );

            match status.state {
                Some(QueryStatus::Succeeded) => {
                    info!(
                        query_id = %query_id,
                        bytes_scanned = status.bytes_scanned,
                        execution_time_ms = status.execution_time_ms,
                        "Query succeeded"
                    );
                    return Ok(CompletedQuery { query_id, status });
                }

                Some(state @ QueryStatus::Failed) => {
                    error!(query_id = %query_id, reason = ?status.reason, "Query failed");
                    return Err(AthenaError::QueryExecution {
                        query_id,
                        status: state,
                        reason: status.reason,
                    });
                }

                Some(state @ QueryStatus::Cancelled) => {
                    warn!(query_id = %query_id, "Query was cancelled");
                    return Err(AthenaError::QueryExecution {
                        query_id,
                        status: state,
                        reason: status.reason,
                    });
                }

                // Queued | Running | not yet reported
                Some(QueryStatus::Queued) | Some(QueryStatus::Running) | None => {}
            }

            if let Some(timeout) = timeout {
                if start.elapsed() >= timeout {
                    warn!(
                        query_id = %query_id,
                        timeout_seconds = timeout.as_secs(),
                        "Query timed out, cancelling"
                    );
                    if let Err(e) = self.engine.cancel(&query_id).await {
                        warn!(query_id = %query_id, error = %e, "Cancel after timeout failed");
                    }
                    return Err(AthenaError::Timeout {
                        query_id,
                        seconds: timeout.as_secs(),
                    });
                }
            }

            // Never sleep past the deadline.
            let wait = match timeout {
                Some(timeout) => interval.min(timeout.saturating_sub(start.elapsed())),
                None => interval,
            };
            tokio::time::sleep(wait).await;
        }
    }
}
