//! Scripted doubles for the query engine and the result store.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use athena_fetch::*;

/// A submission as the engine saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSubmission {
    pub sql: String,
    pub database: String,
    pub output_location: String,
    pub workgroup: Option<String>,
}

/// Engine that hands out one query id and replays a fixed list of statuses.
///
/// Once the script is exhausted the last status repeats, so a script ending in
/// `RUNNING` models a query that never finishes.
pub struct ScriptedEngine {
    query_id: String,
    script: Mutex<VecDeque<ExecutionStatus>>,
    last: Mutex<ExecutionStatus>,
    submit_error: Option<String>,
    pub submissions: Mutex<Vec<RecordedSubmission>>,
    pub polls: Mutex<Vec<String>>,
    pub cancels: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn new(query_id: &str, states: &[QueryStatus]) -> Arc<Self> {
        Self::with_statuses(
            query_id,
            states.iter().map(|s| ExecutionStatus::new(*s)).collect(),
        )
    }

    pub fn with_statuses(query_id: &str, statuses: Vec<ExecutionStatus>) -> Arc<Self> {
        Arc::new(Self {
            query_id: query_id.to_string(),
            script: Mutex::new(statuses.into()),
            last: Mutex::new(ExecutionStatus::default()),
            submit_error: None,
            submissions: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
            cancels: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting_submissions(message: &str) -> Arc<Self> {
        Arc::new(Self {
            query_id: String::new(),
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(ExecutionStatus::default()),
            submit_error: Some(message.to_string()),
            submissions: Mutex::new(Vec::new()),
            polls: Mutex::new(Vec::new()),
            cancels: Mutex::new(Vec::new()),
        })
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().unwrap().len()
    }

    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> Vec<String> {
        self.cancels.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryEngine for ScriptedEngine {
    async fn submit(&self, submission: Submission<'_>) -> Result<String, AthenaError> {
        self.submissions.lock().unwrap().push(RecordedSubmission {
            sql: submission.sql.to_string(),
            database: submission.database.to_string(),
            output_location: submission.output_location.to_string(),
            workgroup: submission.workgroup.map(str::to_string),
        });
        match &self.submit_error {
            Some(message) => Err(AthenaError::AwsSdk(message.clone())),
            None => Ok(self.query_id.clone()),
        }
    }

    async fn status(&self, query_id: &str) -> Result<ExecutionStatus, AthenaError> {
        self.polls.lock().unwrap().push(query_id.to_string());
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }

    async fn cancel(&self, query_id: &str) -> Result<(), AthenaError> {
        self.cancels.lock().unwrap().push(query_id.to_string());
        Ok(())
    }
}

/// In-memory bucket contents; records every `get`.
#[derive(Default)]
pub struct MemoryStore {
    objects: HashMap<(String, String), Bytes>,
    pub gets: Mutex<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_object(bucket: &str, key: &str, body: &str) -> Arc<Self> {
        let mut objects = HashMap::new();
        objects.insert(
            (bucket.to_string(), key.to_string()),
            Bytes::from(body.to_string()),
        );
        Arc::new(Self {
            objects,
            gets: Mutex::new(Vec::new()),
        })
    }

    pub fn gets(&self) -> Vec<(String, String)> {
        self.gets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, AthenaError> {
        self.gets
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| AthenaError::Storage {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: "object not found".into(),
            })
    }
}

/// Client over the given doubles with default settings.
pub fn client(engine: &Arc<ScriptedEngine>, store: &Arc<MemoryStore>) -> AthenaClient {
    client_with(AthenaConfig::default(), engine, store)
}

pub fn client_with(
    config: AthenaConfig,
    engine: &Arc<ScriptedEngine>,
    store: &Arc<MemoryStore>,
) -> AthenaClient {
    AthenaClient::with_backends(config, engine.clone(), store.clone()).expect("valid config")
}
