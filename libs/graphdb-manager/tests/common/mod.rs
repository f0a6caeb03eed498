#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Shared transports and proxies for graphdb-manager integration tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use graphdb_manager::{
    GraphDatabase, ManagementTransport, ServiceDescriptor, ServiceKind, ServiceProxy, ServiceTable,
    TransportError,
};
use serde_json::Value;
use tokio::sync::Semaphore;

pub const SERVER_URL: &str = "http://localhost:7474/";
pub const MANAGE_URL: &str = "http://localhost:7474/db/manage/";

/// Transport that answers from a queue of canned responses
///
/// Each `get` waits for a permit from `gate` when one is configured, so tests
/// can observe the manager before the response arrives.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, String>>>,
    requests: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Result<Value, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Same as [`Self::new`], but every request waits for a permit on the returned gate
    pub fn gated(responses: impl IntoIterator<Item = Result<Value, String>>) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let transport = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new(responses)
        };
        (transport, gate)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ManagementTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(url.to_owned());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(anyhow::anyhow!(message).into()),
            None => Err(anyhow::anyhow!("no scripted response left").into()),
        }
    }
}

/// Proxy that records every descriptor it receives
pub struct RecordingProxy {
    kind: ServiceKind,
    calls: Mutex<Vec<ServiceDescriptor>>,
}

impl RecordingProxy {
    pub fn new(kind: ServiceKind) -> Self {
        Self {
            kind,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ServiceDescriptor> {
        self.calls.lock().unwrap().clone()
    }
}

impl ServiceProxy for RecordingProxy {
    fn kind(&self) -> ServiceKind {
        self.kind
    }

    fn make_available(&self, descriptor: ServiceDescriptor) {
        self.calls.lock().unwrap().push(descriptor);
    }

    fn is_available(&self) -> bool {
        !self.calls.lock().unwrap().is_empty()
    }

    fn descriptor(&self) -> Option<ServiceDescriptor> {
        self.calls.lock().unwrap().last().cloned()
    }
}

/// Recording proxies for every kind, plus the table that dispatches to them
pub fn recording_table() -> (ServiceTable, Vec<Arc<RecordingProxy>>) {
    let proxies: Vec<Arc<RecordingProxy>> = ServiceKind::ALL
        .into_iter()
        .map(|kind| Arc::new(RecordingProxy::new(kind)))
        .collect();
    let by_kind = proxies.clone();
    let table = ServiceTable::from_fn(move |kind| {
        let proxy = by_kind
            .iter()
            .find(|p| p.kind == kind)
            .cloned()
            .unwrap();
        proxy as Arc<dyn ServiceProxy>
    });
    (table, proxies)
}

pub fn database(transport: Arc<dyn ManagementTransport>) -> Arc<GraphDatabase> {
    Arc::new(GraphDatabase::new(SERVER_URL, transport).unwrap())
}
