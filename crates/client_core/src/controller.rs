//! Fetch lifecycle and single-selection state machine.
//!
//! The controller owns one [`FetchState`] and at most one selected record
//! identifier. Every transition is published to subscribers as a
//! [`ControllerSnapshot`]; presentation layers never touch the state directly.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use serde::Serialize;
use shared::{
    domain::{RecordId, ResultRecord, ResultSet, SearchQuery},
    error::ErrorInfo,
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, broadcast::error::RecvError, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::gateway::FetchGateway;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum FetchState {
    Idle,
    Loading,
    Loaded(ResultSet),
    Failed(ErrorInfo),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            Self::Loaded(results) => Some(results),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::Failed(_) => "failed",
        }
    }
}

/// Read-only view handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub state: FetchState,
    pub selection: Option<RecordId>,
    pub request_seq: u64,
}

impl ControllerSnapshot {
    pub fn selected_record(&self) -> Option<&ResultRecord> {
        let id = self.selection.as_ref()?;
        self.state.result_set()?.get(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("record {0} is not part of the current result set")]
    UnknownIdentifier(RecordId),
    #[error("selection requires loaded results (current state: {0})")]
    NotLoaded(&'static str),
}

#[derive(Debug)]
pub enum StartOutcome {
    Started {
        request_seq: u64,
        handle: JoinHandle<()>,
    },
    /// A fetch is already in flight; it was left untouched.
    AlreadyLoading { request_seq: u64 },
}

impl StartOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }

    pub fn request_seq(&self) -> u64 {
        match self {
            Self::Started { request_seq, .. } | Self::AlreadyLoading { request_seq } => {
                *request_seq
            }
        }
    }

    /// Waits for the spawned fetch to be applied (or discarded).
    pub async fn join(self) {
        if let Self::Started {
            request_seq,
            handle,
        } = self
        {
            if let Err(err) = handle.await {
                warn!(request_seq, error = %err, "catalog fetch task did not complete");
            }
        }
    }
}

struct ControllerState {
    fetch: FetchState,
    selection: Option<RecordId>,
    request_seq: u64,
}

impl ControllerState {
    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.fetch.clone(),
            selection: self.selection.clone(),
            request_seq: self.request_seq,
        }
    }
}

pub struct ListSelectionController {
    gateway: Arc<dyn FetchGateway>,
    query: SearchQuery,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerSnapshot>,
}

impl ListSelectionController {
    pub fn new(gateway: Arc<dyn FetchGateway>, query: SearchQuery) -> Arc<Self> {
        let (events, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Arc::new(Self {
            gateway,
            query,
            inner: Mutex::new(ControllerState {
                fetch: FetchState::Idle,
                selection: None,
                request_seq: 0,
            }),
            events,
        })
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Receives one snapshot per state transition, in transition order.
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerSnapshot> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Begins a new fetch cycle unless one is already in flight.
    ///
    /// Any existing selection is cleared and the previous results are
    /// discarded. The gateway call runs on a spawned tokio task.
    pub async fn start(self: &Arc<Self>) -> StartOutcome {
        let request_seq = {
            let mut guard = self.inner.lock().await;
            if guard.fetch.is_loading() {
                debug!(
                    request_seq = guard.request_seq,
                    "fetch already in flight; ignoring start"
                );
                return StartOutcome::AlreadyLoading {
                    request_seq: guard.request_seq,
                };
            }

            guard.request_seq += 1;
            guard.fetch = FetchState::Loading;
            guard.selection = None;
            self.publish(&guard);
            guard.request_seq
        };

        info!(request_seq, term = self.query.term(), "starting catalog fetch");
        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let search = AssertUnwindSafe(controller.gateway.search(&controller.query));
            let result = match search.catch_unwind().await {
                Ok(result) => result,
                Err(panic) => Err(ErrorInfo::internal(format!(
                    "search gateway panicked: {}",
                    panic_message(panic.as_ref())
                ))),
            };
            controller.resolve(request_seq, result).await;
        });

        StartOutcome::Started {
            request_seq,
            handle,
        }
    }

    /// Abandons the in-flight fetch, returning to `Idle`.
    ///
    /// The cancelled request's late resolution is discarded.
    pub async fn cancel(&self) -> bool {
        let mut guard = self.inner.lock().await;
        if !guard.fetch.is_loading() {
            return false;
        }

        info!(request_seq = guard.request_seq, "cancelling catalog fetch");
        guard.request_seq += 1;
        guard.fetch = FetchState::Idle;
        self.publish(&guard);
        true
    }

    pub async fn select(&self, id: &RecordId) -> Result<(), ControllerError> {
        let mut guard = self.inner.lock().await;
        let FetchState::Loaded(results) = &guard.fetch else {
            let label = guard.fetch.label();
            warn!(record_id = %id, state = label, "selection attempted before results loaded");
            return Err(ControllerError::NotLoaded(label));
        };

        if !results.contains(id) {
            warn!(record_id = %id, "selection of unknown record ignored");
            return Err(ControllerError::UnknownIdentifier(id.clone()));
        }

        if guard.selection.as_ref() != Some(id) {
            guard.selection = Some(id.clone());
            self.publish(&guard);
        }
        Ok(())
    }

    pub async fn clear_selection(&self) {
        let mut guard = self.inner.lock().await;
        if guard.selection.take().is_some() {
            self.publish(&guard);
        }
    }

    /// Returns the first snapshot that is not `Loading`.
    ///
    /// Resolves immediately when no fetch is in flight, including `Idle`.
    pub async fn wait_until_settled(&self) -> ControllerSnapshot {
        let mut events = self.subscribe();
        let current = self.snapshot().await;
        if !current.state.is_loading() {
            return current;
        }

        loop {
            match events.recv().await {
                Ok(snapshot) if !snapshot.state.is_loading() => return snapshot,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "snapshot listener lagged");
                    let current = self.snapshot().await;
                    if !current.state.is_loading() {
                        return current;
                    }
                }
                Err(RecvError::Closed) => return self.snapshot().await,
            }
        }
    }

    async fn resolve(&self, request_seq: u64, result: Result<ResultSet, ErrorInfo>) {
        let mut guard = self.inner.lock().await;
        if guard.request_seq != request_seq || !guard.fetch.is_loading() {
            debug!(
                request_seq,
                current_seq = guard.request_seq,
                "discarding stale fetch resolution"
            );
            return;
        }

        guard.fetch = match result {
            Ok(results) => {
                info!(request_seq, results = results.len(), "catalog fetch loaded");
                FetchState::Loaded(results)
            }
            Err(error) => {
                warn!(
                    request_seq,
                    kind = %error.kind,
                    error = %error.message,
                    "catalog fetch failed"
                );
                FetchState::Failed(error)
            }
        };
        self.publish(&guard);
    }

    fn publish(&self, state: &ControllerState) {
        // Fails only when nobody is subscribed.
        let _ = self.events.send(state.snapshot());
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
