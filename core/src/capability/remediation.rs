//! Remediation outcome delivery
//!
//! The gate only *issues* prompts. When the user answers, the host's result
//! callback hands the answer to a [`RemediationBroker`], which completes any
//! [`PendingRemediation`] futures waiting on that prompt. Nothing in the gate
//! itself awaits these futures.

use super::host::RequestCode;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemediationKind {
    /// "Turn Bluetooth on" prompt
    EnableAdapter,
    /// Runtime permission dialog
    RequestPermissions,
}

impl std::fmt::Display for RemediationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnableAdapter => write!(f, "enable-adapter"),
            Self::RequestPermissions => write!(f, "request-permissions"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationOutcome {
    pub granted: bool,
}

impl RemediationOutcome {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }

    /// Collapse a per-permission grant list into one outcome.
    ///
    /// An empty list means the dialog was dismissed, which counts as denied.
    pub fn from_grants(grants: &[bool]) -> Self {
        Self {
            granted: !grants.is_empty() && grants.iter().all(|g| *g),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RemediationError {
    #[error("Remediation abandoned before the host delivered a result")]
    Abandoned,
}

type Key = (RemediationKind, RequestCode);

#[derive(Default)]
struct BrokerState {
    outstanding: HashMap<Key, u32>,
    waiters: HashMap<Key, Vec<oneshot::Sender<RemediationOutcome>>>,
    /// Last answer per key, kept until the next prompt for that key
    resolved: HashMap<Key, RemediationOutcome>,
}

impl BrokerState {
    fn prune_closed(&mut self, key: &Key) {
        if let Some(waiters) = self.waiters.get_mut(key) {
            waiters.retain(|tx| !tx.is_closed());
            if waiters.is_empty() {
                self.waiters.remove(key);
            }
        }
    }
}

/// Routes host result callbacks to whoever is waiting on them.
///
/// A result that arrives before anyone subscribes is kept, so a later
/// `subscribe` for the same prompt still resolves.
#[derive(Default)]
pub struct RemediationBroker {
    state: Mutex<BrokerState>,
}

impl RemediationBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a prompt of `kind` is being sent with `request_code`.
    ///
    /// Call before handing the prompt to the host: a host may answer from
    /// inside its request call.
    pub fn issued(&self, kind: RemediationKind, request_code: RequestCode) {
        let key = (kind, request_code);
        let mut state = self.state.lock();
        *state.outstanding.entry(key).or_insert(0) += 1;
        state.resolved.remove(&key);
        tracing::debug!("Remediation {} issued (code {})", kind, request_code);
    }

    /// Number of prompts sent for this key that have not been answered yet.
    pub fn outstanding(&self, kind: RemediationKind, request_code: RequestCode) -> u32 {
        self.state
            .lock()
            .outstanding
            .get(&(kind, request_code))
            .copied()
            .unwrap_or(0)
    }

    /// Wait for the result of the latest prompt for `kind` / `request_code`.
    ///
    /// Resolves immediately when that prompt has already been answered.
    pub fn subscribe(&self, kind: RemediationKind, request_code: RequestCode) -> PendingRemediation {
        let key = (kind, request_code);
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock();

        if let Some(outcome) = state.resolved.get(&key).copied() {
            let _ = tx.send(outcome);
        } else {
            state.prune_closed(&key);
            state.waiters.entry(key).or_default().push(tx);
        }

        PendingRemediation { kind, rx }
    }

    /// Deliver a host result. Returns how many waiters were completed.
    ///
    /// Results for prompts that were never issued are dropped.
    pub fn deliver(
        &self,
        kind: RemediationKind,
        request_code: RequestCode,
        outcome: RemediationOutcome,
    ) -> usize {
        let key = (kind, request_code);
        let waiters = {
            let mut state = self.state.lock();
            match state.outstanding.get_mut(&key) {
                Some(count) if *count > 0 => {
                    *count -= 1;
                    if *count == 0 {
                        state.outstanding.remove(&key);
                    }
                }
                _ => {
                    tracing::warn!(
                        "Dropping {} result for unknown request code {}",
                        kind,
                        request_code
                    );
                    state.prune_closed(&key);
                    return 0;
                }
            }
            state.resolved.insert(key, outcome);
            state.waiters.remove(&key).unwrap_or_default()
        };

        tracing::info!(
            "Remediation {} (code {}) resolved: granted={}",
            kind,
            request_code,
            outcome.granted
        );

        waiters
            .into_iter()
            .filter(|tx| !tx.is_closed())
            .map(|tx| tx.send(outcome))
            .filter(Result::is_ok)
            .count()
    }

    /// Forget every outstanding prompt and stored answer; pending futures
    /// resolve to [`RemediationError::Abandoned`].
    pub fn abandon_all(&self) {
        let mut state = self.state.lock();
        state.outstanding.clear();
        state.waiters.clear();
        state.resolved.clear();
    }

    #[cfg(test)]
    fn waiter_keys(&self) -> usize {
        self.state.lock().waiters.len()
    }
}

/// Future resolving once the host reports the user's answer.
#[must_use = "futures do nothing unless polled"]
pub struct PendingRemediation {
    kind: RemediationKind,
    rx: oneshot::Receiver<RemediationOutcome>,
}

impl PendingRemediation {
    pub fn kind(&self) -> RemediationKind {
        self.kind
    }
}

impl Future for PendingRemediation {
    type Output = Result<RemediationOutcome, RemediationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| RemediationError::Abandoned))
    }
}
