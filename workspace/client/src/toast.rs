//! Transient user notifications.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: usize,
    pub message: String,
    pub kind: ToastKind,
}

/// Sink for toasts. Views only ever push; rendering is the sink's business.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: String, kind: ToastKind);

    fn show_info(&self, message: String) {
        self.notify(message, ToastKind::Info);
    }

    fn show_success(&self, message: String) {
        self.notify(message, ToastKind::Success);
    }

    fn show_warning(&self, message: String) {
        self.notify(message, ToastKind::Warning);
    }

    fn show_error(&self, message: String) {
        self.notify(message, ToastKind::Error);
    }
}

/// Toasts kept by [`ToastQueue::history`]; older ones are dropped.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Default)]
struct QueueState {
    next_id: usize,
    entries: Vec<(Toast, Instant)>,
    history: Vec<Toast>,
}

/// In-memory toast stack; each toast disappears after `duration`.
#[derive(Debug)]
pub struct ToastQueue {
    duration: Duration,
    state: Mutex<QueueState>,
}

impl ToastQueue {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: Mutex::new(QueueState::default()),
        }
    }

    fn prune(&self, state: &mut QueueState) {
        let now = Instant::now();
        let duration = self.duration;
        state
            .entries
            .retain(|(_, shown_at)| now.duration_since(*shown_at) < duration);
    }

    /// Toasts that have not expired yet, oldest first.
    pub fn visible(&self) -> Vec<Toast> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.prune(&mut state);
        state.entries.iter().map(|(toast, _)| toast.clone()).collect()
    }

    pub fn dismiss(&self, id: usize) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.retain(|(toast, _)| toast.id != id);
    }

    /// The last [`HISTORY_LIMIT`] toasts shown, expired or not.
    pub fn history(&self) -> Vec<Toast> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.history.clone()
    }

    pub fn count(&self, kind: ToastKind) -> usize {
        self.history().iter().filter(|toast| toast.kind == kind).count()
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, message: String, kind: ToastKind) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let id = state.next_id;
        state.next_id += 1;
        let toast = Toast { id, message, kind };
        trace!("Toast {} ({:?})", id, kind);

        self.prune(&mut state);
        if state.history.len() >= HISTORY_LIMIT {
            let excess = state.history.len() + 1 - HISTORY_LIMIT;
            state.history.drain(..excess);
        }
        state.history.push(toast.clone());
        state.entries.push((toast, Instant::now()));
    }
}
