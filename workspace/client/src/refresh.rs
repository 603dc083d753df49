//! Cross-view refresh signal.
//!
//! A view that mutated server state publishes a signal so sibling views
//! refetch instead of trusting their copy. One bus per authenticated session;
//! it carries no data, only "something in this area changed".

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::trace;

const BUS_CAPACITY: usize = 64;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one mounted view, used to ignore a view's own signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

impl ViewId {
    pub fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshScope {
    Goals,
    Transactions,
    Budgets,
    All,
}

impl RefreshScope {
    /// `All` on either side matches everything.
    pub fn overlaps(self, other: RefreshScope) -> bool {
        self == other || self == RefreshScope::All || other == RefreshScope::All
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSignal {
    pub scope: RefreshScope,
    /// `None` for signals raised outside any view (e.g. a CLI command).
    pub origin: Option<ViewId>,
}

impl RefreshSignal {
    pub fn new(scope: RefreshScope) -> Self {
        Self {
            scope,
            origin: None,
        }
    }

    pub fn from_view(origin: ViewId, scope: RefreshScope) -> Self {
        Self {
            scope,
            origin: Some(origin),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefreshBus {
    sender: broadcast::Sender<RefreshSignal>,
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Returns how many views were listening. Nobody listening is fine.
    pub fn publish(&self, signal: RefreshSignal) -> usize {
        let receivers = self.sender.send(signal).unwrap_or(0);
        trace!("Published {:?} to {} listeners", signal, receivers);
        receivers
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshSignal> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_overlap() {
        assert!(RefreshScope::Goals.overlaps(RefreshScope::Goals));
        assert!(RefreshScope::Goals.overlaps(RefreshScope::All));
        assert!(RefreshScope::All.overlaps(RefreshScope::Budgets));
        assert!(!RefreshScope::Goals.overlaps(RefreshScope::Transactions));
    }

    #[tokio::test]
    async fn test_publish_without_listeners_is_harmless() {
        let bus = RefreshBus::new();
        assert_eq!(bus.publish(RefreshSignal::new(RefreshScope::All)), 0);

        let mut rx = bus.subscribe();
        let origin = ViewId::next();
        assert_eq!(bus.publish(RefreshSignal::from_view(origin, RefreshScope::Goals)), 1);
        let received = rx.recv().await.unwrap();
        assert_eq!(received.origin, Some(origin));
        assert_eq!(received.scope, RefreshScope::Goals);
    }
}
