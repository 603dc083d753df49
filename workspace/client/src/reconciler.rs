//! Polling state reconciler behind the Goals and Dashboard views.
//!
//! A mounted view loads once, then reloads on a fixed interval and whenever
//! a sibling view publishes a matching [`RefreshSignal`]. Every load is an
//! independent task: whichever finishes last is what the view shows, a hung
//! request never holds up the next tick, and a failed load keeps the previous
//! data on screen. After [`Reconciler::unmount`] late results are dropped.

pub mod dashboard;
pub mod goals;

pub use dashboard::{DashboardLoader, DashboardSnapshot, DashboardView};
pub use goals::{GoalsLoader, GoalsSnapshot, GoalsView};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::ApiError;
use crate::refresh::{RefreshBus, RefreshScope, ViewId};
use crate::settings::{ClientSettings, DEFAULT_POLL_INTERVAL_MS};
use crate::toast::Notifier;

/// One fetch-and-derive step of a view.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    /// Refresh signals this view reacts to.
    fn scope(&self) -> RefreshScope;

    async fn load(&self) -> Result<Self::Output, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    /// Mounted, no successful load yet.
    Loading,
    Ready,
    Unmounted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub phase: ViewPhase,
    /// Result of the last successful load; kept through failures.
    pub data: Option<T>,
    /// Message of the last failed load, cleared by the next success.
    pub last_error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Successful loads applied so far.
    pub loads: u64,
    pub failures: u64,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            phase: ViewPhase::Idle,
            data: None,
            last_error: None,
            refreshed_at: None,
            loads: 0,
            failures: 0,
        }
    }
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        self.phase == ViewPhase::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ViewPhase::Ready
    }
}

/// What every view needs besides its loader.
#[derive(Clone)]
pub struct ViewContext {
    pub notifier: Arc<dyn Notifier>,
    pub bus: RefreshBus,
    pub clock: Arc<dyn Clock>,
    pub poll_interval: Duration,
}

impl ViewContext {
    pub fn new(notifier: Arc<dyn Notifier>, bus: RefreshBus) -> Self {
        Self {
            notifier,
            bus,
            clock: Arc::new(SystemClock),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn from_settings(
        settings: &ClientSettings,
        notifier: Arc<dyn Notifier>,
        bus: RefreshBus,
    ) -> Self {
        Self::new(notifier, bus).with_poll_interval(settings.poll_interval())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

struct Shared<L: Loader> {
    loader: L,
    state: watch::Sender<ViewState<L::Output>>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<L: Loader> Shared<L> {
    async fn load(&self, trigger: &'static str) -> Result<(), ApiError> {
        trace!("{} load started ({})", self.loader.name(), trigger);
        let result = self.loader.load().await;
        self.apply(result)
    }

    fn spawn_load(self: &Arc<Self>, trigger: &'static str) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            // Failures are already recorded in the view state.
            let _ = shared.load(trigger).await;
        });
    }

    fn apply(&self, result: Result<L::Output, ApiError>) -> Result<(), ApiError> {
        let mut discarded = false;
        let now = self.clock.now();
        let outcome = result.as_ref().map(|_| ()).map_err(ApiError::clone);

        self.state.send_if_modified(|state| {
            if state.phase == ViewPhase::Unmounted {
                discarded = true;
                return false;
            }
            match result {
                Ok(data) => {
                    state.phase = ViewPhase::Ready;
                    state.data = Some(data);
                    state.last_error = None;
                    state.refreshed_at = Some(now);
                    state.loads += 1;
                }
                Err(ref e) => {
                    state.last_error = Some(e.to_string());
                    state.failures += 1;
                }
            }
            true
        });

        if discarded {
            debug!("{} view unmounted, discarding late result", self.loader.name());
            return outcome;
        }
        if let Err(e) = &outcome {
            warn!("{} load failed, keeping previous data: {}", self.loader.name(), e);
            self.notifier.show_error(e.to_string());
        }
        outcome
    }
}

/// A mounted view. Dropping it unmounts it.
pub struct Reconciler<L: Loader> {
    id: ViewId,
    shared: Arc<Shared<L>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<L: Loader> Reconciler<L> {
    /// Starts the first load, the poll timer and the refresh listener.
    /// Must be called from within a tokio runtime.
    pub fn mount(loader: L, context: &ViewContext) -> Self {
        let id = ViewId::next();
        let (state, _) = watch::channel(ViewState {
            phase: ViewPhase::Loading,
            ..ViewState::default()
        });
        let shared = Arc::new(Shared {
            loader,
            state,
            notifier: Arc::clone(&context.notifier),
            clock: Arc::clone(&context.clock),
        });
        info!("Mounting {} view ({})", shared.loader.name(), id);

        shared.spawn_load("mount");

        let period = context.poll_interval;
        let poller = {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    shared.spawn_load("poll");
                }
            })
        };

        // Subscribed here so signals published right after mount are not missed.
        let mut signals = context.bus.subscribe();
        let listener = {
            let shared = Arc::clone(&shared);
            let scope = shared.loader.scope();
            tokio::spawn(async move {
                loop {
                    match signals.recv().await {
                        Ok(signal) if signal.origin == Some(id) => {}
                        Ok(signal) if signal.scope.overlaps(scope) => {
                            debug!("{} received {:?}, reloading", id, signal.scope);
                            shared.spawn_load("refresh signal");
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            debug!("{} missed {} refresh signals, reloading", id, skipped);
                            shared.spawn_load("refresh signal");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        };

        Self {
            id,
            shared,
            tasks: Mutex::new(vec![poller, listener]),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn loader(&self) -> &L {
        &self.shared.loader
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ViewState<L::Output> {
        self.shared.state.borrow().clone()
    }

    pub fn data(&self) -> Option<L::Output> {
        self.shared.state.borrow().data.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<L::Output>> {
        self.shared.state.subscribe()
    }

    /// Loads out of band and waits for the result to be applied.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.shared.load("refresh").await
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.state.borrow().phase != ViewPhase::Unmounted
    }

    /// Stops polling and listening. In-flight loads still finish but their
    /// results are ignored. Idempotent.
    pub fn unmount(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
        let changed = self.shared.state.send_if_modified(|state| {
            if state.phase == ViewPhase::Unmounted {
                return false;
            }
            state.phase = ViewPhase::Unmounted;
            true
        });
        if changed {
            info!("Unmounted {} view ({})", self.shared.loader.name(), self.id);
        }
    }
}

impl<L: Loader> Drop for Reconciler<L> {
    fn drop(&mut self) {
        self.unmount();
    }
}
