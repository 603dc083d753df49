//! WealthWise client layer: the authenticated HTTP client, the session
//! bridge, and the polling views that keep goal and dashboard state in step
//! with the backend.
//!
//! Nothing here renders. The views publish [`reconciler::ViewState`] through
//! a `watch` channel and push notifications to a [`toast::Notifier`]; the CLI
//! (or any other front end) decides what to draw.

pub mod api_client;
pub mod clock;
pub mod error;
pub mod forms;
pub mod reconciler;
pub mod refresh;
pub mod session;
pub mod settings;
pub mod storage;
pub mod toast;

#[cfg(test)]
mod test_utils;

pub use api_client::{ApiClient, FinanceApi, RequestOptions};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ActionError, ApiError, UNREACHABLE_MESSAGE};
pub use reconciler::{
    DashboardSnapshot, DashboardView, GoalsSnapshot, GoalsView, ViewContext, ViewPhase, ViewState,
};
pub use refresh::{RefreshBus, RefreshScope, RefreshSignal};
pub use session::{NoSession, SessionProvider, StaticToken, StoredSession};
pub use settings::ClientSettings;
pub use storage::LocalStore;
pub use toast::{Notifier, Toast, ToastKind, ToastQueue};
