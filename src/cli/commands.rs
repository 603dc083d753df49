pub mod auth;
pub mod budgets;
pub mod dashboard;
pub mod export;
pub mod goals;
pub mod profile;
pub mod transactions;

pub use auth::AuthCommand;
pub use budgets::BudgetsCommand;
pub use dashboard::DashboardCommand;
pub use export::ExportCommand;
pub use goals::GoalsCommand;
pub use profile::ProfileCommand;
pub use transactions::TransactionsCommand;

use anyhow::{Result, anyhow};
use client::{ToastQueue, ViewState};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::render;

/// Waits for the first load of a freshly mounted view, successful or not.
pub async fn first_load<T: Clone>(rx: &mut watch::Receiver<ViewState<T>>) -> Result<T> {
    let state = rx
        .wait_for(|state| state.is_ready() || state.failures > 0)
        .await
        .map_err(|_| anyhow!("View closed before its first load"))?
        .clone();

    match state.data {
        Some(data) => Ok(data),
        None => Err(anyhow!(
            state.last_error.unwrap_or_else(|| "Load failed".to_string())
        )),
    }
}

/// Re-renders a view and its live toasts on every state change until Ctrl-C.
pub async fn watch_view<T, F>(
    mut rx: watch::Receiver<ViewState<T>>,
    toasts: &ToastQueue,
    render: F,
) -> Result<()>
where
    T: Clone,
    F: Fn(&T) -> String,
{
    info!("Watching for changes, press Ctrl-C to stop");
    loop {
        let state = rx.borrow_and_update().clone();
        if let Some(data) = &state.data {
            // Clear screen and home the cursor
            print!("\x1b[2J\x1b[H");
            let stamp = state
                .refreshed_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default();
            println!("Last refreshed {}", stamp);
            if let Some(error) = &state.last_error {
                println!("Showing previous data: {}", error);
            }
            println!("{}", render(data));
            print!("{}", render::toasts(&toasts.visible()));
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    debug!("View state channel closed");
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                return Ok(());
            }
        }
    }
}
