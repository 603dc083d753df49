use anyhow::{Context, Result};
use client::{
    ApiClient, ClientSettings, LocalStore, Notifier, RefreshBus, StoredSession, ToastQueue,
    ViewContext,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::render::ConsoleNotifier;

/// Settings from file and environment, with the `--api-url` flag on top.
pub fn load_settings(file: Option<&Path>, api_url: Option<&str>) -> Result<ClientSettings> {
    let settings = ClientSettings::load(file).context("Failed to load client settings")?;
    match api_url {
        Some(url) => settings
            .with_api_base_url(url)
            .with_context(|| format!("Invalid --api-url {}", url)),
        None => Ok(settings),
    }
}

/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("wealthwise={0},client={0}", default_level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Everything a command needs: settings, local store, API client and the
/// per-session notifier and refresh bus.
#[derive(Clone)]
pub struct AppContext {
    pub settings: ClientSettings,
    pub store: LocalStore,
    pub api: Arc<ApiClient>,
    pub notifier: Arc<dyn Notifier>,
    pub bus: RefreshBus,
}

impl AppContext {
    pub fn initialize(settings: ClientSettings, store_path: Option<PathBuf>) -> Result<Self> {
        trace!("Initializing application context");
        let store = match store_path {
            Some(path) => LocalStore::open(path),
            None => LocalStore::default_location().context("No local data directory")?,
        };
        debug!("Local store at {}", store.path().display());

        let session = Arc::new(StoredSession::new(store.clone()));
        let api = Arc::new(ApiClient::new(settings.api_base_url.clone(), session));

        Ok(Self {
            settings,
            store,
            api,
            notifier: Arc::new(ConsoleNotifier),
            bus: RefreshBus::new(),
        })
    }

    pub fn view_context(&self) -> ViewContext {
        ViewContext::from_settings(&self.settings, Arc::clone(&self.notifier), self.bus.clone())
    }

    /// Watch mode redraws the screen, so toasts go to a queue that is drawn
    /// under the view until they expire.
    pub fn watch_context(&self) -> (ViewContext, Arc<ToastQueue>) {
        let toasts = Arc::new(ToastQueue::new(self.settings.toast_duration()));
        let notifier: Arc<dyn Notifier> = toasts.clone();
        let context = ViewContext::from_settings(&self.settings, notifier, self.bus.clone());
        (context, toasts)
    }
}
