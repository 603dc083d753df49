use anyhow::{Context, Result, bail};
use clap::Subcommand;
use tracing::info;

use crate::config::AppContext;

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Save an access token issued by the auth provider
    Login {
        #[arg(long, env = "WEALTHWISE_TOKEN", hide_env_values = true)]
        token: String,
        /// Name used in greetings until the profile is fetched
        #[arg(long)]
        name: Option<String>,
    },
    /// Forget the token and cached name
    Logout,
    /// Whether requests will carry a token
    Status,
}

pub async fn run(command: AuthCommand, context: &AppContext) -> Result<()> {
    let store = &context.store;

    match command {
        AuthCommand::Login { token, name } => {
            let token = token.trim();
            if token.is_empty() {
                bail!("Token must not be empty");
            }
            store
                .set_session_token(token)
                .context("Failed to save session")?;
            if let Some(name) = name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                store.set_display_name(name).context("Failed to save name")?;
            }
            info!("Session saved to {}", store.path().display());
            context.notifier.show_success("Signed in".to_string());
        }
        AuthCommand::Logout => {
            store.clear_session().context("Failed to clear session")?;
            context.notifier.show_success("Signed out".to_string());
        }
        AuthCommand::Status => {
            let signed_in = store.session_token()?.is_some();
            let name = store.display_name()?.unwrap_or_else(|| "User".to_string());
            if signed_in {
                println!("Signed in as {} ({})", name, context.api.base_url());
            } else {
                println!("Not signed in; requests go out without a token");
            }
        }
    }
    Ok(())
}
