use anyhow::{Context, Result, bail};
use clap::Subcommand;
use common::{Theme, UpdateProfileRequest};
use tracing::warn;

use crate::config::AppContext;
use crate::render;

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Fetch the profile and cache the display name locally
    Show,
    /// Change profile fields on the backend
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
        /// light or dark
        #[arg(long)]
        theme: Option<Theme>,
    },
    /// Show or set the local theme preference
    Theme { theme: Option<Theme> },
}

fn cache_name(context: &AppContext, name: &str) {
    if let Err(e) = context.store.set_display_name(name) {
        warn!("Could not cache display name: {}", e);
    }
}

pub async fn run(command: ProfileCommand, context: &AppContext) -> Result<()> {
    match command {
        ProfileCommand::Show => {
            let profile = context.api.get_profile().await?;
            cache_name(context, profile.display_name());
            print!("{}", render::profile(&profile));
        }
        ProfileCommand::Update {
            name,
            email,
            avatar_url,
            theme,
        } => {
            let request = UpdateProfileRequest {
                name: name.map(|name| name.trim().to_string()),
                email,
                avatar_url,
                theme,
            };
            if request == UpdateProfileRequest::default() {
                bail!("No fields to update");
            }
            let profile = context.api.update_profile(&request).await?;
            cache_name(context, profile.display_name());
            if let Some(theme) = theme {
                context
                    .store
                    .set_theme(theme)
                    .context("Failed to save theme")?;
            }
            context
                .notifier
                .show_success("Profile updated".to_string());
        }
        ProfileCommand::Theme { theme: None } => {
            println!("{}", context.store.theme());
        }
        ProfileCommand::Theme { theme: Some(theme) } => {
            context
                .store
                .set_theme(theme)
                .context("Failed to save theme")?;
            println!("Theme set to {}", theme);
        }
    }
    Ok(())
}
