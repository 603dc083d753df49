use anyhow::Result;
use clap::Subcommand;
use client::DashboardView;

use super::{first_load, watch_view};
use crate::config::AppContext;
use crate::render;

#[derive(Subcommand)]
pub enum DashboardCommand {
    /// Print the dashboard once
    Show,
    /// Keep the dashboard on screen, refreshed every poll interval
    Watch,
}

pub async fn run(command: DashboardCommand, context: &AppContext) -> Result<()> {
    match command {
        DashboardCommand::Show => {
            let view = DashboardView::mount(context.api.clone(), &context.view_context());
            let snapshot = first_load(&mut view.subscribe()).await;
            view.unmount();
            if let Ok(Some(name)) = context.store.display_name() {
                println!("Welcome back, {}\n", name);
            }
            print!("{}", render::dashboard(&snapshot?));
        }
        DashboardCommand::Watch => {
            let (view_context, toasts) = context.watch_context();
            let view = DashboardView::mount(context.api.clone(), &view_context);
            let watched = watch_view(view.subscribe(), &toasts, render::dashboard).await;
            view.unmount();
            watched?;
        }
    }
    Ok(())
}
