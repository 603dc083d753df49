use anyhow::Result;
use clap::{Parser, Subcommand};
use client::ClientSettings;
use std::path::PathBuf;

pub mod commands;

use crate::config::AppContext;
use commands::{
    AuthCommand, BudgetsCommand, DashboardCommand, ExportCommand, GoalsCommand, ProfileCommand,
    TransactionsCommand,
};

#[derive(Parser)]
#[command(name = "wealthwise")]
#[command(about = "WealthWise client: goals, budgets and transactions from the terminal")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to ./wealthwise.toml when present)
    #[arg(long, global = true, env = "WEALTHWISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides settings and environment
    ///
    /// Examples:
    ///   http://127.0.0.1:8000
    ///   https://api.example.com
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Local storage file for session, theme and cached name
    #[arg(long, global = true, env = "WEALTHWISE_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Savings goals: list, watch, create, add savings, edit, delete
    #[command(subcommand)]
    Goals(GoalsCommand),
    /// Income and expense records
    #[command(subcommand)]
    Transactions(TransactionsCommand),
    /// Spending limits per category
    #[command(subcommand)]
    Budgets(BudgetsCommand),
    /// Monthly summary, goals and budget alerts in one view
    #[command(subcommand)]
    Dashboard(DashboardCommand),
    /// Profile and local display preferences
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Store or clear the access token sent with every request
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Write CSV files
    #[command(subcommand)]
    Export(ExportCommand),
}

impl Cli {
    pub async fn run(self, settings: ClientSettings) -> Result<()> {
        let context = AppContext::initialize(settings, self.store)?;
        match self.command {
            Commands::Goals(command) => commands::goals::run(command, &context).await,
            Commands::Transactions(command) => commands::transactions::run(command, &context).await,
            Commands::Budgets(command) => commands::budgets::run(command, &context).await,
            Commands::Dashboard(command) => commands::dashboard::run(command, &context).await,
            Commands::Profile(command) => commands::profile::run(command, &context).await,
            Commands::Auth(command) => commands::auth::run(command, &context).await,
            Commands::Export(command) => commands::export::run(command, &context).await,
        }
    }
}
