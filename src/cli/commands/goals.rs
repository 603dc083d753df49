use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use client::GoalsView;
use client::forms::{EditGoalForm, GoalForm, SavingsForm};
use common::EntityId;
use rust_decimal::Decimal;
use tracing::trace;

use super::{first_load, watch_view};
use crate::config::AppContext;
use crate::render;

#[derive(Subcommand)]
pub enum GoalsCommand {
    /// Active and completed goals with pace and totals
    List,
    /// Keep the goal list on screen, refreshed every poll interval
    Watch,
    /// Create a goal funded from the available balance
    Create {
        name: String,
        #[arg(long, default_value = "other")]
        category: String,
        /// Target amount
        #[arg(long)]
        target: Decimal,
        /// Amount moved into the goal right away
        #[arg(long, default_value = "0")]
        upfront: Decimal,
        /// Months until the deadline (30-day months)
        #[arg(long)]
        months: u32,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move money into a goal
    AddSavings {
        id: String,
        amount: Decimal,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change a goal's name, target, deadline or notes
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        target: Option<Decimal>,
        #[arg(long)]
        deadline: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a goal; its savings return to the available balance
    Delete { id: String },
}

pub async fn run(command: GoalsCommand, context: &AppContext) -> Result<()> {
    if let GoalsCommand::Watch = command {
        let (view_context, toasts) = context.watch_context();
        let view = GoalsView::mount(context.api.clone(), &view_context);
        let watched = watch_view(view.subscribe(), &toasts, render::goals).await;
        view.unmount();
        return watched;
    }

    trace!("Mounting goals view");
    let view = GoalsView::mount(context.api.clone(), &context.view_context());
    let mut rx = view.subscribe();

    // Mutations check the form against the loaded balance
    let snapshot = first_load(&mut rx).await?;

    match command {
        GoalsCommand::List | GoalsCommand::Watch => {
            print!("{}", render::goals(&snapshot));
        }
        GoalsCommand::Create {
            name,
            category,
            target,
            upfront,
            months,
            notes,
        } => {
            let form = GoalForm {
                name,
                category,
                target_amount: target,
                current_amount: upfront,
                months,
                notes,
            };
            let goal = view.create_goal(form).await?;
            println!("Created goal {} due {}", goal.id, goal.deadline);
        }
        GoalsCommand::AddSavings {
            id,
            amount,
            date,
            notes,
        } => {
            let form = SavingsForm {
                amount,
                date,
                notes,
            };
            let receipt = view.add_savings(&EntityId::from(id), form).await?;
            println!(
                "{}: {} of {}",
                receipt.goal.name,
                render::money(receipt.goal.current_amount),
                render::money(receipt.goal.target_amount)
            );
        }
        GoalsCommand::Edit {
            id,
            name,
            target,
            deadline,
            notes,
        } => {
            let form = EditGoalForm {
                name,
                target_amount: target,
                deadline,
                notes,
            };
            view.edit_goal(&EntityId::from(id), form).await?;
        }
        GoalsCommand::Delete { id } => {
            view.delete_goal(&EntityId::from(id)).await?;
        }
    }

    view.unmount();
    Ok(())
}
