use std::time::Duration;

use clap::{Args, Subcommand};
use hitea_app::{
    context::AppContext,
    domain::{
        orders::models::OrderId,
        timers::{Dismissal, MountOutcome, TimerRegistry, models::TimerStatus},
    },
};
use tokio::signal;
use tracing::debug;

use super::console::{ConsoleNavigator, describe};

#[derive(Debug, Args)]
pub(crate) struct TimersCommand {
    #[command(subcommand)]
    command: TimersSubcommand,
}

#[derive(Debug, Subcommand)]
enum TimersSubcommand {
    /// Print every order countdown once
    Status,

    /// Follow the countdowns until they finish (Ctrl-C to leave)
    Watch,

    /// Stop showing an order's countdown
    Dismiss(DismissArgs),
}

#[derive(Debug, Args)]
struct DismissArgs {
    /// Order id
    order_id: String,
}

pub(crate) async fn run(
    command: TimersCommand,
    ctx: &AppContext,
    tick: Duration,
) -> Result<(), String> {
    match command.command {
        TimersSubcommand::Status => status(ctx),
        TimersSubcommand::Watch => watch(ctx, None, tick).await,
        TimersSubcommand::Dismiss(args) => dismiss(ctx, &OrderId::from_string(args.order_id)),
    }
}

fn status(ctx: &AppContext) -> Result<(), String> {
    let registry = TimerRegistry::bootstrap(ctx.timers.clone())
        .map_err(|error| format!("failed to load timers: {}", describe(&error)))?;

    if registry.is_empty() {
        println!("no active orders");
    }

    for card in registry.cards() {
        println!("{card}");
    }

    Ok(())
}

/// Mount the timer page and print every tick until all countdowns finish.
pub(crate) async fn watch(
    ctx: &AppContext,
    handoff: Option<OrderId>,
    tick: Duration,
) -> Result<(), String> {
    let outcome = ctx
        .timer_view(ConsoleNavigator::new(), handoff, tick)
        .map_err(|error| format!("failed to open timers: {}", describe(&error)))?;

    let view = match outcome {
        MountOutcome::Mounted(view) => view,
        MountOutcome::Redirected => {
            println!("no active orders");
            return Ok(());
        }
    };

    let mut cards = view.subscribe();

    loop {
        let snapshot = cards.borrow_and_update().clone();

        for card in &snapshot {
            println!("{card}");
        }

        if snapshot
            .iter()
            .all(|card| card.status() == TimerStatus::Expired)
        {
            break;
        }

        tokio::select! {
            changed = cards.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
        }
    }

    view.unmount();

    Ok(())
}

fn dismiss(ctx: &AppContext, order_id: &OrderId) -> Result<(), String> {
    let mut registry = TimerRegistry::bootstrap(ctx.timers.clone())
        .map_err(|error| format!("failed to load timers: {}", describe(&error)))?;

    match registry
        .dismiss(order_id)
        .map_err(|error| format!("failed to dismiss timer: {}", describe(&error)))?
    {
        Some(Dismissal::Running) => println!("stopped following {order_id}"),
        Some(Dismissal::Expired) => println!("{order_id} dismissed"),
        None => println!("no timer for {order_id}"),
    }

    Ok(())
}
