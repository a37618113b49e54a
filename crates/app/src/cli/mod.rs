use clap::{Parser, Subcommand};
use hitea_app::{
    config::{LoggingConfig, StorageConfig, TimerConfig},
    context::AppContext,
    observability,
};

mod account;
mod backend;
mod cart;
mod checkout;
mod console;
mod menu;
mod ratings;
mod timers;

#[derive(Debug, Parser)]
#[command(name = "hitea", about = "HiTea ordering client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    storage: StorageConfig,

    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    timers: TimerConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse and edit the menu
    Menu(menu::MenuCommand),

    /// Manage the shopping cart
    Cart(cart::CartCommand),

    /// Place an order for the cart
    Checkout(checkout::CheckoutCommand),

    /// Follow order countdowns
    Timers(timers::TimersCommand),

    /// Sign in, sign up and manage the profile
    Account(account::AccountCommand),

    /// Shop ratings and reviews
    Ratings(ratings::RatingsCommand),

    /// Local backend administration
    Backend(backend::BackendCommand),
}

impl Cli {
    pub(crate) fn init_logging(&self) -> Result<(), String> {
        observability::init_subscriber(&self.logging).map_err(|error| error.to_string())
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let ctx = AppContext::open(&self.storage)
            .await
            .map_err(|error| format!("failed to open data directory: {}", console::describe(&error)))?;

        let tick = self.timers.tick_period();

        match self.command {
            Commands::Menu(command) => menu::run(command, &ctx).await,
            Commands::Cart(command) => cart::run(command, &ctx).await,
            Commands::Checkout(command) => checkout::run(command, &ctx, tick).await,
            Commands::Timers(command) => timers::run(command, &ctx, tick).await,
            Commands::Account(command) => account::run(command, &ctx).await,
            Commands::Ratings(command) => ratings::run(command, &ctx).await,
            Commands::Backend(command) => backend::run(command, &ctx).await,
        }
    }
}
