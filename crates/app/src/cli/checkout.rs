use std::time::Duration;

use clap::{Args, Subcommand};
use hitea_app::{
    context::AppContext,
    domain::{
        locations::Location,
        orders::{
            CheckoutError,
            checkout::CheckoutRequest,
            models::{FulfillmentMethod, PaymentMethod},
        },
    },
    navigation::Route,
};

use super::{
    console::{ConsoleNavigator, describe, price},
    timers,
};

#[derive(Debug, Args)]
pub(crate) struct CheckoutCommand {
    #[command(subcommand)]
    command: CheckoutSubcommand,
}

#[derive(Debug, Subcommand)]
enum CheckoutSubcommand {
    /// Show the total and the estimated wait
    Quote(QuoteArgs),

    /// Place the order for everything in the cart
    Place(PlaceArgs),
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Quote for delivery instead of pickup
    #[arg(long)]
    delivery: bool,
}

#[derive(Debug, Args)]
struct PlaceArgs {
    /// Deliver to `--address`
    #[arg(long, requires = "address", conflicts_with = "pickup")]
    delivery: bool,

    /// Delivery address
    #[arg(long)]
    address: Option<String>,

    /// Pick up at a shop: Astoria, Oktogon or Buda
    #[arg(long, num_args = 0..=1)]
    pickup: Option<Option<Location>>,

    /// card, transfer or cash
    #[arg(long, default_value = "card")]
    payment: PaymentMethod,

    /// Follow the countdown after placing the order
    #[arg(long)]
    watch: bool,
}

pub(crate) async fn run(
    command: CheckoutCommand,
    ctx: &AppContext,
    tick: Duration,
) -> Result<(), String> {
    match command.command {
        CheckoutSubcommand::Quote(args) => {
            quote(ctx, args).await;
            Ok(())
        }
        CheckoutSubcommand::Place(args) => place(ctx, args, tick).await,
    }
}

async fn quote(ctx: &AppContext, args: QuoteArgs) {
    let fulfillment = if args.delivery {
        FulfillmentMethod::Delivery
    } else {
        FulfillmentMethod::Pickup
    };

    let quote = ctx
        .checkout(ConsoleNavigator::new())
        .quote(fulfillment)
        .await;

    println!("items: {}", quote.item_count);
    println!("total: {}", price(quote.total));
    println!("estimated {fulfillment} time: {} min", quote.estimated_minutes);
}

async fn place(ctx: &AppContext, args: PlaceArgs, tick: Duration) -> Result<(), String> {
    let request = CheckoutRequest {
        fulfillment: if args.delivery {
            FulfillmentMethod::Delivery
        } else {
            FulfillmentMethod::Pickup
        },
        pickup_location: args.pickup.flatten(),
        address: args.address,
        payment: args.payment,
    };

    let navigator = ConsoleNavigator::new();

    let placed = ctx
        .checkout(navigator.clone())
        .place_order(request)
        .await
        .map_err(|error| match error {
            CheckoutError::AuthenticationRequired => {
                format!("{error} (hitea account login --email <email>)")
            }
            CheckoutError::MissingPickupLocation => {
                format!("{error} (--pickup {})", Location::ALL.map(Location::as_str).join("|"))
            }
            error if error.is_retryable() => {
                format!("{}; the cart was kept", describe(&error))
            }
            error => describe(&error),
        })?;

    println!("order_id: {}", placed.order_id);
    println!("total: {}", price(placed.total));
    println!("estimated time: {} min", placed.estimated_minutes);

    if !args.watch {
        return Ok(());
    }

    let handoff = match navigator.last_route() {
        Some(Route::Timers { handoff }) => handoff,
        _ => Some(placed.order_id),
    };

    timers::watch(ctx, handoff, tick).await
}
