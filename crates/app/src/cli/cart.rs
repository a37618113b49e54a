use std::num::NonZeroU32;

use clap::{Args, Subcommand};
use hitea_app::{
    context::AppContext,
    domain::{
        cart::models::{Customization, Size, Temperature, Toppings},
        menu::models::MenuItemId,
    },
};

use super::console::{ConsoleNavigator, describe, price};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart
    Show,

    /// Add a drink from the menu
    Add(AddToCartArgs),

    /// One more of a drink
    Increase(CartLineArgs),

    /// One fewer of a drink; removes it at zero
    Decrease(CartLineArgs),

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddToCartArgs {
    /// Menu item id
    id: String,

    /// small, medium or large
    #[arg(long, default_value = "medium")]
    size: Size,

    /// hot, no-ice or with-ice
    #[arg(long, default_value = "with ice")]
    temperature: Temperature,

    /// Topping name; repeat for more
    #[arg(long = "topping")]
    toppings: Vec<String>,

    #[arg(long, default_value_t = NonZeroU32::MIN)]
    quantity: NonZeroU32,
}

#[derive(Debug, Args)]
struct CartLineArgs {
    /// Menu item id
    id: String,
}

pub(crate) async fn run(command: CartCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show => {
            show(ctx);
            Ok(())
        }
        CartSubcommand::Add(args) => add(ctx, args).await,
        CartSubcommand::Increase(args) => {
            ctx.cart.increase_quantity(&MenuItemId::from_string(args.id));
            show(ctx);
            Ok(())
        }
        CartSubcommand::Decrease(args) => {
            ctx.cart.decrease_quantity(&MenuItemId::from_string(args.id));
            show(ctx);
            Ok(())
        }
        CartSubcommand::Clear => {
            ctx.cart.clear_cart();
            println!("cart cleared");
            Ok(())
        }
    }
}

fn show(ctx: &AppContext) {
    let lines = ctx.cart.items();

    if lines.is_empty() {
        println!("the cart is empty");
        return;
    }

    for line in &lines {
        println!(
            "{} x {}  [{}]  {}, {}, {}  {}",
            line.quantity,
            line.name,
            line.id,
            line.size,
            line.temperature,
            line.toppings,
            price(line.line_total())
        );
    }

    println!("items: {}", ctx.cart.item_count());
    println!("subtotal: {}", price(ctx.cart.subtotal()));
}

async fn add(ctx: &AppContext, args: AddToCartArgs) -> Result<(), String> {
    let item = ctx
        .menu
        .get_item(MenuItemId::from_string(args.id))
        .await
        .map_err(|error| format!("failed to load menu item: {}", describe(&error)))?;

    let navigator = ConsoleNavigator::new();

    ctx.menu_ordering(navigator)
        .order(
            &item,
            Customization {
                size: args.size,
                temperature: args.temperature,
                toppings: args.toppings.into_iter().collect::<Toppings>(),
                quantity: args.quantity,
            },
        )
        .map_err(|error| format!("{error} (hitea account login --email <email>)"))?;

    show(ctx);

    Ok(())
}
