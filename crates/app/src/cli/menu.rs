use clap::{Args, Subcommand};
use hitea_app::{
    context::AppContext,
    domain::menu::models::{MenuItemId, MenuItemUpdate, NewMenuItem},
};

use super::console::{describe, price};

#[derive(Debug, Args)]
pub(crate) struct MenuCommand {
    #[command(subcommand)]
    command: MenuSubcommand,
}

#[derive(Debug, Subcommand)]
enum MenuSubcommand {
    /// List every drink
    List,

    /// Add a drink (admins only)
    Add(AddMenuItemArgs),

    /// Change a drink (admins only)
    Update(UpdateMenuItemArgs),

    /// Remove a drink (admins only)
    Delete(DeleteMenuItemArgs),
}

#[derive(Debug, Args)]
struct AddMenuItemArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Unit price in forint
    #[arg(long)]
    price: u64,

    /// Short description
    #[arg(long, default_value = "")]
    description: String,

    /// Minutes to prepare one cup
    #[arg(long, default_value_t = 0)]
    preparation_time: u32,

    /// Image reference
    #[arg(long, default_value = "")]
    image: String,
}

#[derive(Debug, Args)]
struct UpdateMenuItemArgs {
    /// Menu item id
    id: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    price: Option<u64>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    preparation_time: Option<u32>,

    #[arg(long)]
    image: Option<String>,
}

#[derive(Debug, Args)]
struct DeleteMenuItemArgs {
    /// Menu item id
    id: String,
}

pub(crate) async fn run(command: MenuCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        MenuSubcommand::List => list(ctx).await,
        MenuSubcommand::Add(args) => add(ctx, args).await,
        MenuSubcommand::Update(args) => update(ctx, args).await,
        MenuSubcommand::Delete(args) => delete(ctx, args).await,
    }
}

async fn list(ctx: &AppContext) -> Result<(), String> {
    let items = ctx
        .menu
        .list_items()
        .await
        .map_err(|error| format!("failed to load menu: {}", describe(&error)))?;

    if items.is_empty() {
        println!("the menu is empty");
    }

    for item in items {
        println!(
            "{}  {}  {}  ({} min)",
            item.id,
            item.product_name,
            price(item.price),
            item.preparation_time
        );

        if !item.description.is_empty() {
            println!("    {}", item.description);
        }
    }

    Ok(())
}

async fn add(ctx: &AppContext, args: AddMenuItemArgs) -> Result<(), String> {
    let item = ctx
        .menu_editor()
        .add_item(NewMenuItem {
            product_name: args.name,
            price: args.price,
            description: args.description,
            preparation_time: args.preparation_time,
            image: args.image,
        })
        .await
        .map_err(|error| format!("failed to add menu item: {}", describe(&error)))?;

    println!("menu_item_id: {}", item.id);

    Ok(())
}

async fn update(ctx: &AppContext, args: UpdateMenuItemArgs) -> Result<(), String> {
    let item = ctx
        .menu_editor()
        .update_item(
            MenuItemId::from_string(args.id),
            MenuItemUpdate {
                product_name: args.name,
                price: args.price,
                description: args.description,
                preparation_time: args.preparation_time,
                image: args.image,
            },
        )
        .await
        .map_err(|error| format!("failed to update menu item: {}", describe(&error)))?;

    println!(
        "{}  {}  {}  ({} min)",
        item.id,
        item.product_name,
        price(item.price),
        item.preparation_time
    );

    Ok(())
}

async fn delete(ctx: &AppContext, args: DeleteMenuItemArgs) -> Result<(), String> {
    ctx.menu_editor()
        .delete_item(MenuItemId::from_string(args.id.clone()))
        .await
        .map_err(|error| format!("failed to delete menu item: {}", describe(&error)))?;

    println!("deleted {}", args.id);

    Ok(())
}
