use clap::{Args, Subcommand};
use hitea_app::{
    auth::{
        SessionProvider,
        models::{Credentials, FederatedIdentity, FederatedProvider},
    },
    context::AppContext,
    domain::{orders::models::Order, users::models::ProfileUpdate},
};
use tokio::signal;
use tracing::debug;

use super::console::{describe, price};

#[derive(Debug, Args)]
pub(crate) struct AccountCommand {
    #[command(subcommand)]
    command: AccountSubcommand,
}

#[derive(Debug, Subcommand)]
enum AccountSubcommand {
    /// Create an account and sign in
    Signup(CredentialsArgs),

    /// Sign in with email and password
    Login(CredentialsArgs),

    /// Sign in with a Google account
    Google(GoogleArgs),

    /// Sign out
    Logout,

    /// Show who is signed in
    Whoami,

    /// Send a password reset email
    ResetPassword(ResetPasswordArgs),

    /// Show the profile, or change it when any field is given
    Profile(ProfileArgs),

    /// List past orders
    Orders(OrdersArgs),
}

#[derive(Debug, Args)]
struct CredentialsArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "HITEA_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
struct GoogleArgs {
    #[arg(long)]
    email: String,

    #[arg(long)]
    name: Option<String>,
}

#[derive(Debug, Args)]
struct ResetPasswordArgs {
    #[arg(long)]
    email: String,
}

#[derive(Debug, Args)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    address: Option<String>,
}

#[derive(Debug, Args)]
struct OrdersArgs {
    /// Keep printing as orders change (Ctrl-C to leave)
    #[arg(long)]
    follow: bool,
}

pub(crate) async fn run(command: AccountCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        AccountSubcommand::Signup(args) => {
            let user = ctx
                .session
                .sign_up(Credentials::new(args.email, args.password))
                .await
                .map_err(|error| format!("failed to sign up: {}", describe(&error)))?;

            println!("signed up as {}", user.email);

            Ok(())
        }
        AccountSubcommand::Login(args) => {
            let user = ctx
                .session
                .log_in(Credentials::new(args.email, args.password))
                .await
                .map_err(|error| format!("failed to sign in: {}", describe(&error)))?;

            println!("signed in as {}", user.email);

            Ok(())
        }
        AccountSubcommand::Google(args) => {
            let user = ctx
                .session
                .google_sign_in(FederatedIdentity {
                    provider: FederatedProvider::Google,
                    email: args.email,
                    display_name: args.name,
                })
                .await
                .map_err(|error| format!("failed to sign in: {}", describe(&error)))?;

            println!("signed in as {}", user.email);

            Ok(())
        }
        AccountSubcommand::Logout => {
            ctx.session
                .log_out()
                .await
                .map_err(|error| format!("failed to sign out: {}", describe(&error)))?;

            println!("signed out");

            Ok(())
        }
        AccountSubcommand::Whoami => {
            let state = ctx.session.state();

            match state.user {
                Some(user) if state.is_admin => println!("{} (admin)", user.email),
                Some(user) => println!("{}", user.email),
                None => println!("not signed in"),
            }

            Ok(())
        }
        AccountSubcommand::ResetPassword(args) => {
            ctx.session
                .reset_password(args.email.clone())
                .await
                .map_err(|error| format!("failed to reset password: {}", describe(&error)))?;

            println!("if {} has an account, a reset email is on its way", args.email);

            Ok(())
        }
        AccountSubcommand::Profile(args) => profile(ctx, args).await,
        AccountSubcommand::Orders(args) => orders(ctx, args).await,
    }
}

async fn profile(ctx: &AppContext, args: ProfileArgs) -> Result<(), String> {
    let update = ProfileUpdate {
        display_name: args.name,
        phone: args.phone,
        address: args.address,
    };

    let profile = if update == ProfileUpdate::default() {
        ctx.session.profile().await
    } else {
        ctx.session.update_profile(update).await.map(Some)
    }
    .map_err(|error| format!("failed to load profile: {}", describe(&error)))?;

    let Some(profile) = profile else {
        println!("no profile yet");
        return Ok(());
    };

    println!("email: {}", profile.email);
    println!("name: {}", profile.display_name.as_deref().unwrap_or("-"));
    println!("phone: {}", profile.phone.as_deref().unwrap_or("-"));
    println!("address: {}", profile.address.as_deref().unwrap_or("-"));
    println!("member since: {}", profile.created_at);

    Ok(())
}

async fn orders(ctx: &AppContext, args: OrdersArgs) -> Result<(), String> {
    let user = ctx
        .session
        .current_user()
        .ok_or("sign in to see your orders (hitea account login --email <email>)")?;

    if !args.follow {
        let orders = ctx
            .orders
            .list_orders(user.uid)
            .await
            .map_err(|error| format!("failed to load orders: {}", describe(&error)))?;

        print_orders(&orders);

        return Ok(());
    }

    let mut subscription = ctx
        .orders
        .subscribe_orders(user.uid)
        .await
        .map_err(|error| format!("failed to follow orders: {}", describe(&error)))?;

    print_orders(&subscription.current());

    loop {
        tokio::select! {
            orders = subscription.changed() => match orders {
                Some(orders) => print_orders(&orders),
                None => break,
            },
            _ = signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
        }
    }

    subscription.unsubscribe();

    Ok(())
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("no orders yet");
    }

    for order in orders {
        let details = &order.details;

        let destination = match (&details.pickup_location, &details.address) {
            (Some(location), _) => format!("pickup at {location}"),
            (None, Some(address)) => format!("delivery to {address}"),
            (None, None) => details.fulfillment().to_string(),
        };

        println!(
            "{}  {}  {}  {}, paid by {}",
            order.id,
            details.order_date,
            price(details.total),
            destination,
            details.payment()
        );

        for line in &details.items {
            println!(
                "    {} x {}  {}, {}, {}",
                line.quantity, line.name, line.size, line.temperature, line.toppings
            );
        }
    }
}
