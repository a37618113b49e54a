use clap::{Args, Subcommand};
use hitea_app::context::AppContext;

use super::console::describe;

#[derive(Debug, Args)]
pub(crate) struct BackendCommand {
    #[command(subcommand)]
    command: BackendSubcommand,
}

#[derive(Debug, Subcommand)]
enum BackendSubcommand {
    /// Let an account edit the menu
    GrantAdmin(GrantAdminArgs),
}

#[derive(Debug, Args)]
struct GrantAdminArgs {
    email: String,
}

pub(crate) async fn run(command: BackendCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        BackendSubcommand::GrantAdmin(args) => {
            ctx.users
                .grant_admin(args.email.clone())
                .await
                .map_err(|error| format!("failed to grant admin: {}", describe(&error)))?;

            println!("{} is now an admin", args.email);

            Ok(())
        }
    }
}
