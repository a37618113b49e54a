use clap::{Args, Subcommand};
use hitea_app::{
    auth::SessionProvider,
    context::AppContext,
    domain::{
        locations::Location,
        ratings::models::{MAX_STARS, MIN_STARS, NewRating},
    },
};

use super::console::describe;

#[derive(Debug, Args)]
pub(crate) struct RatingsCommand {
    #[command(subcommand)]
    command: RatingsSubcommand,
}

#[derive(Debug, Subcommand)]
enum RatingsSubcommand {
    /// Average stars for every shop
    Averages,

    /// Reviews for one shop, newest first
    List(ListArgs),

    /// Rate a shop
    Submit(SubmitArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    location: Location,
}

#[derive(Debug, Args)]
struct SubmitArgs {
    #[arg(long)]
    location: Location,

    #[arg(long, value_parser = clap::value_parser!(u8).range(i64::from(MIN_STARS)..=i64::from(MAX_STARS)))]
    stars: u8,

    #[arg(long, default_value = "")]
    review: String,
}

pub(crate) async fn run(command: RatingsCommand, ctx: &AppContext) -> Result<(), String> {
    match command.command {
        RatingsSubcommand::Averages => {
            let averages = ctx
                .ratings
                .average_ratings(Location::ALL.to_vec())
                .await
                .map_err(|error| format!("failed to load ratings: {}", describe(&error)))?;

            for location in Location::ALL {
                let average = averages.get(&location).copied().unwrap_or_default();

                println!("{location}: {average:.1}");
            }

            Ok(())
        }
        RatingsSubcommand::List(args) => {
            let reviews = ctx
                .ratings
                .list_reviews(args.location)
                .await
                .map_err(|error| format!("failed to load reviews: {}", describe(&error)))?;

            if reviews.is_empty() {
                println!("no reviews for {} yet", args.location);
            }

            for review in reviews {
                let details = review.details;

                println!(
                    "{}  {}  {}/{}",
                    details.date, details.user_name, details.rating, MAX_STARS
                );

                if !details.review_description.is_empty() {
                    println!("    {}", details.review_description);
                }
            }

            Ok(())
        }
        RatingsSubcommand::Submit(args) => {
            let user = ctx
                .session
                .current_user()
                .ok_or("sign in to rate a shop (hitea account login --email <email>)")?;

            let user_name = user
                .display_name
                .clone()
                .unwrap_or_else(|| user.email.clone());

            ctx.ratings
                .submit_rating(NewRating {
                    location: args.location,
                    stars: args.stars,
                    review: args.review,
                    user_email: user.email,
                    user_name,
                })
                .await
                .map_err(|error| format!("failed to submit rating: {}", describe(&error)))?;

            println!("thanks for rating {}", args.location);

            Ok(())
        }
    }
}
