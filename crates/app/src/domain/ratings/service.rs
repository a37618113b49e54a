//! Ratings service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use tracing::info;

use crate::{
    clock::Clock,
    documents::{Documents, collections::RATINGS},
    domain::{
        locations::Location,
        ratings::{
            errors::RatingsServiceError,
            models::{MAX_STARS, MIN_STARS, NewRating, Rating, RatingId, RatingRecord},
        },
    },
};

pub struct DocRatingsService {
    docs: Documents,
    clock: Arc<dyn Clock>,
}

impl DocRatingsService {
    #[must_use]
    pub fn new(docs: Documents, clock: Arc<dyn Clock>) -> Self {
        Self { docs, clock }
    }

    fn ratings_at(&self, location: Location) -> Result<Vec<Rating>, RatingsServiceError> {
        Ok(self
            .docs
            .find::<RatingRecord, _>(RATINGS, |rating| rating.location == location)?
            .into_iter()
            .map(|(id, details)| Rating {
                id: RatingId::from_string(id),
                details,
            })
            .collect())
    }
}

#[async_trait]
impl RatingsService for DocRatingsService {
    async fn submit_rating(&self, rating: NewRating) -> Result<Rating, RatingsServiceError> {
        if !(MIN_STARS..=MAX_STARS).contains(&rating.stars) {
            return Err(RatingsServiceError::InvalidRating(rating.stars));
        }

        let details = RatingRecord {
            location: rating.location,
            rating: rating.stars,
            review_description: rating.review.trim().to_string(),
            user_email: rating.user_email,
            user_name: rating.user_name,
            date: self.clock.now(),
        };

        let id = RatingId::from_string(self.docs.insert(RATINGS, &details)?);

        info!(rating = %id, location = %details.location, stars = details.rating, "rating submitted");

        Ok(Rating { id, details })
    }

    async fn list_reviews(&self, location: Location) -> Result<Vec<Rating>, RatingsServiceError> {
        let mut ratings = self.ratings_at(location)?;

        ratings.sort_by(|a, b| b.details.date.cmp(&a.details.date));

        Ok(ratings)
    }

    async fn average_ratings(
        &self,
        locations: Vec<Location>,
    ) -> Result<FxHashMap<Location, f64>, RatingsServiceError> {
        let mut averages = FxHashMap::default();

        for location in locations {
            let ratings = self.ratings_at(location)?;

            let average = if ratings.is_empty() {
                0.0
            } else {
                let total: u32 = ratings
                    .iter()
                    .map(|rating| u32::from(rating.details.rating))
                    .sum();

                f64::from(total) / f64::from(u32::try_from(ratings.len()).unwrap_or(u32::MAX))
            };

            averages.insert(location, average);
        }

        Ok(averages)
    }
}

#[automock]
#[async_trait]
pub trait RatingsService: Send + Sync {
    /// Record a 1-5 star rating.
    async fn submit_rating(&self, rating: NewRating) -> Result<Rating, RatingsServiceError>;

    /// Ratings for one location, newest first.
    async fn list_reviews(&self, location: Location) -> Result<Vec<Rating>, RatingsServiceError>;

    /// Mean stars per location; 0 where there are no ratings yet.
    async fn average_ratings(
        &self,
        locations: Vec<Location>,
    ) -> Result<FxHashMap<Location, f64>, RatingsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn rating(location: Location, stars: u8, review: &str) -> NewRating {
        NewRating {
            location,
            stars,
            review: review.to_string(),
            user_email: "ann@example.com".to_string(),
            user_name: "Ann".to_string(),
        }
    }

    #[tokio::test]
    async fn out_of_range_stars_are_rejected() {
        let ctx = TestContext::new();

        for stars in [0, 6] {
            let result = ctx
                .app
                .ratings
                .submit_rating(rating(Location::Buda, stars, ""))
                .await;

            assert!(matches!(
                result,
                Err(RatingsServiceError::InvalidRating(given)) if given == stars
            ));
        }
    }

    #[tokio::test]
    async fn averages_cover_every_requested_location() -> TestResult {
        let ctx = TestContext::new();

        ctx.app.ratings.submit_rating(rating(Location::Buda, 5, "")).await?;
        ctx.app.ratings.submit_rating(rating(Location::Buda, 4, "")).await?;
        ctx.app.ratings.submit_rating(rating(Location::Oktogon, 2, "")).await?;

        let averages = ctx
            .app
            .ratings
            .average_ratings(Location::ALL.to_vec())
            .await?;

        assert_eq!(averages.get(&Location::Buda).copied(), Some(4.5));
        assert_eq!(averages.get(&Location::Oktogon).copied(), Some(2.0));
        assert_eq!(averages.get(&Location::Astoria).copied(), Some(0.0));

        Ok(())
    }

    #[tokio::test]
    async fn reviews_are_listed_newest_first() -> TestResult {
        let ctx = TestContext::new();

        ctx.app.ratings.submit_rating(rating(Location::Astoria, 3, "first")).await?;
        ctx.clock.advance_millis(60_000);
        ctx.app.ratings.submit_rating(rating(Location::Astoria, 5, "second")).await?;
        ctx.app.ratings.submit_rating(rating(Location::Buda, 1, "elsewhere")).await?;

        let reviews: Vec<String> = ctx
            .app
            .ratings
            .list_reviews(Location::Astoria)
            .await?
            .into_iter()
            .map(|rating| rating.details.review_description)
            .collect();

        assert_eq!(reviews, vec!["second", "first"]);

        Ok(())
    }
}
