//! Rating Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{domain::locations::Location, ids::TypedId};

/// Rating Id
pub type RatingId = TypedId<Rating>;

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

/// New Rating Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    pub location: Location,
    pub stars: u8,
    pub review: String,
    pub user_email: String,
    pub user_name: String,
}

/// Rating Model, stored as a `ratings` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub location: Location,
    pub rating: u8,

    #[serde(default)]
    pub review_description: String,

    pub user_email: String,

    #[serde(default)]
    pub user_name: String,

    pub date: Timestamp,
}

/// Rating Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    pub id: RatingId,
    pub details: RatingRecord,
}
