//! Shop Locations

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A physical shop: pickup point and rating target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    Astoria,
    Oktogon,
    Buda,
}

impl Location {
    pub const ALL: [Self; 3] = [Self::Astoria, Self::Oktogon, Self::Buda];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Astoria => "Astoria",
            Self::Oktogon => "Oktogon",
            Self::Buda => "Buda",
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown location `{0}` (expected Astoria, Oktogon or Buda)")]
pub struct UnknownLocation(pub String);

impl FromStr for Location {
    type Err = UnknownLocation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|location| location.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownLocation(value.to_string()))
    }
}
