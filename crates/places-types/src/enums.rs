//! Enumeration types for places.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The kind of point of interest a place is.
///
/// The set is closed: the store rejects anything outside it, and JSON
/// bodies carrying an unknown category fail to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Category {
    /// Coffee shops and tea houses.
    Cafe,
    /// Parks, gardens, and other green spaces.
    Park,
    /// Restaurants and eateries.
    Restaurant,
    /// Museums and galleries.
    Museum,
    /// Temples, shrines, and other places of worship.
    Temple,
    /// Anything that fits none of the above.
    Other,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Cafe,
        Self::Park,
        Self::Restaurant,
        Self::Museum,
        Self::Temple,
        Self::Other,
    ];

    /// The lowercase wire and storage name of this category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cafe => "cafe",
            Self::Park => "park",
            Self::Restaurant => "restaurant",
            Self::Museum => "museum",
            Self::Temple => "temple",
            Self::Other => "other",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string did not name any [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}
