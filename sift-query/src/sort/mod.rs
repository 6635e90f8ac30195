//! Entity sorting.
//!
//! Sorts are given as comma-separated tokens of the form
//! `prefix? property-path postfix?`, e.g. `lastname,-firstname` or
//! `Address.Street desc`. Each token becomes a [`PropertySort`]; an
//! [`EntitySort`] compiles them into a stable multi-key ordering.

mod compiled;
mod entity;
mod syntax;

pub use compiled::CompiledSort;
pub use entity::EntitySort;
pub use syntax::parse_sort_syntax;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9, oldest first), nulls first.
    #[default]
    Ascending,
    /// Descending order (Z-A, 9-0, newest first), nulls last.
    Descending,
}

impl SortDirection {
    /// Get the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// One sort key: a property path, a direction and a position.
///
/// Lower positions sort first; positions only order keys within one
/// [`EntitySort`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySort {
    property_path: String,
    direction: SortDirection,
    position: usize,
}

impl PropertySort {
    /// Path that sorts by the element itself.
    ///
    /// Only meaningful inside a nested sort; [`EntitySort::add_nested`]
    /// replaces it with the scalar property the sort is merged under.
    pub const PATH_TO_SELF: &'static str = "_self_";

    /// Create a property sort.
    pub fn new(property_path: impl Into<String>, direction: SortDirection, position: usize) -> Self {
        Self {
            property_path: property_path.into(),
            direction,
            position,
        }
    }

    /// Dotted property path, or [`PropertySort::PATH_TO_SELF`].
    pub fn property_path(&self) -> &str {
        &self.property_path
    }

    /// Sort direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Position among the sorts of one entity sort.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether this sorts by the element itself.
    pub fn is_self(&self) -> bool {
        self.property_path == Self::PATH_TO_SELF
    }
}

impl fmt::Display for PropertySort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.property_path),
            SortDirection::Descending => write!(f, "{}-desc", self.property_path),
        }
    }
}
