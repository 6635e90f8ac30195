//! Filter operators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SiftError;

/// The comparison a [`ValueFilter`](super::ValueFilter) applies.
///
/// Not every operator is valid for every property type; each value filter
/// creator declares the operators it supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Type-specific default (`Contains` for strings, equality for most others).
    #[default]
    Default,
    /// Value contains the literal.
    Contains,
    /// Value starts with the literal.
    StartsWith,
    /// Value ends with the literal.
    EndsWith,
    /// Equality, case-sensitive for text.
    EqualCaseSensitive,
    /// Equality, case-insensitive for text.
    EqualCaseInsensitive,
    /// Inequality; multiple `NotEqual` values mean "none of these".
    NotEqual,
    /// Value is less than the literal.
    LessThan,
    /// Value is less than or equal to the literal.
    LessThanOrEqual,
    /// Value is greater than the literal.
    GreaterThan,
    /// Value is greater than or equal to the literal.
    GreaterThanOrEqual,
    /// Value is null.
    IsNull,
    /// Value is not null.
    NotNull,
}

impl FilterOperator {
    /// Every operator, in declaration order.
    pub const ALL: [FilterOperator; 13] = [
        Self::Default,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::EqualCaseSensitive,
        Self::EqualCaseInsensitive,
        Self::NotEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::IsNull,
        Self::NotNull,
    ];

    /// Name of the operator.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Contains => "Contains",
            Self::StartsWith => "StartsWith",
            Self::EndsWith => "EndsWith",
            Self::EqualCaseSensitive => "EqualCaseSensitive",
            Self::EqualCaseInsensitive => "EqualCaseInsensitive",
            Self::NotEqual => "NotEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::IsNull => "IsNull",
            Self::NotNull => "NotNull",
        }
    }

    /// Whether the operator takes a value.
    pub fn requires_value(&self) -> bool {
        !matches!(self, Self::IsNull | Self::NotNull)
    }

    /// Whether the operator is combined with AND instead of OR.
    pub fn is_negation(&self) -> bool {
        *self == Self::NotEqual
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterOperator {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SiftError::invalid_configuration(format!("unknown filter operator '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for op in FilterOperator::ALL {
            assert_eq!(op.name().parse::<FilterOperator>().unwrap(), op);
        }
        assert_eq!("notnull".parse::<FilterOperator>().unwrap(), FilterOperator::NotNull);
        assert!("Like".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_value_requirements() {
        assert!(FilterOperator::Default.requires_value());
        assert!(!FilterOperator::IsNull.requires_value());
        assert!(FilterOperator::NotEqual.is_negation());
        assert!(!FilterOperator::LessThan.is_negation());
    }
}
