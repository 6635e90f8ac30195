//! Runtime property values and compiled constants.
//!
//! [`Value`] is what [`Entity::get`](crate::model::Entity::get) returns and
//! borrows from the entity. [`Scalar`] is the owned constant a filter value is
//! converted to at compile time.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::model::Entity;

/// The value of one entity property.
#[derive(Clone)]
pub enum Value<'a> {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value, also used for enum discriminants.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    String(Cow<'a, str>),
    /// Date and time value.
    DateTime(NaiveDateTime),
    /// Identifier value.
    Guid(Uuid),
    /// Textual form of a value of any other type.
    Other(String),
    /// A related entity.
    Object(&'a dyn Entity),
    /// A collection of related entities.
    List(Vec<&'a dyn Entity>),
}

impl<'a> Value<'a> {
    /// Wrap a related entity.
    pub fn object<E: Entity>(entity: &'a E) -> Self {
        Self::Object(entity)
    }

    /// Wrap an optional related entity.
    pub fn optional_object<E: Entity>(entity: Option<&'a E>) -> Self {
        match entity {
            Some(entity) => Self::Object(entity),
            None => Self::Null,
        }
    }

    /// Wrap a collection of related entities.
    pub fn list<E: Entity + 'a>(entities: impl IntoIterator<Item = &'a E>) -> Self {
        Self::List(entities.into_iter().map(|e| e as &dyn Entity).collect())
    }

    /// Wrap any displayable value as text compared by the fallback creator.
    pub fn other(value: impl fmt::Display) -> Self {
        Self::Other(value.to_string())
    }

    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text of string-like values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Other(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::Guid(_) => "guid",
            Self::Other(_) => "other",
            Self::Object(_) => "object",
            Self::List(_) => "list",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::String(_) | Self::Other(_) => 3,
            Self::DateTime(_) => 4,
            Self::Guid(_) => 5,
            Self::Object(_) => 6,
            Self::List(_) => 7,
        }
    }

    /// Compare against a compiled constant.
    ///
    /// Returns `None` when the two are not comparable (including nulls).
    pub fn partial_cmp_scalar(&self, scalar: &Scalar) -> Option<Ordering> {
        match (self, scalar) {
            (Self::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Self::Int(a), Scalar::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Scalar::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
            (Self::String(a), Scalar::String(b)) => Some(a.as_ref().cmp(b.as_str())),
            (Self::Other(a), Scalar::String(b)) => Some(a.as_str().cmp(b.as_str())),
            (Self::DateTime(a), Scalar::DateTime(b)) => Some(a.cmp(b)),
            (Self::Guid(a), Scalar::Guid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sort keys: nulls first, then by value.
    ///
    /// Values of different kinds order by kind so sorting never fails.
    pub fn sort_cmp(&self, other: &Value<'_>) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Guid(a), Value::Guid(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => a.len().cmp(&b.len()),
            (a, b) => match (a.as_text(), b.as_text()) {
                (Some(a), Some(b)) => a.cmp(b),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => write!(f, "Bool({})", v),
            Self::Int(v) => write!(f, "Int({})", v),
            Self::Float(v) => write!(f, "Float({})", v),
            Self::String(v) => write!(f, "String({:?})", v),
            Self::DateTime(v) => write!(f, "DateTime({})", v),
            Self::Guid(v) => write!(f, "Guid({})", v),
            Self::Other(v) => write!(f, "Other({:?})", v),
            Self::Object(_) => f.write_str("Object(..)"),
            Self::List(items) => write!(f, "List(len={})", items.len()),
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value<'_> {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Self::String(Cow::Borrowed(v))
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(v: &'a String) -> Self {
        Self::String(Cow::Borrowed(v.as_str()))
    }
}

impl From<String> for Value<'_> {
    fn from(v: String) -> Self {
        Self::String(Cow::Owned(v))
    }
}

impl From<NaiveDateTime> for Value<'_> {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Uuid> for Value<'_> {
    fn from(v: Uuid) -> Self {
        Self::Guid(v)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A constant produced by converting a filter value to a property type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Null constant.
    Null,
    /// Boolean constant.
    Bool(bool),
    /// Integer constant.
    Int(i64),
    /// Floating point constant.
    Float(f64),
    /// Text constant.
    String(String),
    /// Date and time constant.
    DateTime(NaiveDateTime),
    /// Identifier constant.
    Guid(Uuid),
}

impl Scalar {
    /// Check if this is a null constant.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{:?}", v),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Guid(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparison_across_kinds() {
        assert_eq!(
            Value::Int(3).partial_cmp_scalar(&Scalar::Float(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Float(2.0).partial_cmp_scalar(&Scalar::Int(2)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_incomparable_kinds() {
        assert_eq!(Value::Null.partial_cmp_scalar(&Scalar::Int(1)), None);
        assert_eq!(Value::Bool(true).partial_cmp_scalar(&Scalar::Int(1)), None);
    }

    #[test]
    fn test_sort_cmp_orders_nulls_first() {
        let mut values = vec![Value::from("b"), Value::Null, Value::from("a")];
        values.sort_by(|a, b| a.sort_cmp(b));
        assert!(values[0].is_null());
        assert_eq!(values[1].as_text(), Some("a"));
        assert_eq!(values[2].as_text(), Some("b"));
    }

    #[test]
    fn test_sort_cmp_across_borrows() {
        let owned = String::from("beta");
        let long = Value::from("alpha");
        let ordering = {
            let short = Value::from(&owned);
            long.sort_cmp(&short)
        };
        assert_eq!(ordering, Ordering::Less);
        assert_eq!(Value::Int(2).sort_cmp(&Value::Float(1.5)), Ordering::Greater);
        assert_eq!(Value::from(true).sort_cmp(&Value::Null), Ordering::Greater);
    }

    #[test]
    fn test_option_conversion() {
        assert!(Value::from(None::<i64>).is_null());
        assert!(matches!(Value::from(Some(4i64)), Value::Int(4)));
    }
}
