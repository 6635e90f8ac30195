//! Value filter expression creators.
//!
//! Each creator turns the value filters of one property into a predicate for
//! one category of property type. Creators are tried in a fixed order and the
//! first one whose [`can_handle`](ValueFilterExpressionCreator::can_handle)
//! accepts the field kind wins; [`FallbackFilterCreator`] handles the rest.
//!
//! The value filters of one property combine as
//! `(OR of all non-NotEqual) AND (AND of all NotEqual)`, so `!Joe,!Eve`
//! means "neither Joe nor Eve".

mod boolean;
mod datetime;
mod enumeration;
mod fallback;
mod guid;
mod numeric;
mod string;

pub use boolean::BooleanFilterCreator;
pub use datetime::DateTimeFilterCreator;
pub use enumeration::EnumFilterCreator;
pub use fallback::FallbackFilterCreator;
pub use guid::GuidFilterCreator;
pub use numeric::NumericFilterCreator;
pub use string::StringFilterCreator;


use crate::config::FilterConfiguration;
use crate::error::{SiftError, SiftResult};
use crate::filter::{FilterOperator, ValueFilter};
use crate::model::{Field, FieldKind, Model};
use crate::predicate::{Access, Predicate};

/// Everything a creator needs to know about the filtered property.
#[derive(Debug, Clone)]
pub struct PropertyContext<'a> {
    /// Model of the filtered entity.
    pub model: &'static Model,
    /// The filtered field.
    pub field: &'static Field,
    /// Access path of the field from the root parameter.
    pub access: Access,
    /// Configuration in effect.
    pub config: &'a FilterConfiguration,
}

impl<'a> PropertyContext<'a> {
    /// Context for a top-level field of `model`.
    pub fn new(model: &'static Model, field: &'static Field, config: &'a FilterConfiguration) -> Self {
        Self {
            model,
            field,
            access: Access::root().member(field.name, false),
            config,
        }
    }

    /// Error for a value that does not convert to the field's type.
    pub fn invalid_value(&self, operator: FilterOperator, value: &str) -> SiftError {
        SiftError::invalid_filter_value(
            self.model.name(),
            self.field.name,
            &self.field.type_name(),
            operator,
            Some(value),
        )
    }

    /// Error for an operator the field's creator does not support.
    pub fn unsupported(
        &self,
        operator: FilterOperator,
        value: Option<&str>,
        supported: &[FilterOperator],
    ) -> SiftError {
        SiftError::unsupported_operator(
            self.model.name(),
            self.field.name,
            &self.field.type_name(),
            operator,
            value,
            supported,
        )
    }
}

/// Strategy that compiles value filters for one category of property type.
pub trait ValueFilterExpressionCreator: Send + Sync {
    /// Name of the creator, for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this creator handles fields of `kind`.
    fn can_handle(&self, kind: &FieldKind) -> bool;

    /// Operators this creator accepts, null checks included.
    fn supported_operators(&self) -> &'static [FilterOperator];

    /// Compile one value filter. Never called with `IsNull`/`NotNull`, which
    /// every creator shares.
    fn create(
        &self,
        ctx: &PropertyContext<'_>,
        operator: FilterOperator,
        value: &str,
    ) -> SiftResult<Predicate>;
}

static CREATORS: &[&dyn ValueFilterExpressionCreator] = &[
    &StringFilterCreator,
    &GuidFilterCreator,
    &DateTimeFilterCreator,
    &BooleanFilterCreator,
    &NumericFilterCreator,
    &EnumFilterCreator,
];

const NAVIGATION_OPERATORS: &[FilterOperator] = &[FilterOperator::IsNull, FilterOperator::NotNull];

/// The creator responsible for fields of `kind`.
pub fn creator_for(kind: &FieldKind) -> &'static dyn ValueFilterExpressionCreator {
    CREATORS
        .iter()
        .copied()
        .find(|c| c.can_handle(kind))
        .unwrap_or(&FallbackFilterCreator)
}

/// Compile all value filters of one property.
pub fn create_property_predicate(
    ctx: &PropertyContext<'_>,
    filters: &[ValueFilter],
) -> SiftResult<Predicate> {
    let creator = creator_for(&ctx.field.kind);
    let supported = if ctx.field.kind.is_scalar() {
        creator.supported_operators()
    } else {
        NAVIGATION_OPERATORS
    };

    let mut any_of = Vec::new();
    let mut none_of = Vec::new();

    for filter in filters {
        let operator = filter.operator();
        crate::sift_trace!(
            entity = ctx.model.name(),
            property = ctx.field.name,
            creator = creator.name(),
            operator = %operator,
            value = filter.value().unwrap_or_default(),
            "Creating value filter"
        );

        if !supported.contains(&operator) {
            return Err(ctx.unsupported(operator, filter.value(), supported));
        }

        let predicate = match operator {
            FilterOperator::IsNull if !ctx.field.nullable => Predicate::False,
            FilterOperator::NotNull if !ctx.field.nullable => Predicate::True,
            FilterOperator::IsNull => Predicate::IsNull(ctx.access.clone()),
            FilterOperator::NotNull => Predicate::NotNull(ctx.access.clone()),
            _ => {
                let value = filter
                    .value()
                    .ok_or_else(|| ctx.invalid_value(operator, ""))?;
                creator.create(ctx, operator, value)?
            }
        };

        if operator.is_negation() {
            none_of.push(predicate);
        } else {
            any_of.push(predicate);
        }
    }

    let any_of = if any_of.is_empty() {
        Predicate::True
    } else {
        Predicate::or(any_of)
    };
    Ok(Predicate::and([any_of, Predicate::and(none_of)]))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::error::ErrorCode;

    fn named(text: &str) -> Sample {
        Sample {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_creator_selection_order() {
        assert_eq!(creator_for(&FieldKind::String).name(), "string");
        assert_eq!(creator_for(&FieldKind::Guid).name(), "guid");
        assert_eq!(creator_for(&FieldKind::Int).name(), "numeric");
        assert_eq!(creator_for(&FieldKind::Other("Version")).name(), "fallback");
    }

    #[test]
    fn test_not_equal_values_combine_with_and() {
        let config = FilterConfiguration::default();
        let samples = [named("Joe"), named("Eve"), named("Ann")];

        let none_of = compile("Text", "!Joe,!Eve", &config).unwrap();
        assert_eq!(select(&none_of, &samples), vec![2]);

        let any_of = compile("Text", "=Joe,=Eve", &config).unwrap();
        assert_eq!(select(&any_of, &samples), vec![0, 1]);
    }

    #[test]
    fn test_mixed_groups() {
        let config = FilterConfiguration::default();
        let samples = [named("Joey"), named("Joanna"), named("Eve")];
        let predicate = compile("Text", "^Jo,!Joanna", &config).unwrap();
        assert_eq!(select(&predicate, &samples), vec![0]);
    }

    #[test]
    fn test_null_checks_on_non_nullable_fold() {
        let config = FilterConfiguration::default();
        assert!(compile("Count", "ISNULL", &config).unwrap().is_false());
        assert!(compile("Count", "NOTNULL", &config).unwrap().is_true());
        assert!(matches!(
            compile("Text", "ISNULL", &config).unwrap(),
            Predicate::IsNull(_)
        ));
    }

    #[test]
    fn test_unsupported_operator_carries_legal_set() {
        let config = FilterConfiguration::default();
        let err = compile("Flag", "~tr", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedOperator);
        assert_eq!(err.context.operator, Some(FilterOperator::Contains));
        assert!(
            err.context
                .supported_operators
                .contains(&FilterOperator::EqualCaseInsensitive)
        );
        assert_eq!(err.context.entity.as_deref(), Some("Sample"));
    }
}
