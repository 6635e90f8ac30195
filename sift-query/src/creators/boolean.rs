use crate::error::SiftResult;
use crate::filter::FilterOperator;
use crate::model::FieldKind;
use crate::predicate::{CompareOp, Predicate};
use crate::value::Scalar;

use super::{PropertyContext, ValueFilterExpressionCreator};

/// Boolean properties.
///
/// `true`/`false` parse natively; anything else is looked up in the
/// configured boolean map.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanFilterCreator;

impl BooleanFilterCreator {
    fn parse(ctx: &PropertyContext<'_>, value: &str) -> Option<bool> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("true") {
            Some(true)
        } else if value.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            ctx.config.boolean_word(value)
        }
    }
}

impl ValueFilterExpressionCreator for BooleanFilterCreator {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn can_handle(&self, kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Bool)
    }

    fn supported_operators(&self) -> &'static [FilterOperator] {
        &[
            FilterOperator::Default,
            FilterOperator::EqualCaseSensitive,
            FilterOperator::EqualCaseInsensitive,
            FilterOperator::NotEqual,
            FilterOperator::IsNull,
            FilterOperator::NotNull,
        ]
    }

    fn create(
        &self,
        ctx: &PropertyContext<'_>,
        operator: FilterOperator,
        value: &str,
    ) -> SiftResult<Predicate> {
        let op = match operator {
            FilterOperator::Default
            | FilterOperator::EqualCaseSensitive
            | FilterOperator::EqualCaseInsensitive => CompareOp::Eq,
            FilterOperator::NotEqual => CompareOp::Ne,
            other => return Err(ctx.unsupported(other, Some(value), self.supported_operators())),
        };

        let parsed = Self::parse(ctx, value).ok_or_else(|| ctx.invalid_value(operator, value))?;
        Ok(Predicate::compare(ctx.access.clone(), op, Scalar::Bool(parsed)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::config::FilterConfiguration;
    use crate::error::ErrorCode;

    fn samples() -> Vec<Sample> {
        [true, false]
            .into_iter()
            .map(|flag| Sample {
                flag,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_default_operator_matches_value() {
        let config = FilterConfiguration::default();
        let predicate = compile("Flag", "true", &config).unwrap();
        assert_eq!(select(&predicate, &samples()), vec![0]);
    }

    #[test]
    fn test_boolean_map_words() {
        let config = FilterConfiguration::default();
        assert_eq!(select(&compile("Flag", "yes", &config).unwrap(), &samples()), vec![0]);
        assert_eq!(select(&compile("Flag", "0", &config).unwrap(), &samples()), vec![1]);
        assert_eq!(select(&compile("Flag", "!NO", &config).unwrap(), &samples()), vec![0]);
    }

    #[test]
    fn test_unparsable_value() {
        let config = FilterConfiguration::default();
        let err = compile("Flag", "maybe", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFilterValue);
        assert_eq!(err.context.value.as_deref(), Some("maybe"));
    }

    #[test]
    fn test_ordering_unsupported() {
        let config = FilterConfiguration::default();
        let err = compile("Flag", ">true", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedOperator);
    }
}
