use crate::error::SiftResult;
use crate::filter::FilterOperator;
use crate::model::FieldKind;
use crate::predicate::{CompareOp, Predicate, TextOp};
use crate::value::Scalar;

use super::{PropertyContext, ValueFilterExpressionCreator};

/// Any other property type, compared through its textual form.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackFilterCreator;

impl ValueFilterExpressionCreator for FallbackFilterCreator {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn can_handle(&self, _kind: &FieldKind) -> bool {
        true
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
        let access = ctx.access.clone();
        let constant = Scalar::String(value.to_string());

        Ok(match operator {
            FilterOperator::Default | FilterOperator::EqualCaseSensitive => {
                Predicate::compare(access, CompareOp::Eq, constant)
            }
            FilterOperator::EqualCaseInsensitive => Predicate::text(access, TextOp::Equals, value, true),
            FilterOperator::NotEqual => Predicate::compare(access, CompareOp::Ne, constant),
            other => return Err(ctx.unsupported(other, Some(value), self.supported_operators())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::config::FilterConfiguration;
    use crate::error::ErrorCode;

    fn samples() -> Vec<Sample> {
        ["1.0.0", "2.0.0-RC"]
            .into_iter()
            .map(|v| Sample {
                version: v.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_textual_equality() {
        let config = FilterConfiguration::default();
        assert_eq!(select(&compile("Version", "1.0.0", &config).unwrap(), &samples()), vec![0]);
        assert_eq!(select(&compile("Version", "=2.0.0-rc", &config).unwrap(), &samples()), vec![1]);
        assert!(select(&compile("Version", "==2.0.0-rc", &config).unwrap(), &samples()).is_empty());
        assert_eq!(select(&compile("Version", "!1.0.0", &config).unwrap(), &samples()), vec![1]);
    }

    #[test]
    fn test_ordering_unsupported() {
        let config = FilterConfiguration::default();
        let err = compile("Version", ">1.0.0", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedOperator);
    }
}
