use crate::error::SiftResult;
use crate::filter::FilterOperator;
use crate::model::FieldKind;
use crate::predicate::{Predicate, TextOp};

use super::{PropertyContext, ValueFilterExpressionCreator};

/// Text properties. `Default` means `Contains`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringFilterCreator;

impl ValueFilterExpressionCreator for StringFilterCreator {
    fn name(&self) -> &'static str {
        "string"
    }

    fn can_handle(&self, kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::String)
    }

    fn supported_operators(&self) -> &'static [FilterOperator] {
        &[
            FilterOperator::Default,
            FilterOperator::Contains,
            FilterOperator::StartsWith,
            FilterOperator::EndsWith,
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
        let ignore_case = ctx.config.string_comparison.ignores_case();

        Ok(match operator {
            FilterOperator::Default | FilterOperator::Contains => {
                Predicate::text(access, TextOp::Contains, value, ignore_case)
            }
            FilterOperator::StartsWith => Predicate::text(access, TextOp::StartsWith, value, ignore_case),
            FilterOperator::EndsWith => Predicate::text(access, TextOp::EndsWith, value, ignore_case),
            FilterOperator::EqualCaseSensitive => Predicate::text(access, TextOp::Equals, value, false),
            FilterOperator::EqualCaseInsensitive => Predicate::text(access, TextOp::Equals, value, true),
            FilterOperator::NotEqual => {
                Predicate::not(Predicate::text(access, TextOp::Equals, value, true))
            }
            other => return Err(ctx.unsupported(other, Some(value), self.supported_operators())),
        })
    }
}
