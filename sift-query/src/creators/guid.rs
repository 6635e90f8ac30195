use uuid::Uuid;

use crate::error::SiftResult;
use crate::filter::FilterOperator;
use crate::model::FieldKind;
use crate::predicate::{CompareOp, Predicate};
use crate::value::Scalar;

use super::{PropertyContext, ValueFilterExpressionCreator};

/// Identifier properties. Equality only; hex digits compare case-insensitively.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidFilterCreator;

impl ValueFilterExpressionCreator for GuidFilterCreator {
    fn name(&self) -> &'static str {
        "guid"
    }

    fn can_handle(&self, kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Guid)
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

        let id = Uuid::parse_str(value.trim()).map_err(|e| ctx.invalid_value(operator, value).with_source(e))?;
        Ok(Predicate::compare(ctx.access.clone(), op, Scalar::Guid(id)))
    }
}
