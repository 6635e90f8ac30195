use crate::error::SiftResult;
use crate::filter::FilterOperator;
use crate::model::FieldKind;
use crate::predicate::{CompareOp, Predicate};
use crate::value::Scalar;

use super::{PropertyContext, ValueFilterExpressionCreator};

/// Integer and floating point properties, parsed with the configured culture.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericFilterCreator;

impl ValueFilterExpressionCreator for NumericFilterCreator {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn can_handle(&self, kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Int | FieldKind::Float)
    }

    fn supported_operators(&self) -> &'static [FilterOperator] {
        &[
            FilterOperator::Default,
            FilterOperator::EqualCaseSensitive,
            FilterOperator::EqualCaseInsensitive,
            FilterOperator::NotEqual,
            FilterOperator::LessThan,
            FilterOperator::LessThanOrEqual,
            FilterOperator::GreaterThan,
            FilterOperator::GreaterThanOrEqual,
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
            FilterOperator::LessThan => CompareOp::Lt,
            FilterOperator::LessThanOrEqual => CompareOp::Le,
            FilterOperator::GreaterThan => CompareOp::Gt,
            FilterOperator::GreaterThanOrEqual => CompareOp::Ge,
            other => return Err(ctx.unsupported(other, Some(value), self.supported_operators())),
        };

        let culture = ctx.config.culture();
        let parsed = match ctx.field.kind {
            FieldKind::Int => culture.parse_int(value).map(Scalar::Int),
            _ => culture.parse_float(value).map(Scalar::Float),
        };
        let parsed = parsed.ok_or_else(|| ctx.invalid_value(operator, value))?;

        Ok(Predicate::compare(ctx.access.clone(), op, parsed))
    }
}
