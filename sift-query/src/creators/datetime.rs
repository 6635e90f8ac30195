use crate::error::SiftResult;
use crate::filter::FilterOperator;
use crate::model::FieldKind;
use crate::predicate::{CompareOp, Predicate};
use crate::span::DateTimeSpan;
use crate::value::Scalar;

use super::{PropertyContext, ValueFilterExpressionCreator};

/// Date and time properties.
///
/// Every value resolves to a half-open span. `Default` and `Contains` match
/// values inside the span; equality and ordering compare against its start.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeFilterCreator;

impl ValueFilterExpressionCreator for DateTimeFilterCreator {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn can_handle(&self, kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::DateTime)
    }

    fn supported_operators(&self) -> &'static [FilterOperator] {
        &[
            FilterOperator::Default,
            FilterOperator::Contains,
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
            FilterOperator::Default | FilterOperator::Contains => None,
            FilterOperator::EqualCaseSensitive | FilterOperator::EqualCaseInsensitive => {
                Some(CompareOp::Eq)
            }
            FilterOperator::NotEqual => Some(CompareOp::Ne),
            FilterOperator::LessThan => Some(CompareOp::Lt),
            FilterOperator::LessThanOrEqual => Some(CompareOp::Le),
            FilterOperator::GreaterThan => Some(CompareOp::Gt),
            FilterOperator::GreaterThanOrEqual => Some(CompareOp::Ge),
            other => return Err(ctx.unsupported(other, Some(value), self.supported_operators())),
        };

        let span = DateTimeSpan::parse(value, ctx.config.culture(), ctx.config.now.now())
            .ok_or_else(|| ctx.invalid_value(operator, value))?;

        let access = ctx.access.clone();
        Ok(match op {
            Some(op) => Predicate::compare(access, op, Scalar::DateTime(span.start)),
            None => Predicate::and([
                Predicate::compare(access.clone(), CompareOp::Ge, Scalar::DateTime(span.start)),
                Predicate::compare(access, CompareOp::Lt, Scalar::DateTime(span.end)),
            ]),
        })
    }
}
