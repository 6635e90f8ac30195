use crate::error::SiftResult;
use crate::filter::FilterOperator;
use crate::model::{EnumMember, FieldKind};
use crate::predicate::{CompareOp, Predicate};
use crate::value::Scalar;

use super::{PropertyContext, ValueFilterExpressionCreator};

/// Enumeration properties.
///
/// A numeric literal compares the discriminant. Otherwise the literal is
/// matched case-insensitively against member names (`Default` means
/// `Contains`) and the property is compared against every matching member.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumFilterCreator;

impl EnumFilterCreator {
    fn matching(
        members: &'static [EnumMember],
        operator: FilterOperator,
        value: &str,
    ) -> Vec<&'static EnumMember> {
        let needle = value.trim().to_lowercase();
        members
            .iter()
            .filter(|member| {
                let name = member.name.to_lowercase();
                match operator {
                    FilterOperator::StartsWith => name.starts_with(&needle),
                    FilterOperator::EndsWith => name.ends_with(&needle),
                    FilterOperator::EqualCaseSensitive => member.name == value.trim(),
                    FilterOperator::EqualCaseInsensitive | FilterOperator::NotEqual => name == needle,
                    _ => name.contains(&needle),
                }
            })
            .collect()
    }
}

impl ValueFilterExpressionCreator for EnumFilterCreator {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn can_handle(&self, kind: &FieldKind) -> bool {
        matches!(kind, FieldKind::Enum(_))
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
        let FieldKind::Enum(members) = ctx.field.kind else {
            return Err(ctx.unsupported(operator, Some(value), self.supported_operators()));
        };
        let access = ctx.access.clone();
        let negate = operator == FilterOperator::NotEqual;
        let exact = matches!(
            operator,
            FilterOperator::EqualCaseSensitive | FilterOperator::EqualCaseInsensitive | FilterOperator::NotEqual
        );

        if exact || operator == FilterOperator::Default {
            if let Ok(discriminant) = value.trim().parse::<i64>() {
                let op = if negate { CompareOp::Ne } else { CompareOp::Eq };
                return Ok(Predicate::compare(access, op, Scalar::Int(discriminant)));
            }
        }

        let matched = Self::matching(members, operator, value);
        if matched.is_empty() && exact {
            return Err(ctx
                .invalid_value(operator, value)
                .with_suggestion(format!(
                    "Valid values: {}",
                    members.iter().map(|m| m.name).collect::<Vec<_>>().join(", ")
                )));
        }

        let comparisons = matched.into_iter().map(|member| {
            let op = if negate { CompareOp::Ne } else { CompareOp::Eq };
            Predicate::compare(access.clone(), op, Scalar::Int(member.value))
        });

        Ok(if negate {
            Predicate::and(comparisons)
        } else {
            Predicate::or(comparisons)
        })
    }
}
