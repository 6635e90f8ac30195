//! Compiled boolean predicates.
//!
//! A [`Predicate`] is the intermediate tree a filter compiles to. It is bound
//! to an implicit root parameter (`x`), addresses properties through
//! [`Access`] paths and can either be evaluated in process or walked by a
//! query provider.
//!
//! ```rust
//! use sift_query::predicate::{Access, CompareOp, Predicate};
//! use sift_query::value::Scalar;
//!
//! let age = Access::root().member("Age", false);
//! let adult = Predicate::compare(age, CompareOp::Ge, Scalar::Int(18));
//! assert_eq!(adult.to_string(), "x => x.Age >= 18");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{SiftError, SiftResult};
use crate::model::Entity;
use crate::value::{Scalar, Value};

/// One member access along a navigation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Field name.
    pub name: &'static str,
    /// Whether the value read here is null-checked before it is used.
    pub conditional: bool,
}

/// A member-access path starting at the root parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Access {
    segments: Vec<Segment>,
}

impl Access {
    /// The root parameter itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Append a member access.
    pub fn member(mut self, name: &'static str, conditional: bool) -> Self {
        self.segments.push(Segment { name, conditional });
        self
    }

    /// The segments of the path.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether this is the root parameter.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Dotted property path, e.g. `Address.Street`.
    pub fn path(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.name)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Substitute `prefix` for the root parameter of this path.
    pub fn rebased(&self, prefix: &Access) -> Access {
        let mut segments = prefix.segments.clone();
        segments.extend_from_slice(&self.segments);
        Access { segments }
    }

    /// Read the value at this path.
    ///
    /// A null in the middle of the chain yields `Null` when the hop is
    /// guarded (by the segment itself or by `guarded`) and fails otherwise.
    pub fn resolve<'a>(&self, entity: &'a dyn Entity, guarded: bool) -> SiftResult<Value<'a>> {
        let mut current = Value::Object(entity);
        let mut guard = true;

        for (i, segment) in self.segments.iter().enumerate() {
            current = match current {
                Value::Object(inner) => inner.get(segment.name),
                Value::Null if guard || guarded => return Ok(Value::Null),
                Value::Null => {
                    return Err(SiftError::null_navigation(&self.prefix_path(i)));
                }
                _ => return Err(SiftError::value_mismatch(&self.prefix_path(i), "entity")),
            };
            guard = segment.conditional;
        }
        Ok(current)
    }

    fn prefix_path(&self, len: usize) -> String {
        self.segments[..len]
            .iter()
            .map(|s| s.name)
            .collect::<Vec<_>>()
            .join(".")
    }

    fn last_guarded(&self) -> bool {
        self.segments.last().is_some_and(|s| s.conditional)
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, var: &str) -> fmt::Result {
        f.write_str(var)?;
        for (i, segment) in self.segments.iter().enumerate() {
            let guarded = i > 0 && self.segments[i - 1].conditional;
            f.write_str(if guarded { "?." } else { "." })?;
            f.write_str(segment.name)?;
        }
        Ok(())
    }
}

/// Scalar comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Operator symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Text matching operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Whole-value match.
    Equals,
}

impl TextOp {
    /// Operator name as rendered.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Equals => "equals",
        }
    }

    fn apply(&self, haystack: &str, needle: &str) -> bool {
        match self {
            Self::Contains => haystack.contains(needle),
            Self::StartsWith => haystack.starts_with(needle),
            Self::EndsWith => haystack.ends_with(needle),
            Self::Equals => haystack == needle,
        }
    }
}

/// Caller-supplied test used by [`Predicate::Custom`].
pub type CustomTest = Arc<dyn Fn(&Value<'_>) -> bool + Send + Sync>;

/// A boolean predicate over an entity.
#[derive(Clone)]
pub enum Predicate {
    /// Accepts everything.
    True,
    /// Accepts nothing.
    False,
    /// Scalar comparison of a property against a constant.
    Compare {
        /// Property path.
        access: Access,
        /// Comparison.
        op: CompareOp,
        /// Constant operand.
        value: Scalar,
    },
    /// Text match of a property against a constant.
    Text {
        /// Property path.
        access: Access,
        /// Match kind.
        op: TextOp,
        /// Constant operand.
        value: String,
        /// Compare after lower-casing both sides.
        ignore_case: bool,
    },
    /// Property is null.
    IsNull(Access),
    /// Property is not null.
    NotNull(Access),
    /// All children hold.
    And(Vec<Predicate>),
    /// At least one child holds.
    Or(Vec<Predicate>),
    /// Child does not hold.
    Not(Box<Predicate>),
    /// At least one element of a collection satisfies the inner predicate,
    /// which is bound to the element.
    Any {
        /// Collection path.
        collection: Access,
        /// Predicate over one element.
        predicate: Box<Predicate>,
    },
    /// Property passes a caller-supplied test.
    Custom {
        /// Property path.
        access: Access,
        /// Name shown when rendering.
        label: String,
        /// The test.
        test: CustomTest,
    },
}

impl Predicate {
    /// Scalar comparison.
    pub fn compare(access: Access, op: CompareOp, value: Scalar) -> Self {
        Self::Compare { access, op, value }
    }

    /// Text match.
    pub fn text(access: Access, op: TextOp, value: impl Into<String>, ignore_case: bool) -> Self {
        Self::Text {
            access,
            op,
            value: value.into(),
            ignore_case,
        }
    }

    /// Caller-supplied test on one property.
    pub fn custom(
        access: Access,
        label: impl Into<String>,
        test: impl Fn(&Value<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Custom {
            access,
            label: label.into(),
            test: Arc::new(test),
        }
    }

    /// Check if this accepts everything.
    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }

    /// Check if this accepts nothing.
    pub fn is_false(&self) -> bool {
        matches!(self, Self::False)
    }

    /// Conjunction. An empty input accepts everything.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut children = Vec::new();
        for predicate in predicates {
            match predicate {
                Self::True => {}
                Self::False => return Self::False,
                Self::And(inner) => children.extend(inner),
                other => children.push(other),
            }
        }
        match children.len() {
            0 => Self::True,
            1 => children.pop().unwrap_or(Self::True),
            _ => Self::And(children),
        }
    }

    /// Disjunction. An empty input accepts nothing.
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut children = Vec::new();
        for predicate in predicates {
            match predicate {
                Self::False => {}
                Self::True => return Self::True,
                Self::Or(inner) => children.extend(inner),
                other => children.push(other),
            }
        }
        match children.len() {
            0 => Self::False,
            1 => children.pop().unwrap_or(Self::False),
            _ => Self::Or(children),
        }
    }

    /// Negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: Predicate) -> Self {
        match predicate {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Existential quantification over a collection.
    pub fn any(collection: Access, predicate: Predicate) -> Self {
        if predicate.is_false() {
            return Self::False;
        }
        Self::Any {
            collection,
            predicate: Box::new(predicate),
        }
    }

    /// Rewrite the predicate in terms of an outer root.
    ///
    /// Every access gets `prefix` substituted for its root parameter, except
    /// inside `Any`, whose inner predicate stays bound to the element and
    /// only the collection access is rebased.
    pub fn rebase(self, prefix: &Access) -> Self {
        match self {
            Self::True | Self::False => self,
            Self::Compare { access, op, value } => Self::Compare {
                access: access.rebased(prefix),
                op,
                value,
            },
            Self::Text {
                access,
                op,
                value,
                ignore_case,
            } => Self::Text {
                access: access.rebased(prefix),
                op,
                value,
                ignore_case,
            },
            Self::IsNull(access) => Self::IsNull(access.rebased(prefix)),
            Self::NotNull(access) => Self::NotNull(access.rebased(prefix)),
            Self::And(children) => Self::And(children.into_iter().map(|c| c.rebase(prefix)).collect()),
            Self::Or(children) => Self::Or(children.into_iter().map(|c| c.rebase(prefix)).collect()),
            Self::Not(inner) => Self::Not(Box::new(inner.rebase(prefix))),
            Self::Any {
                collection,
                predicate,
            } => Self::Any {
                collection: collection.rebased(prefix),
                predicate,
            },
            Self::Custom {
                access,
                label,
                test,
            } => Self::Custom {
                access: access.rebased(prefix),
                label,
                test,
            },
        }
    }

    /// Evaluate against one entity.
    ///
    /// With `guarded` set every hop of a navigation chain is null-checked;
    /// otherwise only hops marked conditional are, and dereferencing a null
    /// navigation fails.
    pub fn evaluate(&self, entity: &dyn Entity, guarded: bool) -> SiftResult<bool> {
        match self {
            Self::True => Ok(true),
            Self::False => Ok(false),
            Self::Compare { access, op, value } => {
                let actual = access.resolve(entity, guarded)?;
                Ok(compare(&actual, *op, value))
            }
            Self::Text {
                access,
                op,
                value,
                ignore_case,
            } => {
                let actual = access.resolve(entity, guarded)?;
                if actual.is_null() {
                    return Ok(false);
                }
                let Some(text) = actual.as_text() else {
                    return Err(SiftError::value_mismatch(&access.path(), "text"));
                };
                Ok(if *ignore_case {
                    op.apply(&text.to_lowercase(), &value.to_lowercase())
                } else {
                    op.apply(text, value)
                })
            }
            Self::IsNull(access) => Ok(access.resolve(entity, guarded)?.is_null()),
            Self::NotNull(access) => Ok(!access.resolve(entity, guarded)?.is_null()),
            Self::And(children) => {
                for child in children {
                    if !child.evaluate(entity, guarded)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(children) => {
                for child in children {
                    if child.evaluate(entity, guarded)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not(inner) => Ok(!inner.evaluate(entity, guarded)?),
            Self::Any {
                collection,
                predicate,
            } => match collection.resolve(entity, guarded)? {
                Value::List(items) => {
                    for item in items {
                        if predicate.evaluate(item, guarded)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
                Value::Null if guarded || collection.last_guarded() => Ok(false),
                Value::Null => Err(SiftError::null_navigation(&collection.path())),
                _ => Err(SiftError::value_mismatch(&collection.path(), "collection")),
            },
            Self::Custom { access, test, .. } => Ok(test(&access.resolve(entity, guarded)?)),
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let var = variable(depth);
        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Compare { access, op, value } => {
                access.render(f, &var)?;
                write!(f, " {} {}", op.symbol(), value)
            }
            Self::Text {
                access,
                op,
                value,
                ignore_case,
            } => {
                access.render(f, &var)?;
                write!(f, " {}", op.name())?;
                if *ignore_case {
                    f.write_str("_ci")?;
                }
                write!(f, " {:?}", value)
            }
            Self::IsNull(access) => {
                access.render(f, &var)?;
                f.write_str(" == null")
            }
            Self::NotNull(access) => {
                access.render(f, &var)?;
                f.write_str(" != null")
            }
            Self::And(children) | Self::Or(children) => {
                let joiner = if matches!(self, Self::And(_)) { " && " } else { " || " };
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    child.render(f, depth)?;
                }
                f.write_str(")")
            }
            Self::Not(inner) => {
                f.write_str("!")?;
                inner.render(f, depth)
            }
            Self::Any {
                collection,
                predicate,
            } => {
                collection.render(f, &var)?;
                write!(f, ".any({} => ", variable(depth + 1))?;
                predicate.render(f, depth + 1)?;
                f.write_str(")")
            }
            Self::Custom { access, label, .. } => {
                write!(f, "{}(", label)?;
                access.render(f, &var)?;
                f.write_str(")")
            }
        }
    }
}

fn variable(depth: usize) -> String {
    if depth == 0 {
        "x".to_string()
    } else {
        format!("x{}", depth)
    }
}

fn compare(actual: &Value<'_>, op: CompareOp, value: &Scalar) -> bool {
    if actual.is_null() || value.is_null() {
        let both = actual.is_null() && value.is_null();
        return match op {
            CompareOp::Eq => both,
            CompareOp::Ne => !both,
            _ => false,
        };
    }

    let ordering = actual.partial_cmp_scalar(value);
    match op {
        CompareOp::Eq => ordering.is_some_and(|o| o.is_eq()),
        CompareOp::Ne => !ordering.is_some_and(|o| o.is_eq()),
        CompareOp::Lt => ordering.is_some_and(|o| o.is_lt()),
        CompareOp::Le => ordering.is_some_and(|o| o.is_le()),
        CompareOp::Gt => ordering.is_some_and(|o| o.is_gt()),
        CompareOp::Ge => ordering.is_some_and(|o| o.is_ge()),
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("x => ")?;
        self.render(f, 0)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{FieldKind, Model};
    use std::sync::OnceLock;

    struct Street {
        name: &'static str,
    }

    struct House {
        street: Option<Street>,
        rooms: i64,
        tags: Vec<Street>,
    }

    impl Entity for Street {
        fn model() -> &'static Model {
            static MODEL: OnceLock<Model> = OnceLock::new();
            MODEL.get_or_init(|| Model::builder("Street").field("Name", FieldKind::String).build())
        }

        fn get(&self, field: &str) -> Value<'_> {
            match field {
                "Name" => Value::from(self.name),
                _ => Value::Null,
            }
        }
    }

    impl Entity for House {
        fn model() -> &'static Model {
            static MODEL: OnceLock<Model> = OnceLock::new();
            MODEL.get_or_init(|| {
                Model::builder("House")
                    .field("Street", FieldKind::Navigation(Street::model))
                    .nullable()
                    .field("Rooms", FieldKind::Int)
                    .field("Tags", FieldKind::Collection(Street::model))
                    .build()
            })
        }

        fn get(&self, field: &str) -> Value<'_> {
            match field {
                "Street" => Value::optional_object(self.street.as_ref()),
                "Rooms" => Value::from(self.rooms),
                "Tags" => Value::list(&self.tags),
                _ => Value::Null,
            }
        }
    }

    fn house(street: Option<&'static str>) -> House {
        House {
            street: street.map(|name| Street { name }),
            rooms: 3,
            tags: vec![Street { name: "quiet" }, Street { name: "green" }],
        }
    }

    fn street_name(conditional: bool) -> Access {
        Access::root().member("Street", conditional).member("Name", false)
    }

    #[test]
    fn test_combinators_simplify() {
        let rooms = Access::root().member("Rooms", false);
        let p = Predicate::compare(rooms, CompareOp::Gt, Scalar::Int(1));

        assert!(Predicate::and(Vec::new()).is_true());
        assert!(Predicate::or(Vec::new()).is_false());
        assert!(Predicate::and([p.clone(), Predicate::False]).is_false());
        assert!(Predicate::or([p.clone(), Predicate::True]).is_true());
        assert_eq!(Predicate::and([Predicate::True, p.clone()]).to_string(), p.to_string());
        assert!(Predicate::not(Predicate::True).is_false());
    }

    #[test]
    fn test_null_navigation_faults_when_unguarded() {
        let p = Predicate::text(street_name(false), TextOp::Contains, "main", true);
        let err = p.evaluate(&house(None), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::NullNavigation);

        assert!(!p.evaluate(&house(None), true).unwrap());
        assert!(p.evaluate(&house(Some("Main St")), false).unwrap());
    }

    #[test]
    fn test_conditional_segment_guards_tree() {
        let p = Predicate::IsNull(street_name(true));
        assert!(p.evaluate(&house(None), false).unwrap());
        assert_eq!(p.to_string(), "x => x.Street?.Name == null");
    }

    #[test]
    fn test_lifted_null_comparisons() {
        assert!(!compare(&Value::Null, CompareOp::Eq, &Scalar::Int(1)));
        assert!(compare(&Value::Null, CompareOp::Ne, &Scalar::Int(1)));
        assert!(!compare(&Value::Null, CompareOp::Lt, &Scalar::Int(1)));
        assert!(compare(&Value::Null, CompareOp::Eq, &Scalar::Null));
    }

    #[test]
    fn test_rebase_prefixes_accesses_but_not_any_body() {
        let inner = Predicate::text(Access::root().member("Name", false), TextOp::Equals, "quiet", false);
        let nested = Predicate::and([
            inner.clone(),
            Predicate::any(Access::root().member("Tags", false), inner),
        ]);
        let prefix = Access::root().member("Street", false);
        let rebased = nested.rebase(&prefix);
        assert_eq!(
            rebased.to_string(),
            r#"x => (x.Street.Name equals "quiet" && x.Street.Tags.any(x1 => x1.Name equals "quiet"))"#
        );
    }

    #[test]
    fn test_any_over_collection() {
        let tags = Access::root().member("Tags", false);
        let green = Predicate::text(Access::root().member("Name", false), TextOp::StartsWith, "GR", true);
        let p = Predicate::any(tags, green);
        assert!(p.evaluate(&house(None), false).unwrap());
    }

    #[test]
    fn test_custom_predicate() {
        let rooms = Access::root().member("Rooms", false);
        let odd = Predicate::custom(rooms, "odd", |v| matches!(v, Value::Int(n) if n % 2 == 1));
        assert!(odd.evaluate(&house(None), false).unwrap());
        assert_eq!(odd.to_string(), "x => odd(x.Rooms)");
    }

    #[test]
    fn test_value_mismatch_on_text_over_number() {
        let p = Predicate::text(Access::root().member("Rooms", false), TextOp::Contains, "3", false);
        let err = p.evaluate(&house(None), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueMismatch);
    }
}
