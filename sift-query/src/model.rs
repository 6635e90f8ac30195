//! Entity metadata.
//!
//! Filters and sorts address properties by name, so every filterable type
//! describes its fields once through a [`Model`] and exposes their values
//! through [`Entity::get`].
//!
//! ```rust
//! use std::sync::OnceLock;
//! use sift_query::model::{Entity, FieldKind, Model};
//! use sift_query::value::Value;
//!
//! struct Person {
//!     name: String,
//!     age: Option<i64>,
//! }
//!
//! impl Entity for Person {
//!     fn model() -> &'static Model {
//!         static MODEL: OnceLock<Model> = OnceLock::new();
//!         MODEL.get_or_init(|| {
//!             Model::builder("Person")
//!                 .field("Name", FieldKind::String)
//!                 .field("Age", FieldKind::Int)
//!                 .nullable()
//!                 .build()
//!         })
//!     }
//!
//!     fn get(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "Name" => Value::from(self.name.as_str()),
//!             "Age" => Value::from(self.age),
//!             _ => Value::Null,
//!         }
//!     }
//! }
//!
//! let model = Person::model();
//! assert_eq!(model.field("age").map(|f| f.name), Some("Age"));
//! ```

use std::fmt;

use crate::value::Value;

/// A type whose properties can be filtered and sorted.
///
/// `get` is called with the field names declared in [`Entity::model`]; names
/// are resolved (and case-normalized) before any value is read.
pub trait Entity {
    /// Metadata describing the fields of this type.
    fn model() -> &'static Model
    where
        Self: Sized;

    /// Read the value of a declared field.
    fn get(&self, field: &str) -> Value<'_>;
}

/// One member of an enumeration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumMember {
    /// Member name, matched case-insensitively by filters.
    pub name: &'static str,
    /// Underlying numeric value.
    pub value: i64,
}

impl EnumMember {
    /// Create an enum member.
    pub const fn new(name: &'static str, value: i64) -> Self {
        Self { name, value }
    }
}

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Text.
    String,
    /// Boolean.
    Bool,
    /// Integer number.
    Int,
    /// Floating point number.
    Float,
    /// Date and time.
    DateTime,
    /// Globally unique identifier.
    Guid,
    /// Enumeration; values are read as `Value::Int` discriminants.
    Enum(&'static [EnumMember]),
    /// Any other type, compared through its textual form.
    Other(&'static str),
    /// Reference to a single related entity.
    Navigation(fn() -> &'static Model),
    /// Collection of related entities.
    Collection(fn() -> &'static Model),
}

impl FieldKind {
    /// Name of the kind as shown in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::Enum(_) => "Enum",
            Self::Other(name) => *name,
            Self::Navigation(target) | Self::Collection(target) => target().name(),
        }
    }

    /// Model of the related entity for navigation and collection fields.
    pub fn target(&self) -> Option<&'static Model> {
        match self {
            Self::Navigation(target) | Self::Collection(target) => Some(target()),
            _ => None,
        }
    }

    /// Whether the field holds a scalar value.
    pub fn is_scalar(&self) -> bool {
        self.target().is_none()
    }

    /// Whether the field holds a collection of entities.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

/// A declared field of a [`Model`].
#[derive(Debug, Clone)]
pub struct Field {
    /// Canonical field name.
    pub name: &'static str,
    /// Kind of the field.
    pub kind: FieldKind,
    /// Whether the field may hold `Value::Null`.
    pub nullable: bool,
    /// Whether filters may address the field.
    pub filterable: bool,
    /// Whether sorts may address the field.
    pub sortable: bool,
}

impl Field {
    /// Create a non-nullable, filterable and sortable field.
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            filterable: true,
            sortable: true,
        }
    }

    /// Type name including a `?` suffix for nullable fields.
    pub fn type_name(&self) -> String {
        if self.nullable {
            format!("{}?", self.kind.type_name())
        } else {
            self.kind.type_name().to_string()
        }
    }
}

/// Field metadata of one entity type.
#[derive(Debug, Clone)]
pub struct Model {
    name: &'static str,
    fields: Vec<Field>,
}

impl Model {
    /// Start building a model.
    pub fn builder(name: &'static str) -> ModelBuilder {
        ModelBuilder {
            name,
            fields: Vec::new(),
        }
    }

    /// Name of the entity type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All declared fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by exact name.
    pub fn field_exact(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by name, exact match first, then case-insensitively.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_exact(name).or_else(|| {
            self.fields
                .iter()
                .find(|f| f.name.eq_ignore_ascii_case(name))
        })
    }

    /// Look up a field honoring the case policy.
    pub fn field_with_case(&self, name: &str, ignore_case: bool) -> Option<&Field> {
        if ignore_case {
            self.field(name)
        } else {
            self.field_exact(name)
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Builder for [`Model`].
///
/// Modifiers such as [`ModelBuilder::nullable`] apply to the most recently
/// added field.
#[derive(Debug)]
pub struct ModelBuilder {
    name: &'static str,
    fields: Vec<Field>,
}

impl ModelBuilder {
    /// Add a field.
    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(Field::new(name, kind));
        self
    }

    /// Mark the last field nullable.
    pub fn nullable(self) -> Self {
        self.modify_last(|f| f.nullable = true)
    }

    /// Exclude the last field from filtering.
    pub fn not_filterable(self) -> Self {
        self.modify_last(|f| f.filterable = false)
    }

    /// Exclude the last field from sorting.
    pub fn not_sortable(self) -> Self {
        self.modify_last(|f| f.sortable = false)
    }

    fn modify_last(mut self, apply: impl FnOnce(&mut Field)) -> Self {
        if let Some(field) = self.fields.last_mut() {
            apply(field);
        }
        self
    }

    /// Finish the model.
    pub fn build(self) -> Model {
        Model {
            name: self.name,
            fields: self.fields,
        }
    }
}
