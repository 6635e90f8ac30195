//! # sift-query
//!
//! Compile filter, sort and paging micro-syntax into predicates and
//! orderings over your own types.
//!
//! This crate provides:
//! - A value-filter micro-syntax (`~joe`, `>=18`, `ISNULL`, `a,b`) and its
//!   tokenizer
//! - Per-type value filter creators for strings, numbers, booleans, dates,
//!   identifiers, enums and everything else
//! - Entity filters with nesting over navigations and collections
//! - Multi-key sorting from syntax like `lastname,-firstname`
//! - Page resolution to skip/take
//! - Process-wide and per-call configuration loaded from TOML
//!
//! ## Describing an entity
//!
//! Types opt in by implementing [`Entity`]:
//!
//! ```rust
//! use std::sync::OnceLock;
//! use sift_query::prelude::*;
//!
//! struct Person {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Entity for Person {
//!     fn model() -> &'static Model {
//!         static MODEL: OnceLock<Model> = OnceLock::new();
//!         MODEL.get_or_init(|| {
//!             Model::builder("Person")
//!                 .field("Name", FieldKind::String)
//!                 .field("Age", FieldKind::Int)
//!                 .build()
//!         })
//!     }
//!
//!     fn get(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "Name" => Value::from(&self.name),
//!             "Age" => Value::from(self.age),
//!             _ => Value::Null,
//!         }
//!     }
//! }
//!
//! let people = vec![
//!     Person { name: "Joe".into(), age: 41 },
//!     Person { name: "Ann".into(), age: 17 },
//!     Person { name: "Joanna".into(), age: 29 },
//! ];
//!
//! // Filtering
//! let mut filter = EntityFilter::<Person>::new();
//! filter.add_syntax("name", "~jo").add_syntax("age", ">=18");
//! let adults = filter.compile().unwrap().filter(&people).unwrap();
//! assert_eq!(adults.len(), 2);
//!
//! // Sorting
//! let mut sort = EntitySort::<Person>::new();
//! sort.add_syntax("-age").unwrap();
//! let sorted = sort.compile().unwrap().sorted(&people).unwrap();
//! assert_eq!(sorted[0].name, "Joe");
//!
//! // Paging
//! let page = EntityPage::new("2", "2");
//! assert_eq!(page.paginate(&people).unwrap().len(), 1);
//! ```
//!
//! ## Filter micro-syntax
//!
//! | Syntax      | Operator                 |
//! |-------------|--------------------------|
//! | `value`     | default for the type     |
//! | `~value`    | contains                 |
//! | `^value`    | starts with              |
//! | `$value`    | ends with                |
//! | `=value`    | equal, case-insensitive  |
//! | `==value`   | equal, case-sensitive    |
//! | `!value`    | not equal                |
//! | `<value`    | less than                |
//! | `<=value`   | less than or equal       |
//! | `>value`    | greater than             |
//! | `>=value`   | greater than or equal    |
//! | `ISNULL`    | is null                  |
//! | `NOTNULL`   | not null                 |
//!
//! Values are separated by `,`, `;` or `|`; a literal comma or operator is
//! escaped with `\`. Values on the same property are OR'd, except
//! not-equal values, which are AND'd onto the result.
//!
//! ## Logging
//!
//! Events are emitted through `tracing`. Enable the `tracing-subscriber`
//! feature and call [`logging::init`] to install a subscriber controlled by
//! `SIFT_DEBUG`, `SIFT_LOG_LEVEL` and `SIFT_LOG_FORMAT`.

pub mod logging;

pub mod config;
pub mod creators;
pub mod culture;
pub mod error;
pub mod filter;
pub mod model;
pub mod page;
pub mod predicate;
pub mod sort;
pub mod span;
pub mod value;

pub use config::{
    ConditionalAccess, FilterConfiguration, PageConfiguration, SiftConfig, SortConfiguration,
    StringComparison,
};
pub use error::{ErrorCode, ErrorContext, SiftError, SiftResult};
pub use filter::{
    CompiledFilter, EntityFilter, FilterInterceptor, FilterOperator, NestedFilter, PropertyFilter,
    UntypedEntityFilter, ValueFilter,
};
pub use model::{Entity, EnumMember, Field, FieldKind, Model};
pub use page::{EntityPage, PageBounds, PageInterceptor};
pub use predicate::{Access, Predicate};
pub use sort::{CompiledSort, EntitySort, PropertySort, SortDirection};
pub use value::{Scalar, Value};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        ConditionalAccess, FilterConfiguration, PageConfiguration, SortConfiguration,
    };
    pub use crate::error::{SiftError, SiftResult};
    pub use crate::filter::{EntityFilter, FilterInterceptor, FilterOperator, ValueFilter};
    pub use crate::model::{Entity, EnumMember, FieldKind, Model};
    pub use crate::page::EntityPage;
    pub use crate::predicate::Predicate;
    pub use crate::sort::{EntitySort, SortDirection};
    pub use crate::value::Value;
}
