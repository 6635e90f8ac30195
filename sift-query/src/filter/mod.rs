//! Entity filtering.
//!
//! A filter is described per property with value filters (usually given in
//! micro-syntax such as `~joe` or `>=18`) and compiles to a [`Predicate`]
//! over the whole entity, nested filters included.
//!
//! [`Predicate`]: crate::predicate::Predicate

mod entity;
mod interceptor;
mod operator;
mod property;
mod value_filter;

pub use entity::{CompiledFilter, EntityFilter, UntypedEntityFilter};
pub use interceptor::FilterInterceptor;
pub use operator::FilterOperator;
pub use property::{NestedFilter, PropertyFilter};
pub use value_filter::ValueFilter;
