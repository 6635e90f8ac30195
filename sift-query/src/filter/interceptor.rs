//! Per-property compilation override.

use crate::config::FilterConfiguration;
use crate::error::SiftResult;
use crate::model::Model;
use crate::predicate::Predicate;

use super::PropertyFilter;

/// Compiles selected property filters in place of the built-in creators.
///
/// Returning `None` falls through to the built-in pipeline. The returned
/// predicate is bound to an entity of `model`, so accesses start at
/// [`Access::root`](crate::predicate::Access::root).
///
/// Interceptors are handed down to nested filters that do not carry their
/// own.
///
/// ```rust
/// use sift_query::filter::{FilterInterceptor, PropertyFilter};
/// use sift_query::config::FilterConfiguration;
/// use sift_query::model::Model;
/// use sift_query::predicate::{Access, Predicate};
/// use sift_query::error::SiftResult;
/// use sift_query::value::Value;
///
/// #[derive(Debug)]
/// struct FullName;
///
/// impl FilterInterceptor for FullName {
///     fn create_property_filter(
///         &self,
///         _model: &'static Model,
///         filter: &PropertyFilter,
///         _config: &FilterConfiguration,
///     ) -> Option<SiftResult<Predicate>> {
///         (filter.property_name() == "FullName").then(|| {
///             Ok(Predicate::custom(Access::root(), "full_name", |_| true))
///         })
///     }
/// }
/// ```
pub trait FilterInterceptor: Send + Sync {
    /// Compile `filter` for an entity of `model`, or return `None`.
    fn create_property_filter(
        &self,
        model: &'static Model,
        filter: &PropertyFilter,
        config: &FilterConfiguration,
    ) -> Option<SiftResult<Predicate>>;
}

impl<F> FilterInterceptor for F
where
    F: Fn(&'static Model, &PropertyFilter, &FilterConfiguration) -> Option<SiftResult<Predicate>>
        + Send
        + Sync,
{
    fn create_property_filter(
        &self,
        model: &'static Model,
        filter: &PropertyFilter,
        config: &FilterConfiguration,
    ) -> Option<SiftResult<Predicate>> {
        self(model, filter, config)
    }
}
