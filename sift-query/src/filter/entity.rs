//! Entity filters and their compilation.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{FilterInterceptor, NestedFilter, PropertyFilter, ValueFilter};
use crate::config::FilterConfiguration;
use crate::creators::{self, PropertyContext};
use crate::error::{SiftError, SiftResult};
use crate::model::{Entity, Field, Model};
use crate::predicate::{Access, Predicate};

/// A filter over entities described by a [`Model`] chosen at compile time.
///
/// This is the storage behind [`EntityFilter`] and the form nested filters
/// take. Property names are kept as given and resolved when compiling.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntypedEntityFilter {
    #[serde(default)]
    property_filters: Vec<PropertyFilter>,
    #[serde(default)]
    nested_filters: Vec<NestedFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    configuration: Option<Arc<FilterConfiguration>>,
    #[serde(skip)]
    interceptor: Option<Arc<dyn FilterInterceptor>>,
}

impl UntypedEntityFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// The property filters, in insertion order.
    pub fn property_filters(&self) -> &[PropertyFilter] {
        &self.property_filters
    }

    /// The nested filters, in insertion order.
    pub fn nested_filters(&self) -> &[NestedFilter] {
        &self.nested_filters
    }

    /// The filter's own configuration.
    pub fn configuration(&self) -> Option<&FilterConfiguration> {
        self.configuration.as_deref()
    }

    /// The filter's own configuration, else the process-wide default.
    pub fn effective_configuration(&self) -> Arc<FilterConfiguration> {
        self.configuration
            .clone()
            .unwrap_or_else(FilterConfiguration::current)
    }

    /// Set the filter's own configuration.
    pub fn set_configuration(&mut self, configuration: Option<FilterConfiguration>) {
        self.configuration = configuration.map(Arc::new);
    }

    /// Set the interceptor.
    pub fn set_interceptor(&mut self, interceptor: Option<Arc<dyn FilterInterceptor>>) {
        self.interceptor = interceptor;
    }

    /// Add value filters for a property. An empty list adds nothing.
    pub fn add(&mut self, property: &str, filters: Vec<ValueFilter>) {
        if !filters.is_empty() {
            self.property_filters.push(PropertyFilter::new(property, filters));
        }
    }

    /// Remove all filters of a property, then add the given ones.
    pub fn replace(&mut self, property: &str, filters: Vec<ValueFilter>) {
        self.clear(property);
        self.add(property, filters);
    }

    /// Remove all filters of a property, nested filters included.
    pub fn clear(&mut self, property: &str) {
        self.property_filters.retain(|f| f.property_name != property);
        self.nested_filters.retain(|f| f.property_name != property);
    }

    /// Remove every filter.
    pub fn clear_all(&mut self) {
        self.property_filters.clear();
        self.nested_filters.clear();
    }

    /// Add a filter on a navigation property.
    pub fn add_nested(&mut self, property: &str, nested: UntypedEntityFilter) {
        self.nested_filters.push(NestedFilter::new(property, nested));
    }

    /// The first nested filter on a navigation property.
    pub fn nested(&self, property: &str) -> Option<&UntypedEntityFilter> {
        self.nested_filters
            .iter()
            .find(|f| f.property_name == property)
            .map(|f| &f.entity_filter)
    }

    /// All value filters of a property, across every `add`.
    pub fn property_filter_values(&self, property: &str) -> Option<Vec<ValueFilter>> {
        let values: Vec<ValueFilter> = self
            .property_filters
            .iter()
            .filter(|f| f.property_name == property)
            .flat_map(|f| f.value_filters.iter().cloned())
            .collect();
        (!values.is_empty()).then_some(values)
    }

    /// Whether the filter accepts everything.
    pub fn is_empty(&self) -> bool {
        self.property_filters.iter().all(|f| f.value_filters.is_empty())
            && self.nested_filters.iter().all(|f| f.entity_filter.is_empty())
    }

    /// Keep only the filters whose properties resolve on `target`.
    pub fn cast(&self, target: &'static Model) -> UntypedEntityFilter {
        let property_filters = self
            .property_filters
            .iter()
            .filter_map(|f| {
                let field = target.field(&f.property_name)?;
                field
                    .filterable
                    .then(|| PropertyFilter::new(field.name, f.value_filters.clone()))
            })
            .collect::<Vec<_>>();

        let nested_filters = self
            .nested_filters
            .iter()
            .filter_map(|f| {
                let field = target.field(&f.property_name).filter(|field| field.filterable)?;
                let nested_target = field.kind.target()?;
                Some(NestedFilter::new(field.name, f.entity_filter.cast(nested_target)))
            })
            .collect::<Vec<_>>();

        let dropped = self.property_filters.len() + self.nested_filters.len()
            - property_filters.len()
            - nested_filters.len();
        if dropped > 0 {
            debug!(target_entity = target.name(), dropped, "Dropped filters while casting");
        }

        UntypedEntityFilter {
            property_filters,
            nested_filters,
            configuration: self.configuration.clone(),
            interceptor: self.interceptor.clone(),
        }
    }

    /// Compile to a predicate over entities of `model`.
    ///
    /// Nested filters compile with their own configuration when they carry
    /// one and with `config` otherwise; the same holds for interceptors.
    pub fn build(
        &self,
        model: &'static Model,
        config: &FilterConfiguration,
        interceptor: Option<&Arc<dyn FilterInterceptor>>,
    ) -> SiftResult<Predicate> {
        let interceptor = self.interceptor.as_ref().or(interceptor);
        let mut predicates = Vec::with_capacity(self.property_filters.len() + self.nested_filters.len());

        for property_filter in &self.property_filters {
            let field = filterable_field(model, &property_filter.property_name)?;

            let intercepted = interceptor
                .and_then(|i| i.create_property_filter(model, property_filter, config));
            let result = match intercepted {
                Some(result) => result,
                None => {
                    let ctx = PropertyContext::new(model, field, config);
                    creators::create_property_predicate(&ctx, &property_filter.value_filters)
                }
            };

            predicates.push(degrade(result, config, model, field)?);
        }

        for nested in &self.nested_filters {
            let field = filterable_field(model, &nested.property_name)?;
            let target = field
                .kind
                .target()
                .ok_or_else(|| SiftError::not_navigable(model.name(), field.name))?;

            let nested_config = nested.entity_filter.configuration().unwrap_or(config);
            let inner = nested.entity_filter.build(target, nested_config, interceptor)?;
            if inner.is_true() {
                continue;
            }

            let access = Access::root().member(field.name, config.conditional_access.guards_tree());
            let predicate = if field.kind.is_collection() {
                Predicate::any(access, inner)
            } else {
                let rebased = inner.rebase(&access);
                if field.nullable && config.conditional_access.guards_evaluation() {
                    Predicate::and([Predicate::NotNull(access), rebased])
                } else {
                    rebased
                }
            };
            predicates.push(predicate);
        }

        debug!(
            entity = model.name(),
            properties = self.property_filters.len(),
            nested = self.nested_filters.len(),
            "Compiled entity filter"
        );
        Ok(Predicate::and(predicates))
    }
}

fn filterable_field(model: &'static Model, property: &str) -> SiftResult<&'static Field> {
    let field = model
        .field(property)
        .ok_or_else(|| SiftError::unknown_property(model.name(), property))?;
    if !field.filterable {
        return Err(SiftError::not_filterable(model.name(), field.name));
    }
    Ok(field)
}

fn degrade(
    result: SiftResult<Predicate>,
    config: &FilterConfiguration,
    model: &Model,
    field: &Field,
) -> SiftResult<Predicate> {
    match result {
        Err(e) if config.ignore_parse_exceptions && e.is_data_error() => {
            warn!(
                entity = model.name(),
                property = field.name,
                error = %e,
                "Ignoring unparsable filter value"
            );
            Ok(Predicate::True)
        }
        other => other,
    }
}

impl fmt::Debug for UntypedEntityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UntypedEntityFilter")
            .field("property_filters", &self.property_filters)
            .field("nested_filters", &self.nested_filters)
            .field("configuration", &self.configuration)
            .field("interceptor", &self.interceptor.is_some())
            .finish()
    }
}

/// A filter over entities of type `T`.
///
/// ```rust
/// # use std::sync::OnceLock;
/// # use sift_query::model::{Entity, FieldKind, Model};
/// # use sift_query::value::Value;
/// use sift_query::filter::EntityFilter;
///
/// # struct Person { name: &'static str, age: i64 }
/// # impl Entity for Person {
/// #     fn model() -> &'static Model {
/// #         static MODEL: OnceLock<Model> = OnceLock::new();
/// #         MODEL.get_or_init(|| Model::builder("Person")
/// #             .field("Name", FieldKind::String)
/// #             .field("Age", FieldKind::Int)
/// #             .build())
/// #     }
/// #     fn get(&self, field: &str) -> Value<'_> {
/// #         match field { "Name" => self.name.into(), "Age" => self.age.into(), _ => Value::Null }
/// #     }
/// # }
/// let people = [Person { name: "Joe", age: 30 }, Person { name: "Eve", age: 17 }];
///
/// let mut filter = EntityFilter::<Person>::new();
/// filter.add_syntax("name", "!eve").add_syntax("Age", ">=18");
///
/// let compiled = filter.compile().unwrap();
/// let adults = compiled.filter(&people).unwrap();
/// assert_eq!(adults.len(), 1);
/// assert_eq!(adults[0].name, "Joe");
/// ```
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityFilter<T> {
    inner: UntypedEntityFilter,
    #[serde(skip)]
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityFilter<T> {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::from_untyped(UntypedEntityFilter::new())
    }

    /// Wrap an untyped filter.
    pub fn from_untyped(inner: UntypedEntityFilter) -> Self {
        Self {
            inner,
            _entity: PhantomData,
        }
    }

    /// Set the filter's own configuration.
    pub fn with_configuration(mut self, configuration: FilterConfiguration) -> Self {
        self.inner.set_configuration(Some(configuration));
        self
    }

    /// Set the interceptor.
    pub fn with_interceptor(mut self, interceptor: impl FilterInterceptor + 'static) -> Self {
        self.inner.set_interceptor(Some(Arc::new(interceptor)));
        self
    }

    /// The untyped storage.
    pub fn as_untyped(&self) -> &UntypedEntityFilter {
        &self.inner
    }

    /// Unwrap into the untyped storage.
    pub fn into_untyped(self) -> UntypedEntityFilter {
        self.inner
    }

    fn canonical(property: &str) -> &str {
        T::model().field(property).map_or(property, |f| f.name)
    }

    /// Add value filters for a property, AND-combined with earlier ones.
    pub fn add(&mut self, property: &str, filters: impl IntoIterator<Item = ValueFilter>) -> &mut Self {
        self.inner.add(Self::canonical(property), filters.into_iter().collect());
        self
    }

    /// Add value filters given in micro-syntax.
    pub fn add_syntax(&mut self, property: &str, syntax: &str) -> &mut Self {
        let filters = ValueFilter::from_syntax(syntax, &self.inner.effective_configuration());
        self.add(property, filters)
    }

    /// Replace the value filters of a property.
    pub fn replace(&mut self, property: &str, filters: impl IntoIterator<Item = ValueFilter>) -> &mut Self {
        self.inner.replace(Self::canonical(property), filters.into_iter().collect());
        self
    }

    /// Replace the value filters of a property with ones given in micro-syntax.
    pub fn replace_syntax(&mut self, property: &str, syntax: &str) -> &mut Self {
        let filters = ValueFilter::from_syntax(syntax, &self.inner.effective_configuration());
        self.replace(property, filters)
    }

    /// Remove all filters of a property.
    pub fn clear(&mut self, property: &str) -> &mut Self {
        self.inner.clear(Self::canonical(property));
        self
    }

    /// Remove every filter.
    pub fn clear_all(&mut self) -> &mut Self {
        self.inner.clear_all();
        self
    }

    /// Add a filter on a navigation property.
    pub fn add_nested<U: Entity>(&mut self, property: &str, nested: EntityFilter<U>) -> &mut Self {
        self.inner.add_nested(Self::canonical(property), nested.inner);
        self
    }

    /// Replace the filters on a navigation property.
    pub fn replace_nested<U: Entity>(&mut self, property: &str, nested: EntityFilter<U>) -> &mut Self {
        self.clear(property);
        self.add_nested(property, nested)
    }

    /// A copy of the first nested filter on a navigation property.
    pub fn get_nested<U: Entity>(&self, property: &str) -> Option<EntityFilter<U>> {
        self.inner
            .nested(Self::canonical(property))
            .map(|nested| EntityFilter::from_untyped(nested.clone()))
    }

    /// All value filters of a property.
    pub fn get_property_filter_values(&self, property: &str) -> Option<Vec<ValueFilter>> {
        self.inner.property_filter_values(Self::canonical(property))
    }

    /// All value filters of a property as micro-syntax.
    pub fn get_property_filter_syntax(&self, property: &str) -> Option<String> {
        let values = self.get_property_filter_values(property)?;
        Some(ValueFilter::join_syntax(&values, &self.inner.effective_configuration()))
    }

    /// Whether the filter accepts everything.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Convert to a filter over `U`, keeping the filters whose properties
    /// resolve on it.
    pub fn cast<U: Entity>(&self) -> EntityFilter<U> {
        EntityFilter::from_untyped(self.inner.cast(U::model()))
    }

    /// Build the predicate tree with the effective configuration.
    pub fn build_predicate(&self) -> SiftResult<Predicate> {
        self.inner
            .build(T::model(), &self.inner.effective_configuration(), None)
    }

    /// Compile with the effective configuration.
    pub fn compile(&self) -> SiftResult<CompiledFilter<T>> {
        self.compile_with(&self.inner.effective_configuration())
    }

    /// Compile with a per-call configuration.
    pub fn compile_with(&self, config: &FilterConfiguration) -> SiftResult<CompiledFilter<T>> {
        let predicate = self.inner.build(T::model(), config, None)?;
        Ok(CompiledFilter {
            predicate,
            guarded: config.conditional_access.guards_evaluation(),
            _entity: PhantomData,
        })
    }
}

impl<T: Entity> Default for EntityFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EntityFilter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for EntityFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityFilter").field(&self.inner).finish()
    }
}

/// A compiled filter, ready to evaluate entities of type `T`.
pub struct CompiledFilter<T> {
    predicate: Predicate,
    guarded: bool,
    _entity: PhantomData<fn(&T)>,
}

impl<T: Entity> CompiledFilter<T> {
    /// The predicate tree, for query providers.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Unwrap the predicate tree.
    pub fn into_predicate(self) -> Predicate {
        self.predicate
    }

    /// Evaluate one entity.
    pub fn evaluate(&self, item: &T) -> SiftResult<bool> {
        self.predicate.evaluate(item, self.guarded)
    }

    /// Whether one entity matches. Evaluation faults count as no match.
    pub fn matches(&self, item: &T) -> bool {
        self.evaluate(item).unwrap_or(false)
    }

    /// Select the matching entities, preserving order.
    pub fn filter<'a>(&self, items: &'a [T]) -> SiftResult<Vec<&'a T>> {
        let mut selected = Vec::new();
        for item in items {
            if self.evaluate(item)? {
                selected.push(item);
            }
        }
        Ok(selected)
    }
}

impl<T> fmt::Display for CompiledFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.predicate, f)
    }
}

impl<T> fmt::Debug for CompiledFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("predicate", &self.predicate)
            .field("guarded", &self.guarded)
            .finish()
    }
}
