use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompiledSort, PropertySort, SortDirection, parse_sort_syntax};
use crate::config::SortConfiguration;
use crate::error::{SiftError, SiftResult};
use crate::model::{Entity, Model};
use crate::predicate::Access;

/// An ordered list of sort keys for entities of type `T`.
///
/// ```rust
/// # use std::sync::OnceLock;
/// # use sift_query::model::{Entity, FieldKind, Model};
/// # use sift_query::value::Value;
/// use sift_query::sort::EntitySort;
///
/// # struct Person { first: &'static str, last: &'static str }
/// # impl Entity for Person {
/// #     fn model() -> &'static Model {
/// #         static MODEL: OnceLock<Model> = OnceLock::new();
/// #         MODEL.get_or_init(|| Model::builder("Person")
/// #             .field("FirstName", FieldKind::String)
/// #             .field("LastName", FieldKind::String)
/// #             .build())
/// #     }
/// #     fn get(&self, field: &str) -> Value<'_> {
/// #         match field { "FirstName" => self.first.into(), "LastName" => self.last.into(), _ => Value::Null }
/// #     }
/// # }
/// let mut people = vec![
///     Person { first: "Ann", last: "Smith" },
///     Person { first: "Bob", last: "Smith" },
///     Person { first: "Cid", last: "Jones" },
/// ];
///
/// let mut sort = EntitySort::<Person>::new();
/// sort.add_syntax("lastname,-firstname").unwrap();
/// sort.compile().unwrap().sort(&mut people).unwrap();
///
/// let firsts: Vec<_> = people.iter().map(|p| p.first).collect();
/// assert_eq!(firsts, ["Cid", "Bob", "Ann"]);
/// ```
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySort<T> {
    #[serde(default)]
    property_sorts: Vec<PropertySort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    configuration: Option<Arc<SortConfiguration>>,
    #[serde(skip)]
    _entity: PhantomData<fn() -> T>,
}

/// A resolved sort path.
pub(crate) struct ResolvedPath {
    pub(crate) canonical: String,
    pub(crate) access: Access,
}

/// Resolve a dotted sort path against `model`.
///
/// Every segment must name a sortable field; every segment but the last must
/// be a single-valued navigation and the last must be a scalar.
/// [`PropertySort::PATH_TO_SELF`] names the entity itself, which has no
/// ordering of its own.
pub(crate) fn resolve_path(
    model: &'static Model,
    path: &str,
    ignore_case: bool,
    guards_tree: bool,
) -> SiftResult<ResolvedPath> {
    if path == PropertySort::PATH_TO_SELF {
        return Err(SiftError::not_sortable(model.name(), path));
    }

    let segments: Vec<&str> = path.split('.').map(str::trim).collect();
    let mut current = model;
    let mut access = Access::root();
    let mut names = Vec::with_capacity(segments.len());

    for (i, segment) in segments.iter().enumerate() {
        let last = i + 1 == segments.len();
        let field = current
            .field_with_case(segment, ignore_case)
            .ok_or_else(|| SiftError::unknown_sort_property(model.name(), path))?;
        if !field.sortable || field.kind.is_collection() || (last && !field.kind.is_scalar()) {
            return Err(SiftError::not_sortable(model.name(), path));
        }

        access = access.member(field.name, guards_tree && !last);
        names.push(field.name);

        if !last {
            current = field
                .kind
                .target()
                .ok_or_else(|| SiftError::unknown_sort_property(model.name(), path))?;
        }
    }

    Ok(ResolvedPath {
        canonical: names.join("."),
        access,
    })
}

impl<T: Entity> EntitySort<T> {
    /// Create an empty sort.
    pub fn new() -> Self {
        Self {
            property_sorts: Vec::new(),
            configuration: None,
            _entity: PhantomData,
        }
    }

    /// Set the sort's own configuration.
    pub fn with_configuration(mut self, configuration: SortConfiguration) -> Self {
        self.configuration = Some(Arc::new(configuration));
        self
    }

    /// The sort's own configuration.
    pub fn configuration(&self) -> Option<&SortConfiguration> {
        self.configuration.as_deref()
    }

    /// The sort's own configuration, else the process-wide default.
    pub fn effective_configuration(&self) -> Arc<SortConfiguration> {
        self.configuration
            .clone()
            .unwrap_or_else(SortConfiguration::current)
    }

    /// The property sorts, ordered by position.
    pub fn property_sorts(&self) -> Vec<&PropertySort> {
        let mut sorts: Vec<&PropertySort> = self.property_sorts.iter().collect();
        sorts.sort_by_key(|s| s.position);
        sorts
    }

    fn next_position(&self) -> usize {
        self.property_sorts
            .iter()
            .map(|s| s.position + 1)
            .max()
            .unwrap_or(0)
    }

    /// Append a sort key. The path is resolved when compiling.
    pub fn add(&mut self, property_path: &str, direction: SortDirection) -> &mut Self {
        let position = self.next_position();
        self.property_sorts
            .push(PropertySort::new(property_path, direction, position));
        self
    }

    /// Append the sort keys given in micro-syntax.
    ///
    /// Tokens whose path does not resolve to a sortable property are
    /// dropped.
    pub fn add_syntax(&mut self, syntax: &str) -> SiftResult<&mut Self> {
        let config = self.effective_configuration();
        for (path, direction) in parse_sort_syntax(syntax, &config)? {
            match resolve_path(T::model(), &path, config.ignore_property_name_case, false) {
                Ok(resolved) => {
                    self.add(&resolved.canonical, direction);
                }
                Err(e) => {
                    debug!(entity = T::model().name(), path = %path, error = %e, "Dropped sort token");
                }
            }
        }
        Ok(self)
    }

    /// Remove every sort key.
    pub fn clear(&mut self) -> &mut Self {
        self.property_sorts.clear();
        self
    }

    /// Whether there are no sort keys.
    pub fn is_empty(&self) -> bool {
        self.property_sorts.is_empty()
    }

    /// Merge the keys of a sort on a navigation property, after the existing
    /// keys.
    ///
    /// Nested paths are prefixed with the property name and
    /// [`PropertySort::PATH_TO_SELF`] becomes the property itself, which then
    /// has to be a scalar to compile.
    pub fn add_nested<U: Entity>(&mut self, property: &str, nested: &EntitySort<U>) -> &mut Self {
        let property = T::model()
            .field(property)
            .map_or(property, |f| f.name);

        for sort in nested.property_sorts() {
            let path = if sort.is_self() {
                property.to_string()
            } else {
                format!("{}.{}", property, sort.property_path)
            };
            self.add(&path, sort.direction);
        }
        self
    }

    /// The keys below a navigation property, as a sort on its target.
    ///
    /// A key on the navigation itself becomes
    /// [`PropertySort::PATH_TO_SELF`].
    pub fn get_nested<U: Entity>(&self, property: &str) -> EntitySort<U> {
        let property = T::model()
            .field(property)
            .map_or(property, |f| f.name);
        let prefix = format!("{}.", property);

        let property_sorts = self
            .property_sorts
            .iter()
            .filter_map(|sort| {
                let path = if sort.property_path == property {
                    PropertySort::PATH_TO_SELF
                } else {
                    sort.property_path.strip_prefix(&prefix)?
                };
                Some(PropertySort::new(path, sort.direction, sort.position))
            })
            .collect();

        EntitySort {
            property_sorts,
            configuration: self.configuration.clone(),
            _entity: PhantomData,
        }
    }

    /// Convert to a sort over `U`, keeping the keys whose paths resolve on it.
    pub fn cast<U: Entity>(&self) -> EntitySort<U> {
        let ignore_case = self.effective_configuration().ignore_property_name_case;
        let property_sorts: Vec<PropertySort> = self
            .property_sorts
            .iter()
            .filter_map(|sort| {
                let resolved = resolve_path(U::model(), &sort.property_path, ignore_case, false).ok()?;
                Some(PropertySort::new(resolved.canonical, sort.direction, sort.position))
            })
            .collect();

        if property_sorts.len() < self.property_sorts.len() {
            debug!(
                target_entity = U::model().name(),
                dropped = self.property_sorts.len() - property_sorts.len(),
                "Dropped sorts while casting"
            );
        }

        EntitySort {
            property_sorts,
            configuration: self.configuration.clone(),
            _entity: PhantomData,
        }
    }

    /// Compile with the effective configuration.
    pub fn compile(&self) -> SiftResult<CompiledSort<T>> {
        self.compile_with(&self.effective_configuration())
    }

    /// Compile with a per-call configuration.
    ///
    /// Every path must resolve; unlike [`EntitySort::add_syntax`] nothing is
    /// dropped here.
    pub fn compile_with(&self, config: &SortConfiguration) -> SiftResult<CompiledSort<T>> {
        let mut keys = Vec::with_capacity(self.property_sorts.len());
        for sort in self.property_sorts() {
            let resolved = resolve_path(
                T::model(),
                &sort.property_path,
                config.ignore_property_name_case,
                config.conditional_access.guards_tree(),
            )?;
            keys.push((resolved.access, sort.direction));
        }

        debug!(entity = T::model().name(), keys = keys.len(), "Compiled entity sort");
        Ok(CompiledSort::new(keys, config.conditional_access.guards_evaluation()))
    }
}

impl<T: Entity> Default for EntitySort<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EntitySort<T> {
    fn clone(&self) -> Self {
        Self {
            property_sorts: self.property_sorts.clone(),
            configuration: self.configuration.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for EntitySort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySort")
            .field("property_sorts", &self.property_sorts)
            .field("configuration", &self.configuration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::FieldKind;
    use crate::value::Value;
    use pretty_assertions::assert_eq;
    use std::sync::OnceLock;

    struct Address;

    impl Entity for Address {
        fn model() -> &'static Model {
            static MODEL: OnceLock<Model> = OnceLock::new();
            MODEL.get_or_init(|| {
                Model::builder("Address")
                    .field("Street", FieldKind::String)
                    .field("Zip", FieldKind::String)
                    .build()
            })
        }

        fn get(&self, _field: &str) -> Value<'_> {
            Value::Null
        }
    }

    struct Person;

    impl Entity for Person {
        fn model() -> &'static Model {
            static MODEL: OnceLock<Model> = OnceLock::new();
            MODEL.get_or_init(|| {
                Model::builder("Person")
                    .field("FirstName", FieldKind::String)
                    .field("LastName", FieldKind::String)
                    .field("Address", FieldKind::Navigation(Address::model))
                    .nullable()
                    .field("Salary", FieldKind::Int)
                    .not_sortable()
                    .build()
            })
        }

        fn get(&self, _field: &str) -> Value<'_> {
            Value::Null
        }
    }

    struct Contact;

    impl Entity for Contact {
        fn model() -> &'static Model {
            static MODEL: OnceLock<Model> = OnceLock::new();
            MODEL.get_or_init(|| Model::builder("Contact").field("LastName", FieldKind::String).build())
        }

        fn get(&self, _field: &str) -> Value<'_> {
            Value::Null
        }
    }

    fn paths<T: Entity>(sort: &EntitySort<T>) -> Vec<String> {
        sort.property_sorts().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_syntax_resolves_and_drops() {
        let mut sort = EntitySort::<Person>::new();
        sort.add_syntax("lastname,-firstname,nickname,salary,address.street desc")
            .unwrap();
        assert_eq!(
            paths(&sort),
            vec!["LastName", "FirstName-desc", "Address.Street-desc"]
        );
        let positions: Vec<_> = sort.property_sorts().iter().map(|s| s.position()).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_case_sensitive_matching() {
        let mut sort = EntitySort::<Person>::new().with_configuration(SortConfiguration {
            ignore_property_name_case: false,
            ..Default::default()
        });
        sort.add_syntax("lastname,FirstName").unwrap();
        assert_eq!(paths(&sort), vec!["FirstName"]);
    }

    #[test]
    fn test_explicit_bad_path_fails_compile() {
        let mut sort = EntitySort::<Person>::new();
        sort.add("Nickname", SortDirection::Ascending);
        assert_eq!(sort.compile().unwrap_err().code, ErrorCode::UnknownSortProperty);

        let mut sort = EntitySort::<Person>::new();
        sort.add("Salary", SortDirection::Ascending);
        assert_eq!(sort.compile().unwrap_err().code, ErrorCode::PropertyNotSortable);
    }

    #[test]
    fn test_nested_merge_and_extract() {
        let mut address = EntitySort::<Address>::new();
        address
            .add(PropertySort::PATH_TO_SELF, SortDirection::Descending)
            .add("Street", SortDirection::Ascending);

        let mut sort = EntitySort::<Person>::new();
        sort.add("LastName", SortDirection::Ascending);
        sort.add_nested("address", &address);
        assert_eq!(paths(&sort), vec!["LastName", "Address-desc", "Address.Street"]);

        let nested = sort.get_nested::<Address>("Address");
        assert_eq!(paths(&nested), vec!["_self_-desc", "Street"]);
    }

    #[test]
    fn test_entity_valued_keys_are_rejected() {
        let mut address = EntitySort::<Address>::new();
        address.add(PropertySort::PATH_TO_SELF, SortDirection::Descending);
        let mut sort = EntitySort::<Person>::new();
        sort.add_nested("Address", &address);
        let err = sort.compile().unwrap_err();
        assert_eq!(err.code, ErrorCode::PropertyNotSortable);
        assert_eq!(err.context.property.as_deref(), Some("Address"));

        let mut sort = EntitySort::<Person>::new();
        sort.add(PropertySort::PATH_TO_SELF, SortDirection::Ascending);
        assert_eq!(sort.compile().unwrap_err().code, ErrorCode::PropertyNotSortable);

        let mut sort = EntitySort::<Person>::new();
        sort.add_syntax("address,_self_,lastname").unwrap();
        assert_eq!(paths(&sort), vec!["LastName"]);
    }

    #[test]
    fn test_self_key_merged_under_scalar_property() {
        let mut nested = EntitySort::<Contact>::new();
        nested.add(PropertySort::PATH_TO_SELF, SortDirection::Descending);
        let mut sort = EntitySort::<Person>::new();
        sort.add_nested("lastname", &nested);
        assert_eq!(paths(&sort), vec!["LastName-desc"]);
        assert!(sort.compile().is_ok());
    }

    #[test]
    fn test_cast_keeps_resolvable_paths() {
        let mut sort = EntitySort::<Person>::new();
        sort.add_syntax("-lastname,firstname").unwrap();
        let cast = sort.cast::<Contact>();
        assert_eq!(paths(&cast), vec!["LastName-desc"]);
    }

    #[test]
    fn test_json_round_trip() {
        let mut sort = EntitySort::<Person>::new();
        sort.add_syntax("lastname,-firstname").unwrap();
        let json = serde_json::to_string(&sort).unwrap();
        assert_eq!(
            json,
            r#"{"propertySorts":[{"propertyPath":"LastName","direction":"ascending","position":0},{"propertyPath":"FirstName","direction":"descending","position":1}]}"#
        );
        let copy: EntitySort<Person> = serde_json::from_str(&json).unwrap();
        assert_eq!(paths(&copy), paths(&sort));
    }
}
