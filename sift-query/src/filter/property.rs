use serde::{Deserialize, Serialize};

use super::{UntypedEntityFilter, ValueFilter};

/// All value filters given for one property.
///
/// The value filters combine as described in [`crate::creators`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    pub(crate) property_name: String,
    pub(crate) value_filters: Vec<ValueFilter>,
}

impl PropertyFilter {
    /// Create a property filter.
    pub fn new(property_name: impl Into<String>, value_filters: Vec<ValueFilter>) -> Self {
        Self {
            property_name: property_name.into(),
            value_filters,
        }
    }

    /// Name of the filtered property.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// The value filters.
    pub fn value_filters(&self) -> &[ValueFilter] {
        &self.value_filters
    }
}

/// A filter on the entity a navigation property points to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedFilter {
    pub(crate) property_name: String,
    pub(crate) entity_filter: UntypedEntityFilter,
}

impl NestedFilter {
    /// Create a nested filter.
    pub fn new(property_name: impl Into<String>, entity_filter: UntypedEntityFilter) -> Self {
        Self {
            property_name: property_name.into(),
            entity_filter,
        }
    }

    /// Name of the navigation property.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// The filter applied to the navigation target.
    pub fn entity_filter(&self) -> &UntypedEntityFilter {
        &self.entity_filter
    }
}
