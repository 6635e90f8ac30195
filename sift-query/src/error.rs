//! Structured error types for filter, sort and page compilation.
//!
//! Every error carries:
//! - An error code for programmatic handling
//! - Context about what was being compiled (entity, property, operator, value)
//! - Actionable suggestions that can be shown to an end user
//!
//! # Error Codes
//!
//! Error codes follow a pattern: S{category}{number}
//! - 1xxx: Filter errors (unparsable value, unsupported operator, unknown property)
//! - 2xxx: Sort errors (unknown or non-sortable property path)
//! - 3xxx: Page errors (missing or invalid page number/size)
//! - 4xxx: Evaluation errors (null navigation, value/type mismatch)
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use sift_query::{ErrorCode, SiftError};
//!
//! let err = SiftError::unknown_property("Person", "Nickname");
//! assert_eq!(err.code, ErrorCode::UnknownProperty);
//! assert_eq!(err.code.code(), "S1003");
//! assert!(err.to_string().contains("Nickname"));
//! ```

use std::fmt;
use thiserror::Error;

use crate::filter::FilterOperator;

/// Result type for compile operations.
pub type SiftResult<T> = Result<T, SiftError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Filter errors (1xxx)
    /// A filter value cannot be converted to the property type (S1001).
    InvalidFilterValue = 1001,
    /// The operator is not supported for the property type (S1002).
    UnsupportedOperator = 1002,
    /// The filtered property does not exist (S1003).
    UnknownProperty = 1003,
    /// The property exists but is excluded from filtering (S1004).
    PropertyNotFilterable = 1004,
    /// A nested filter targets a property that is not a navigation (S1005).
    NotNavigable = 1005,

    // Sort errors (2xxx)
    /// The sorted property path does not resolve (S2001).
    UnknownSortProperty = 2001,
    /// The property exists but is excluded from sorting (S2002).
    PropertyNotSortable = 2002,

    // Page errors (3xxx)
    /// Page size was not supplied (S3001).
    PageSizeNotSet = 3001,
    /// Page number is not a positive integer (S3002).
    InvalidPageNumber = 3002,
    /// Page size is not a positive integer (S3003).
    InvalidPageSize = 3003,

    // Evaluation errors (4xxx)
    /// A navigation along an access path was null and unguarded (S4001).
    NullNavigation = 4001,
    /// A runtime value did not have the shape its field declares (S4002).
    ValueMismatch = 4002,

    // Configuration errors (7xxx)
    /// Invalid configuration (S7001).
    InvalidConfiguration = 7001,
    /// The process-wide default was already published (S7002).
    DefaultAlreadySet = 7002,

    // Internal errors (9xxx)
    /// Internal error (S9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S1001").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidFilterValue => "Invalid filter value",
            Self::UnsupportedOperator => "Unsupported filter operator",
            Self::UnknownProperty => "Unknown property",
            Self::PropertyNotFilterable => "Property is not filterable",
            Self::NotNavigable => "Property is not a navigation",
            Self::UnknownSortProperty => "Unknown sort property",
            Self::PropertyNotSortable => "Property is not sortable",
            Self::PageSizeNotSet => "Page size not set",
            Self::InvalidPageNumber => "Invalid page number",
            Self::InvalidPageSize => "Invalid page size",
            Self::NullNavigation => "Null navigation",
            Self::ValueMismatch => "Value does not match field kind",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::DefaultAlreadySet => "Default configuration already set",
            Self::Internal => "Internal error",
        }
    }

    /// Whether the error depends on caller-supplied data rather than on code.
    ///
    /// Data errors are the ones degraded by `ignore_parse_exceptions`.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilterValue
                | Self::PageSizeNotSet
                | Self::InvalidPageNumber
                | Self::InvalidPageSize
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
///
/// Filter creation errors fill every field so the caller can present the
/// problem without inspecting a backtrace.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The filtered or sorted entity type.
    pub entity: Option<String>,
    /// The property (or property path) involved.
    pub property: Option<String>,
    /// The declared type of the property.
    pub property_type: Option<String>,
    /// The attempted filter operator.
    pub operator: Option<FilterOperator>,
    /// The offending raw value.
    pub value: Option<String>,
    /// The type the raw value was supplied as.
    pub value_type: Option<String>,
    /// Operators legal for the property type.
    pub supported_operators: Vec<FilterOperator>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors raised while compiling or applying filters, sorts and pages.
#[derive(Error, Debug)]
pub struct SiftError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for SiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl SiftError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Set the entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.context.entity = Some(entity.into());
        self
    }

    /// Set the property.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.context.property = Some(property.into());
        self
    }

    /// Set the declared property type.
    pub fn with_property_type(mut self, property_type: impl Into<String>) -> Self {
        self.context.property_type = Some(property_type.into());
        self
    }

    /// Set the attempted operator.
    pub fn with_operator(mut self, operator: FilterOperator) -> Self {
        self.context.operator = Some(operator);
        self
    }

    /// Set the offending raw value and the type it was supplied as.
    pub fn with_value(mut self, value: Option<&str>, value_type: impl Into<String>) -> Self {
        self.context.value = value.map(str::to_string);
        self.context.value_type = Some(value_type.into());
        self
    }

    /// Set the operators legal for the property type.
    pub fn with_supported_operators(mut self, operators: &[FilterOperator]) -> Self {
        self.context.supported_operators = operators.to_vec();
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// A filter value could not be converted to the property's type.
    pub fn invalid_filter_value(
        entity: &str,
        property: &str,
        property_type: &str,
        operator: FilterOperator,
        value: Option<&str>,
    ) -> Self {
        Self::new(
            ErrorCode::InvalidFilterValue,
            format!(
                "Cannot filter {}.{} by '{}': value is not a valid {}",
                entity,
                property,
                value.unwrap_or_default(),
                property_type
            ),
        )
        .with_entity(entity)
        .with_property(property)
        .with_property_type(property_type)
        .with_operator(operator)
        .with_value(value, "string")
        .with_suggestion(format!("Supply a value that parses as {}", property_type))
    }

    /// The operator is not supported for the property's type.
    pub fn unsupported_operator(
        entity: &str,
        property: &str,
        property_type: &str,
        operator: FilterOperator,
        value: Option<&str>,
        supported: &[FilterOperator],
    ) -> Self {
        let legal: Vec<_> = supported.iter().map(|op| op.name()).collect();
        Self::new(
            ErrorCode::UnsupportedOperator,
            format!(
                "Filter operator {} is not supported for {}.{} of type {}",
                operator.name(),
                entity,
                property,
                property_type
            ),
        )
        .with_entity(entity)
        .with_property(property)
        .with_property_type(property_type)
        .with_operator(operator)
        .with_value(value, "string")
        .with_supported_operators(supported)
        .with_suggestion(format!("Use one of: {}", legal.join(", ")))
    }

    /// The property does not exist on the entity.
    pub fn unknown_property(entity: &str, property: &str) -> Self {
        Self::new(
            ErrorCode::UnknownProperty,
            format!("Entity {} has no property named {}", entity, property),
        )
        .with_entity(entity)
        .with_property(property)
        .with_help("Property names are checked when the filter is compiled")
    }

    /// The property exists but is excluded from filtering.
    pub fn not_filterable(entity: &str, property: &str) -> Self {
        Self::new(
            ErrorCode::PropertyNotFilterable,
            format!("Property {}.{} is not filterable", entity, property),
        )
        .with_entity(entity)
        .with_property(property)
    }

    /// A nested filter or sort was attached to a scalar property.
    pub fn not_navigable(entity: &str, property: &str) -> Self {
        Self::new(
            ErrorCode::NotNavigable,
            format!("Property {}.{} is not a navigation property", entity, property),
        )
        .with_entity(entity)
        .with_property(property)
        .with_suggestion("Attach nested filters only to entity or collection properties")
    }

    /// The sort path does not resolve on the entity.
    pub fn unknown_sort_property(entity: &str, path: &str) -> Self {
        Self::new(
            ErrorCode::UnknownSortProperty,
            format!("Cannot sort {} by unknown property path {}", entity, path),
        )
        .with_entity(entity)
        .with_property(path)
    }

    /// The property exists but is excluded from sorting.
    pub fn not_sortable(entity: &str, path: &str) -> Self {
        Self::new(
            ErrorCode::PropertyNotSortable,
            format!("Property {}.{} is not sortable", entity, path),
        )
        .with_entity(entity)
        .with_property(path)
    }

    /// The page size was not supplied.
    pub fn page_size_not_set() -> Self {
        Self::new(ErrorCode::PageSizeNotSet, "Page size not set")
            .with_property("pageSize")
            .with_suggestion("Supply a page size or enable ignore_parse_exceptions")
    }

    /// The page number is not a positive integer.
    pub fn invalid_page_number(value: &str) -> Self {
        Self::new(
            ErrorCode::InvalidPageNumber,
            format!("Page number '{}' is not a positive integer", value),
        )
        .with_property("pageNumber")
        .with_value(Some(value), "string")
    }

    /// The page size is not a positive integer.
    pub fn invalid_page_size(value: &str) -> Self {
        Self::new(
            ErrorCode::InvalidPageSize,
            format!("Page size '{}' is not a positive integer", value),
        )
        .with_property("pageSize")
        .with_value(Some(value), "string")
    }

    /// An unguarded navigation along an access path was null.
    pub fn null_navigation(path: &str) -> Self {
        Self::new(
            ErrorCode::NullNavigation,
            format!("Navigation {} is null", path),
        )
        .with_property(path)
        .with_help("Set conditional access to Always or WhenCompiled to guard navigation chains")
    }

    /// A runtime value does not have the shape its field declares.
    pub fn value_mismatch(path: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::ValueMismatch,
            format!("Value of {} is not a {}", path, expected),
        )
        .with_property(path)
        .with_help("Entity::get must return values matching the declared field kinds")
    }

    /// The configuration is invalid.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorCode::InvalidConfiguration,
            format!("Invalid configuration: {}", message),
        )
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message.into()))
    }

    // ============== Error Checks ==============

    /// Check if this error was caused by caller-supplied data.
    pub fn is_data_error(&self) -> bool {
        self.code.is_data_error()
    }

    /// Check if this error points at a property that does not resolve.
    pub fn is_unknown_property(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnknownProperty | ErrorCode::UnknownSortProperty
        )
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        let ctx = &self.context;
        if let Some(ref entity) = ctx.entity {
            output.push_str(&format!("  → Entity: {}\n", entity));
        }
        if let Some(ref property) = ctx.property {
            output.push_str(&format!("  → Property: {}\n", property));
        }
        if let Some(ref property_type) = ctx.property_type {
            output.push_str(&format!("  → Property type: {}\n", property_type));
        }
        if let Some(operator) = ctx.operator {
            output.push_str(&format!("  → Operator: {}\n", operator.name()));
        }
        if let Some(ref value) = ctx.value {
            let value_type = ctx.value_type.as_deref().unwrap_or("string");
            output.push_str(&format!("  → Value: '{}' ({})\n", value, value_type));
        }
        if !ctx.supported_operators.is_empty() {
            let names: Vec<_> = ctx.supported_operators.iter().map(|op| op.name()).collect();
            output.push_str(&format!("  → Supported operators: {}\n", names.join(", ")));
        }

        if !ctx.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in ctx.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = ctx.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}
