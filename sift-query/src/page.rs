//! Paging.
//!
//! An [`EntityPage`] holds the page number and page size as raw strings so
//! that an absent value, an unparsable value and a non-positive value can be
//! told apart. Resolving it yields [`PageBounds`], a skip/take pair.
//!
//! ```rust
//! use sift_query::page::EntityPage;
//!
//! let page = EntityPage::new("2", "3");
//! let bounds = page.resolve().unwrap();
//! assert_eq!(bounds.skip, Some(3));
//! assert_eq!(bounds.take, Some(3));
//! assert_eq!(bounds.to_sql(), "LIMIT 3 OFFSET 3");
//!
//! let items = [1, 2, 3, 4, 5, 6, 7];
//! assert_eq!(page.paginate(&items).unwrap(), &[4, 5, 6]);
//! ```

use std::fmt::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PageConfiguration;
use crate::error::{SiftError, SiftResult};

/// Hook that may replace how a page is applied to a sequence.
///
/// Returning `None` falls back to the default slicing.
pub trait PageInterceptor<T>: Send + Sync {
    /// Apply `page` to `items`.
    fn paginate<'a>(
        &self,
        items: &'a [T],
        page: &EntityPage,
        config: &PageConfiguration,
    ) -> Option<SiftResult<&'a [T]>>;
}

/// A requested page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPage {
    /// One-based page number; empty when not supplied.
    #[serde(default)]
    pub page_number: String,
    /// Page size; empty when not supplied.
    #[serde(default)]
    pub page_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    configuration: Option<Arc<PageConfiguration>>,
}

/// Resolved skip and take counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PageBounds {
    /// Number of items to skip.
    pub skip: Option<usize>,
    /// Maximum number of items to take.
    pub take: Option<usize>,
}

impl PageBounds {
    /// Check if no bounds apply.
    pub fn is_empty(&self) -> bool {
        self.skip.is_none() && self.take.is_none()
    }

    /// Generate an SQL `LIMIT`/`OFFSET` clause.
    pub fn to_sql(&self) -> String {
        let mut sql = String::with_capacity(48);

        if let Some(take) = self.take {
            let _ = write!(sql, "LIMIT {}", take);
        }

        if let Some(skip) = self.skip {
            if !sql.is_empty() {
                sql.push(' ');
            }
            let _ = write!(sql, "OFFSET {}", skip);
        }

        sql
    }

    /// Slice `items` to these bounds.
    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.skip.unwrap_or(0).min(items.len());
        let rest = &items[start..];
        match self.take {
            Some(take) => &rest[..take.min(rest.len())],
            None => rest,
        }
    }
}

enum Parsed {
    Missing,
    Invalid,
    Value(usize),
}

fn parse_positive(raw: &str) -> Parsed {
    let raw = raw.trim();
    if raw.is_empty() {
        return Parsed::Missing;
    }
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => usize::try_from(n).map_or(Parsed::Invalid, Parsed::Value),
        _ => Parsed::Invalid,
    }
}

impl EntityPage {
    /// Create a page from raw values.
    pub fn new(page_number: impl Into<String>, page_size: impl Into<String>) -> Self {
        Self {
            page_number: page_number.into(),
            page_size: page_size.into(),
            configuration: None,
        }
    }

    /// Create a page from numbers; `None` leaves a value unset.
    pub fn from_numbers(page_number: Option<i64>, page_size: Option<i64>) -> Self {
        let raw = |n: Option<i64>| n.map(|n| n.to_string()).unwrap_or_default();
        Self::new(raw(page_number), raw(page_size))
    }

    /// Set the page's own configuration.
    pub fn with_configuration(mut self, configuration: PageConfiguration) -> Self {
        self.configuration = Some(Arc::new(configuration));
        self
    }

    /// The page's own configuration, else the process-wide default.
    pub fn effective_configuration(&self) -> Arc<PageConfiguration> {
        self.configuration
            .clone()
            .unwrap_or_else(PageConfiguration::current)
    }

    /// Resolve with the effective configuration.
    pub fn resolve(&self) -> SiftResult<PageBounds> {
        self.resolve_with(&self.effective_configuration())
    }

    /// Resolve with a per-call configuration.
    pub fn resolve_with(&self, config: &PageConfiguration) -> SiftResult<PageBounds> {
        let lenient = config.ignore_parse_exceptions;

        let take = match parse_positive(&self.page_size) {
            Parsed::Value(size) => Some(size),
            Parsed::Missing if lenient => None,
            Parsed::Missing => return Err(SiftError::page_size_not_set()),
            Parsed::Invalid if lenient => {
                warn!(page_size = %self.page_size, "Ignoring invalid page size");
                Some(usize::MAX)
            }
            Parsed::Invalid => return Err(SiftError::invalid_page_size(&self.page_size)),
        };

        let number = match parse_positive(&self.page_number) {
            Parsed::Value(number) => Some(number),
            Parsed::Missing => None,
            Parsed::Invalid if lenient => {
                warn!(page_number = %self.page_number, "Ignoring invalid page number");
                Some(1)
            }
            Parsed::Invalid => return Err(SiftError::invalid_page_number(&self.page_number)),
        };

        let skip = number.map(|n| (n - 1).saturating_mul(take.unwrap_or(0)));
        let bounds = PageBounds { skip, take };
        debug!(skip = ?bounds.skip, take = ?bounds.take, "Resolved page");
        Ok(bounds)
    }

    /// The items on this page.
    pub fn paginate<'a, T>(&self, items: &'a [T]) -> SiftResult<&'a [T]> {
        Ok(self.resolve()?.apply(items))
    }

    /// The items on this page, letting `interceptor` replace the slicing.
    pub fn paginate_with<'a, T>(
        &self,
        items: &'a [T],
        interceptor: &dyn PageInterceptor<T>,
    ) -> SiftResult<&'a [T]> {
        let config = self.effective_configuration();
        match interceptor.paginate(items, self, &config) {
            Some(result) => result,
            None => Ok(self.resolve_with(&config)?.apply(items)),
        }
    }
}
