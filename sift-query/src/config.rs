//! Compile configuration.
//!
//! Every compile call resolves its configuration as: the per-call override,
//! else the object's own configuration, else the process-wide default
//! published with `set_default`, else the built-in defaults.
//!
//! Configuration can be loaded from TOML:
//!
//! ```rust
//! use sift_query::config::{ConditionalAccess, SiftConfig};
//!
//! let config = SiftConfig::from_str(r#"
//!     [filter]
//!     culture = "de-DE"
//!     ignore_parse_exceptions = true
//!
//!     [sort]
//!     conditional_access = "always"
//! "#).unwrap();
//!
//! assert_eq!(config.filter.culture, "de-DE");
//! assert!(config.filter.ignore_parse_exceptions);
//! assert_eq!(config.sort.conditional_access, ConditionalAccess::Always);
//! ```

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use chrono::{Local, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::culture::Culture;
use crate::error::{ErrorCode, SiftError, SiftResult};
use crate::filter::FilterOperator;

/// Whether navigation chains null-check each hop before dereferencing the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalAccess {
    /// Never guard; null navigations fault during in-process evaluation.
    Never,
    /// Keep the predicate tree flat but guard in-process evaluation.
    #[default]
    WhenCompiled,
    /// Put guards into the predicate tree itself.
    Always,
}

impl ConditionalAccess {
    /// Whether member accesses in the built tree carry guards.
    pub fn guards_tree(self) -> bool {
        self == Self::Always
    }

    /// Whether in-process evaluation guards every access.
    pub fn guards_evaluation(self) -> bool {
        self != Self::Never
    }
}

/// How text operators compare strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringComparison {
    /// Compare code points exactly.
    Ordinal,
    /// Compare after Unicode lower-casing.
    #[default]
    IgnoreCase,
}

impl StringComparison {
    /// Whether comparisons ignore case.
    pub fn ignores_case(self) -> bool {
        self == Self::IgnoreCase
    }
}

/// Source of the current time for relative date literals.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> NaiveDateTime + Send + Sync>);

impl Clock {
    /// A clock backed by a closure.
    pub fn new(now: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        Self(Arc::new(now))
    }

    /// A clock frozen at one instant.
    pub fn fixed(instant: NaiveDateTime) -> Self {
        Self::new(move || instant)
    }

    /// The current time.
    pub fn now(&self) -> NaiveDateTime {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(|| Local::now().naive_local())
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Clock({})", self.now())
    }
}

/// Configuration of filter tokenizing and compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfiguration {
    /// Culture used to parse numbers and short dates.
    pub culture: String,
    /// Micro-syntax operator tokens.
    pub filter_operator_map: IndexMap<String, FilterOperator>,
    /// Words accepted as booleans besides `true`/`false` (case-insensitive).
    pub boolean_map: IndexMap<String, bool>,
    /// Value separators, in priority order.
    pub value_separator_chars: String,
    /// Escape character of the micro-syntax.
    pub escape_char: char,
    /// Comparison used by `Default`/`Contains`/`StartsWith`/`EndsWith` on strings.
    pub string_comparison: StringComparison,
    /// Null guarding of navigation chains.
    pub conditional_access: ConditionalAccess,
    /// Degrade unparsable values to "no predicate" instead of failing.
    pub ignore_parse_exceptions: bool,
    /// Clock for relative dates.
    #[serde(skip)]
    pub now: Clock,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            culture: "invariant".to_string(),
            filter_operator_map: default_operator_map(),
            boolean_map: default_boolean_map(),
            value_separator_chars: ",;|".to_string(),
            escape_char: '\\',
            string_comparison: StringComparison::default(),
            conditional_access: ConditionalAccess::default(),
            ignore_parse_exceptions: false,
            now: Clock::default(),
        }
    }
}

fn default_operator_map() -> IndexMap<String, FilterOperator> {
    [
        ("~", FilterOperator::Contains),
        ("^", FilterOperator::StartsWith),
        ("$", FilterOperator::EndsWith),
        ("=", FilterOperator::EqualCaseInsensitive),
        ("==", FilterOperator::EqualCaseSensitive),
        ("!", FilterOperator::NotEqual),
        ("<", FilterOperator::LessThan),
        ("<=", FilterOperator::LessThanOrEqual),
        (">", FilterOperator::GreaterThan),
        (">=", FilterOperator::GreaterThanOrEqual),
        ("ISNULL", FilterOperator::IsNull),
        ("NOTNULL", FilterOperator::NotNull),
    ]
    .into_iter()
    .map(|(token, op)| (token.to_string(), op))
    .collect()
}

fn default_boolean_map() -> IndexMap<String, bool> {
    [("NO", false), ("0", false), ("YES", true), ("1", true)]
        .into_iter()
        .map(|(word, value)| (word.to_string(), value))
        .collect()
}

static FILTER_DEFAULT: OnceLock<Arc<FilterConfiguration>> = OnceLock::new();
static FILTER_BUILTIN: OnceLock<Arc<FilterConfiguration>> = OnceLock::new();

impl FilterConfiguration {
    /// Publish the process-wide default. Succeeds only once per process.
    ///
    /// Call at startup, before compiling concurrently.
    pub fn set_default(configuration: FilterConfiguration) -> SiftResult<()> {
        configuration.validate()?;
        FILTER_DEFAULT
            .set(Arc::new(configuration))
            .map_err(|_| already_set("filter"))
    }

    /// The process-wide default, or the built-in defaults.
    pub fn current() -> Arc<FilterConfiguration> {
        FILTER_DEFAULT
            .get()
            .unwrap_or_else(|| FILTER_BUILTIN.get_or_init(Default::default))
            .clone()
    }

    /// The resolved culture.
    pub fn culture(&self) -> &'static Culture {
        Culture::resolve(&self.culture)
    }

    /// Fix the clock used for relative dates.
    pub fn with_now(mut self, instant: NaiveDateTime) -> Self {
        self.now = Clock::fixed(instant);
        self
    }

    /// Look up a boolean word, case-insensitively.
    pub fn boolean_word(&self, word: &str) -> Option<bool> {
        self.boolean_map
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(word))
            .map(|(_, value)| *value)
    }

    /// The operator token used when rendering `operator` back to micro-syntax.
    pub fn operator_token(&self, operator: FilterOperator) -> Option<&str> {
        self.filter_operator_map
            .iter()
            .find(|(_, op)| **op == operator)
            .map(|(token, _)| token.as_str())
    }

    /// Check the configuration for values the tokenizer cannot work with.
    pub fn validate(&self) -> SiftResult<()> {
        if self.value_separator_chars.is_empty() {
            return Err(SiftError::invalid_configuration(
                "value_separator_chars must contain at least one character",
            ));
        }
        if self.value_separator_chars.contains(self.escape_char) {
            return Err(SiftError::invalid_configuration(
                "escape_char must not be a value separator",
            ));
        }
        if self.filter_operator_map.keys().any(String::is_empty) {
            return Err(SiftError::invalid_configuration(
                "filter_operator_map must not contain an empty token",
            ));
        }
        Ok(())
    }
}

/// Configuration of sort parsing and compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortConfiguration {
    /// Markers before a property path that select ascending order.
    pub ascending_prefixes: Vec<String>,
    /// Markers after a property path that select ascending order.
    pub ascending_postfixes: Vec<String>,
    /// Markers before a property path that select descending order.
    pub descending_prefixes: Vec<String>,
    /// Markers after a property path that select descending order.
    pub descending_postfixes: Vec<String>,
    /// Fall back to case-insensitive property matching.
    pub ignore_property_name_case: bool,
    /// Null guarding of navigation chains used as sort keys.
    pub conditional_access: ConditionalAccess,
}

impl Default for SortConfiguration {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            ascending_prefixes: strings(&["asc-", "asc ", "+"]),
            ascending_postfixes: strings(&["-asc", " asc", "+"]),
            descending_prefixes: strings(&["desc-", "desc ", "dsc-", "dsc ", "-", "~"]),
            descending_postfixes: strings(&["-desc", " desc", "-dsc", " dsc", "-", "~"]),
            ignore_property_name_case: true,
            conditional_access: ConditionalAccess::default(),
        }
    }
}

static SORT_DEFAULT: OnceLock<Arc<SortConfiguration>> = OnceLock::new();
static SORT_BUILTIN: OnceLock<Arc<SortConfiguration>> = OnceLock::new();

impl SortConfiguration {
    /// Publish the process-wide default. Succeeds only once per process.
    pub fn set_default(configuration: SortConfiguration) -> SiftResult<()> {
        SORT_DEFAULT
            .set(Arc::new(configuration))
            .map_err(|_| already_set("sort"))
    }

    /// The process-wide default, or the built-in defaults.
    pub fn current() -> Arc<SortConfiguration> {
        SORT_DEFAULT
            .get()
            .unwrap_or_else(|| SORT_BUILTIN.get_or_init(Default::default))
            .clone()
    }
}

/// Configuration of page resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfiguration {
    /// Degrade missing or invalid page values to defaults instead of failing.
    pub ignore_parse_exceptions: bool,
}

static PAGE_DEFAULT: OnceLock<Arc<PageConfiguration>> = OnceLock::new();
static PAGE_BUILTIN: OnceLock<Arc<PageConfiguration>> = OnceLock::new();

impl PageConfiguration {
    /// Publish the process-wide default. Succeeds only once per process.
    pub fn set_default(configuration: PageConfiguration) -> SiftResult<()> {
        PAGE_DEFAULT
            .set(Arc::new(configuration))
            .map_err(|_| already_set("page"))
    }

    /// The process-wide default, or the built-in defaults.
    pub fn current() -> Arc<PageConfiguration> {
        PAGE_DEFAULT
            .get()
            .unwrap_or_else(|| PAGE_BUILTIN.get_or_init(Default::default))
            .clone()
    }
}

fn already_set(kind: &str) -> SiftError {
    SiftError::new(
        ErrorCode::DefaultAlreadySet,
        format!("The default {} configuration was already set", kind),
    )
    .with_help("Publish default configurations once at startup")
}

/// All configuration sections, as loaded from a `sift.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiftConfig {
    /// Filter section.
    pub filter: FilterConfiguration,
    /// Sort section.
    pub sort: SortConfiguration,
    /// Page section.
    pub page: PageConfiguration,
}

impl SiftConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SiftResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SiftError::invalid_configuration(format!("cannot read {}", path.display()))
                .with_source(e)
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string, expanding `${ENV_VAR}` references.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SiftResult<Self> {
        let expanded = expand_env_vars(content);

        let config: Self = toml::from_str(&expanded).map_err(|e| {
            SiftError::invalid_configuration(e.message().to_string()).with_source(e)
        })?;
        config.filter.validate()?;
        Ok(config)
    }

    /// Publish every section as the process-wide default.
    pub fn install(self) -> SiftResult<()> {
        FilterConfiguration::set_default(self.filter)?;
        SortConfiguration::set_default(self.sort)?;
        PageConfiguration::set_default(self.page)
    }
}

fn expand_env_vars(content: &str) -> String {
    static PATTERN: OnceLock<Option<regex_lite::Regex>> = OnceLock::new();
    let Some(re) = PATTERN
        .get_or_init(|| regex_lite::Regex::new(r"\$\{([^}]+)\}").ok())
        .as_ref()
    else {
        return content.to_string();
    };

    re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
