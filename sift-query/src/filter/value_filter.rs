//! Value filters and the filter micro-syntax tokenizer.
//!
//! ```text
//! value           := operator-prefix? literal
//! operator-prefix := "~" | "^" | "$" | "=" | "==" | "!" | ">" | ">=" | "<" | "<=" | "ISNULL" | "NOTNULL"
//! ```
//!
//! A raw string may hold several values separated by the first configured
//! separator that occurs in it. `\` escapes separators, operator characters
//! and itself.
//!
//! ```rust
//! use sift_query::config::FilterConfiguration;
//! use sift_query::filter::{FilterOperator, ValueFilter};
//!
//! let config = FilterConfiguration::default();
//! let filters = ValueFilter::from_syntax("!Joe,!Eve", &config);
//! assert_eq!(filters.len(), 2);
//! assert_eq!(filters[0].operator(), FilterOperator::NotEqual);
//! assert_eq!(filters[1].value(), Some("Eve"));
//! ```

use serde::{Deserialize, Serialize};

use super::FilterOperator;
use crate::config::FilterConfiguration;

/// One (operator, raw value) pair.
///
/// The value stays a string until it is converted to the property type
/// during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFilter {
    operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl ValueFilter {
    /// Create a value filter. Null checks discard the value.
    pub fn create(operator: FilterOperator, value: impl ToString) -> Self {
        let value = operator.requires_value().then(|| value.to_string());
        Self { operator, value }
    }

    /// Create a value filter using the type's default operator.
    pub fn default_operator(value: impl ToString) -> Self {
        Self::create(FilterOperator::Default, value)
    }

    /// Create a null check.
    pub fn is_null() -> Self {
        Self {
            operator: FilterOperator::IsNull,
            value: None,
        }
    }

    /// Create a not-null check.
    pub fn not_null() -> Self {
        Self {
            operator: FilterOperator::NotNull,
            value: None,
        }
    }

    /// The operator.
    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// The raw value, absent for null checks.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Tokenize a raw micro-syntax string into value filters.
    ///
    /// Never fails: an unrecognized prefix is part of the literal and the
    /// operator falls back to `Default`. The result is never empty.
    pub fn from_syntax(raw: &str, config: &FilterConfiguration) -> Vec<ValueFilter> {
        split_values(raw, config)
            .iter()
            .map(|segment| parse_value(segment, config))
            .collect()
    }

    /// Render back to micro-syntax, escaping where needed.
    pub fn to_syntax(&self, config: &FilterConfiguration) -> String {
        let token = match self.operator {
            FilterOperator::Default => "",
            op => config.operator_token(op).unwrap_or_default(),
        };

        let mut rendered = token.to_string();
        if let Some(value) = &self.value {
            // Word tokens are matched on the trimmed segment.
            let lead = value.chars().position(|c| !c.is_whitespace());
            let escape_lead = lead.and_then(|i| value.chars().nth(i)).is_some_and(|first| {
                config
                    .filter_operator_map
                    .keys()
                    .any(|t| t.chars().next().is_some_and(|c| c.eq_ignore_ascii_case(&first)))
            });
            for (i, c) in value.chars().enumerate() {
                if c == config.escape_char
                    || config.value_separator_chars.contains(c)
                    || (Some(i) == lead && escape_lead)
                {
                    rendered.push(config.escape_char);
                }
                rendered.push(c);
            }
        }
        rendered
    }

    /// Render several value filters as one micro-syntax string.
    pub fn join_syntax(filters: &[ValueFilter], config: &FilterConfiguration) -> String {
        let separator = config.value_separator_chars.chars().next().unwrap_or(',');
        filters
            .iter()
            .map(|f| f.to_syntax(config))
            .collect::<Vec<_>>()
            .join(&separator.to_string())
    }
}

/// Split on the first separator (in priority order) that occurs unescaped.
///
/// Segments keep their escapes so operator detection can see them.
fn split_values(raw: &str, config: &FilterConfiguration) -> Vec<String> {
    let escape = config.escape_char;
    let separator = config
        .value_separator_chars
        .chars()
        .find(|sep| unescaped_chars(raw, escape).any(|c| c == *sep));

    let Some(separator) = separator else {
        return vec![raw.to_string()];
    };

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == escape {
            current.push(c);
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if c == separator {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);
    segments
}

fn unescaped_chars(raw: &str, escape: char) -> impl Iterator<Item = char> + '_ {
    let mut escaped = false;
    raw.chars().filter(move |&c| {
        if escaped {
            escaped = false;
            return false;
        }
        if c == escape {
            escaped = true;
            return false;
        }
        true
    })
}

fn unescape(segment: &str, escape: char) -> String {
    let mut result = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == escape {
            result.push(chars.next().unwrap_or(escape));
        } else {
            result.push(c);
        }
    }
    result
}

/// Detect the operator prefix of one segment, longest token first.
///
/// Word tokens (`ISNULL`) must make up the whole segment; symbol tokens are
/// prefixes.
fn parse_value(segment: &str, config: &FilterConfiguration) -> ValueFilter {
    let mut tokens: Vec<(&String, &FilterOperator)> = config.filter_operator_map.iter().collect();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    for (token, operator) in tokens {
        let is_word = token.chars().all(char::is_alphabetic);
        let matched = if is_word {
            segment.trim().eq_ignore_ascii_case(token)
        } else {
            segment.starts_with(token.as_str())
        };

        if matched {
            let rest = if is_word { "" } else { &segment[token.len()..] };
            return ValueFilter::create(*operator, unescape(rest, config.escape_char));
        }
    }

    ValueFilter::create(FilterOperator::Default, unescape(segment, config.escape_char))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(raw: &str) -> Vec<ValueFilter> {
        ValueFilter::from_syntax(raw, &FilterConfiguration::default())
    }

    #[test]
    fn test_operator_prefixes() {
        let cases = [
            ("Joe", FilterOperator::Default, Some("Joe")),
            ("~Joe", FilterOperator::Contains, Some("Joe")),
            ("^Jo", FilterOperator::StartsWith, Some("Jo")),
            ("$oe", FilterOperator::EndsWith, Some("oe")),
            ("=joe", FilterOperator::EqualCaseInsensitive, Some("joe")),
            ("==Joe", FilterOperator::EqualCaseSensitive, Some("Joe")),
            ("!Joe", FilterOperator::NotEqual, Some("Joe")),
            ("<5", FilterOperator::LessThan, Some("5")),
            ("<=5", FilterOperator::LessThanOrEqual, Some("5")),
            (">5", FilterOperator::GreaterThan, Some("5")),
            (">=5", FilterOperator::GreaterThanOrEqual, Some("5")),
            ("ISNULL", FilterOperator::IsNull, None),
            ("notnull", FilterOperator::NotNull, None),
        ];

        for (raw, operator, value) in cases {
            let filters = parse(raw);
            assert_eq!(filters.len(), 1, "{}", raw);
            assert_eq!(filters[0].operator(), operator, "{}", raw);
            assert_eq!(filters[0].value(), value, "{}", raw);
        }
    }

    #[test]
    fn test_word_tokens_need_whole_segment() {
        let filters = parse("ISNULLABLE");
        assert_eq!(filters[0].operator(), FilterOperator::Default);
        assert_eq!(filters[0].value(), Some("ISNULLABLE"));
    }

    #[test]
    fn test_first_separator_in_priority_order_wins() {
        let filters = parse("a;b,c");
        assert_eq!(
            filters,
            vec![
                ValueFilter::default_operator("a;b"),
                ValueFilter::default_operator("c"),
            ]
        );

        let filters = parse("a;b|c");
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1].value(), Some("b|c"));
    }

    #[test]
    fn test_escapes() {
        let filters = parse(r"a\,b,\~c,\\");
        assert_eq!(
            filters,
            vec![
                ValueFilter::default_operator("a,b"),
                ValueFilter::default_operator("~c"),
                ValueFilter::default_operator("\\"),
            ]
        );
    }

    #[test]
    fn test_escaped_separator_does_not_select_separator() {
        let filters = parse(r"a\,b;c");
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].value(), Some("a,b"));
    }

    #[test]
    fn test_empty_input_yields_one_filter() {
        assert_eq!(parse(""), vec![ValueFilter::default_operator("")]);
    }

    #[test]
    fn test_syntax_round_trip() {
        let config = FilterConfiguration::default();
        let filters = vec![
            ValueFilter::create(FilterOperator::Contains, "a,b"),
            ValueFilter::default_operator("~literal"),
            ValueFilter::create(FilterOperator::EqualCaseInsensitive, "=x"),
            ValueFilter::is_null(),
            ValueFilter::create(FilterOperator::GreaterThanOrEqual, "10"),
        ];

        let syntax = ValueFilter::join_syntax(&filters, &config);
        assert_eq!(ValueFilter::from_syntax(&syntax, &config), filters);
    }

    #[test]
    fn test_padded_word_token_round_trips_as_literal() {
        let config = FilterConfiguration::default();
        let filters = vec![
            ValueFilter::default_operator(" ISNULL"),
            ValueFilter::default_operator("  notnull "),
            ValueFilter::create(FilterOperator::NotEqual, " <5"),
        ];

        let syntax = ValueFilter::join_syntax(&filters, &config);
        assert_eq!(syntax, r" \ISNULL,  \notnull ,! \<5");
        assert_eq!(ValueFilter::from_syntax(&syntax, &config), filters);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&ValueFilter::create(FilterOperator::Contains, "jo")).unwrap();
        assert_eq!(json, r#"{"operator":"Contains","value":"jo"}"#);

        let json = serde_json::to_string(&ValueFilter::is_null()).unwrap();
        assert_eq!(json, r#"{"operator":"IsNull"}"#);
    }
}
