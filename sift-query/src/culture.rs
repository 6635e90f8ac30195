//! Culture-dependent number and date conversion.
//!
//! Only the conventions the micro-syntax actually needs are modelled: the
//! decimal and group separators of numbers and the field order of short dates.

use chrono::NaiveDate;
use tracing::warn;

/// Field order of a culture's short date format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `15.03.2020`, `15/03/2020`.
    DayMonthYear,
    /// `03/15/2020`.
    MonthDayYear,
    /// `2020/03/15`.
    YearMonthDay,
}

/// Number and date conventions of one culture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Culture {
    /// Culture name, e.g. `de-DE`.
    pub name: &'static str,
    /// Separator between integral and fractional digits.
    pub decimal_separator: char,
    /// Separator between digit groups.
    pub group_separator: char,
    /// Separator between the fields of a short date.
    pub date_separator: char,
    /// Field order of a short date.
    pub date_order: DateOrder,
}

const CULTURES: &[Culture] = &[
    Culture {
        name: "invariant",
        decimal_separator: '.',
        group_separator: ',',
        date_separator: '/',
        date_order: DateOrder::MonthDayYear,
    },
    Culture {
        name: "en-US",
        decimal_separator: '.',
        group_separator: ',',
        date_separator: '/',
        date_order: DateOrder::MonthDayYear,
    },
    Culture {
        name: "en-GB",
        decimal_separator: '.',
        group_separator: ',',
        date_separator: '/',
        date_order: DateOrder::DayMonthYear,
    },
    Culture {
        name: "de-DE",
        decimal_separator: ',',
        group_separator: '.',
        date_separator: '.',
        date_order: DateOrder::DayMonthYear,
    },
    Culture {
        name: "fr-FR",
        decimal_separator: ',',
        group_separator: '\u{202f}',
        date_separator: '/',
        date_order: DateOrder::DayMonthYear,
    },
    Culture {
        name: "ja-JP",
        decimal_separator: '.',
        group_separator: ',',
        date_separator: '/',
        date_order: DateOrder::YearMonthDay,
    },
];

impl Culture {
    /// The culture-neutral conventions.
    pub fn invariant() -> &'static Culture {
        &CULTURES[0]
    }

    /// Resolve a culture by name (case-insensitive).
    ///
    /// An empty name resolves to the invariant culture; unknown names fall
    /// back to it with a warning.
    pub fn resolve(name: &str) -> &'static Culture {
        if name.is_empty() {
            return Self::invariant();
        }
        match CULTURES.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
            Some(culture) => culture,
            None => {
                warn!(culture = %name, "Unknown culture, using invariant");
                Self::invariant()
            }
        }
    }

    fn normalize_number(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let mut normalized = String::with_capacity(raw.len());
        for c in raw.chars() {
            if c == self.group_separator || (c == ' ' && self.group_separator.is_whitespace()) {
                continue;
            }
            if c == self.decimal_separator {
                normalized.push('.');
            } else if c.is_ascii_digit() || matches!(c, '+' | '-' | 'e' | 'E') {
                normalized.push(c);
            } else {
                return None;
            }
        }
        Some(normalized)
    }

    /// Parse an integer written in this culture.
    pub fn parse_int(&self, raw: &str) -> Option<i64> {
        self.normalize_number(raw)?.parse().ok()
    }

    /// Parse a floating point number written in this culture.
    pub fn parse_float(&self, raw: &str) -> Option<f64> {
        let value: f64 = self.normalize_number(raw)?.parse().ok()?;
        value.is_finite().then_some(value)
    }

    /// Parse a short date written in this culture, e.g. `15.03.2020` for `de-DE`.
    pub fn parse_short_date(&self, raw: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = raw.trim().split(self.date_separator).collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
            return None;
        }

        let (year, month, day) = match self.date_order {
            DateOrder::DayMonthYear => (parts[2], parts[1], parts[0]),
            DateOrder::MonthDayYear => (parts[2], parts[0], parts[1]),
            DateOrder::YearMonthDay => (parts[0], parts[1], parts[2]),
        };

        let mut year: i32 = year.parse().ok()?;
        if year < 100 {
            year += 2000;
        }
        NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
    }
}
