//! Date literals resolved to half-open `[start, end)` spans.
//!
//! Absolute literals cover their own granularity (`2020` is the whole year,
//! `2020-03-15T10` the whole hour). Relative literals are phrases such as
//! `yesterday`, `3-days-ago` or `forty-years-ago`, resolved against a clock.

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike,
};

use crate::culture::Culture;

/// A half-open range of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTimeSpan {
    /// First instant inside the span.
    pub start: NaiveDateTime,
    /// First instant after the span.
    pub end: NaiveDateTime,
}

impl DateTimeSpan {
    /// Create a span; `end` must not precede `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whether an instant falls inside the span.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Resolve a literal, trying absolute forms before relative phrases.
    pub fn parse(raw: &str, culture: &Culture, now: NaiveDateTime) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        parse_absolute(raw, culture).or_else(|| parse_relative(raw, now))
    }
}

/// Calendar unit used for granularity and arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    /// One second.
    Second,
    /// One minute.
    Minute,
    /// One hour.
    Hour,
    /// One day.
    Day,
    /// Seven days starting on Monday.
    Week,
    /// One calendar month.
    Month,
    /// One calendar year.
    Year,
}

impl TimeUnit {
    fn parse(word: &str) -> Option<Self> {
        let word = word.strip_suffix('s').unwrap_or(word);
        match word {
            "second" | "sec" => Some(Self::Second),
            "minute" | "min" => Some(Self::Minute),
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Move `instant` by `amount` units (negative moves backwards).
    pub fn shift(self, instant: NaiveDateTime, amount: i64) -> Option<NaiveDateTime> {
        let duration = match self {
            Self::Second => Duration::try_seconds(amount),
            Self::Minute => Duration::try_minutes(amount),
            Self::Hour => Duration::try_hours(amount),
            Self::Day => Duration::try_days(amount),
            Self::Week => Duration::try_weeks(amount),
            Self::Month => return shift_months(instant, amount),
            Self::Year => return shift_months(instant, amount.checked_mul(12)?),
        };
        instant.checked_add_signed(duration?)
    }

    /// Start of the calendar unit containing `instant`.
    pub fn truncate(self, instant: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = instant.date();
        let truncated = match self {
            Self::Second => instant.with_nanosecond(0)?,
            Self::Minute => instant.with_nanosecond(0)?.with_second(0)?,
            Self::Hour => date.and_hms_opt(instant.hour(), 0, 0)?,
            Self::Day => date.and_hms_opt(0, 0, 0)?,
            Self::Week => {
                let offset = date.weekday().num_days_from_monday() as i64;
                date.checked_sub_signed(Duration::days(offset))?.and_hms_opt(0, 0, 0)?
            }
            Self::Month => date.with_day(1)?.and_hms_opt(0, 0, 0)?,
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_hms_opt(0, 0, 0)?,
        };
        Some(truncated)
    }

    fn span_from(self, start: NaiveDateTime) -> Option<DateTimeSpan> {
        Some(DateTimeSpan::new(start, self.shift(start, 1)?))
    }
}

fn shift_months(instant: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        instant.checked_add_months(magnitude)
    } else {
        instant.checked_sub_months(magnitude)
    }
}

fn parse_absolute(raw: &str, culture: &Culture) -> Option<DateTimeSpan> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return TimeUnit::Second.span_from(instant.naive_utc());
    }

    let (date_part, time_part) = match raw.find(['T', ' ']) {
        Some(idx) => (&raw[..idx], Some(raw[idx + 1..].trim())),
        None => (raw, None),
    };

    let (date, granularity) = parse_date_part(date_part, culture)?;
    match time_part {
        None | Some("") => granularity.span_from(date.and_hms_opt(0, 0, 0)?),
        Some(time) if granularity == TimeUnit::Day => {
            let (time, unit) = parse_time_part(time)?;
            unit.span_from(date.and_time(time))
        }
        Some(_) => None,
    }
}

fn parse_date_part(raw: &str, culture: &Culture) -> Option<(NaiveDate, TimeUnit)> {
    let parts: Vec<&str> = raw.split('-').collect();

    match parts.as_slice() {
        [year] if year.len() == 4 && all_digits(year) => {
            Some((NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1)?, TimeUnit::Year))
        }
        [year, month] if year.len() == 4 && all_digits(year) && all_digits(month) => Some((
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)?,
            TimeUnit::Month,
        )),
        [year, month, day] if year.len() == 4 && all_digits(year) => Some((
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?,
            TimeUnit::Day,
        )),
        _ => culture.parse_short_date(raw).map(|d| (d, TimeUnit::Day)),
    }
}

fn parse_time_part(raw: &str) -> Option<(NaiveTime, TimeUnit)> {
    let parts: Vec<&str> = raw.split(':').collect();
    let number = |s: &str| -> Option<u32> { if all_digits(s) { s.parse().ok() } else { None } };

    match parts.as_slice() {
        [hour] => Some((NaiveTime::from_hms_opt(number(*hour)?, 0, 0)?, TimeUnit::Hour)),
        [hour, minute] => Some((
            NaiveTime::from_hms_opt(number(*hour)?, number(*minute)?, 0)?,
            TimeUnit::Minute,
        )),
        [_, _, _] => Some((NaiveTime::parse_from_str(raw, "%H:%M:%S%.f").ok()?, TimeUnit::Second)),
        _ => None,
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_relative(raw: &str, now: NaiveDateTime) -> Option<DateTimeSpan> {
    let lowered = raw.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect();

    match words.as_slice() {
        ["now"] => TimeUnit::Second.span_from(TimeUnit::Second.truncate(now)?),
        ["today"] => calendar_span(now, TimeUnit::Day, 0),
        ["yesterday"] => calendar_span(now, TimeUnit::Day, -1),
        ["tomorrow"] => calendar_span(now, TimeUnit::Day, 1),
        ["this", unit] => calendar_span(now, TimeUnit::parse(unit)?, 0),
        ["last", unit] => calendar_span(now, TimeUnit::parse(unit)?, -1),
        ["next", unit] => calendar_span(now, TimeUnit::parse(unit)?, 1),
        ["in", rest @ ..] => offset_span(now, rest, 1),
        [rest @ .., "ago"] => offset_span(now, rest, -1),
        [rest @ .., "from", "now"] => offset_span(now, rest, 1),
        _ => None,
    }
}

fn calendar_span(now: NaiveDateTime, unit: TimeUnit, offset: i64) -> Option<DateTimeSpan> {
    let start = unit.shift(unit.truncate(now)?, offset)?;
    unit.span_from(start)
}

fn offset_span(now: NaiveDateTime, words: &[&str], direction: i64) -> Option<DateTimeSpan> {
    let (unit, amount) = words.split_last()?;
    let unit = TimeUnit::parse(unit)?;
    let amount = parse_amount(amount)?;
    let instant = unit.shift(now, amount.checked_mul(direction)?)?;
    TimeUnit::Second.span_from(instant)
}

/// Parse an amount written in digits or English number words (`forty two`).
fn parse_amount(words: &[&str]) -> Option<i64> {
    match words {
        [] => None,
        [single] if all_digits(single) => single.parse().ok(),
        _ => {
            let mut total: i64 = 0;
            let mut current: i64 = 0;
            for word in words {
                match *word {
                    "and" => {}
                    "hundred" => current = current.max(1).checked_mul(100)?,
                    "thousand" => {
                        total = total.checked_add(current.max(1).checked_mul(1000)?)?;
                        current = 0;
                    }
                    other => current = current.checked_add(number_word(other)?)?,
                }
            }
            total.checked_add(current)
        }
    }
}

fn number_word(word: &str) -> Option<i64> {
    let value = match word {
        "a" | "an" | "one" => 1,
        "zero" => 0,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        digits if all_digits(digits) => return digits.parse().ok(),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2020, 3, 15, 10, 30, 45)
    }

    fn parse(raw: &str) -> Option<DateTimeSpan> {
        DateTimeSpan::parse(raw, Culture::invariant(), now())
    }

    #[test]
    fn test_absolute_granularity() {
        let year = parse("2019").unwrap();
        assert_eq!(year, DateTimeSpan::new(at(2019, 1, 1, 0, 0, 0), at(2020, 1, 1, 0, 0, 0)));

        let month = parse("2020-02").unwrap();
        assert_eq!(month.end, at(2020, 3, 1, 0, 0, 0));

        let day = parse("2020-02-29").unwrap();
        assert_eq!(day, DateTimeSpan::new(at(2020, 2, 29, 0, 0, 0), at(2020, 3, 1, 0, 0, 0)));

        let hour = parse("2020-02-29T10").unwrap();
        assert_eq!(hour.end, at(2020, 2, 29, 11, 0, 0));

        let minute = parse("2020-02-29 10:15").unwrap();
        assert_eq!(minute.end, at(2020, 2, 29, 10, 16, 0));

        let second = parse("2020-02-29T10:15:30").unwrap();
        assert_eq!(second.end, at(2020, 2, 29, 10, 15, 31));
    }

    #[test]
    fn test_culture_short_date() {
        let span = DateTimeSpan::parse("15.03.2020 08:00", Culture::resolve("de-DE"), now()).unwrap();
        assert_eq!(span, DateTimeSpan::new(at(2020, 3, 15, 8, 0, 0), at(2020, 3, 15, 8, 1, 0)));
    }

    #[test]
    fn test_calendar_words() {
        assert_eq!(
            parse("yesterday").unwrap(),
            DateTimeSpan::new(at(2020, 3, 14, 0, 0, 0), at(2020, 3, 15, 0, 0, 0))
        );
        assert_eq!(parse("this-month").unwrap().start, at(2020, 3, 1, 0, 0, 0));
        assert_eq!(parse("last year").unwrap().start, at(2019, 1, 1, 0, 0, 0));
        // 2020-03-15 is a Sunday
        assert_eq!(parse("next_week").unwrap().start, at(2020, 3, 16, 0, 0, 0));
    }

    #[test]
    fn test_offsets() {
        let span = parse("forty-years-ago").unwrap();
        assert_eq!(span.start, at(1980, 3, 15, 10, 30, 45));
        assert_eq!(span.end, at(1980, 3, 15, 10, 30, 46));

        assert_eq!(parse("3 days ago").unwrap().start, at(2020, 3, 12, 10, 30, 45));
        assert_eq!(parse("in-two-hours").unwrap().start, at(2020, 3, 15, 12, 30, 45));
        assert_eq!(parse("a-week-from-now").unwrap().start, at(2020, 3, 22, 10, 30, 45));
        assert_eq!(
            parse("one-hundred-and-twenty-days-ago").unwrap().start.date(),
            NaiveDate::from_ymd_opt(2019, 11, 16).unwrap()
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse("").is_none());
        assert!(parse("soon").is_none());
        assert!(parse("2020-13-01").is_none());
        assert!(parse("many-days-ago").is_none());
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        assert!(parse("9223372036854775807-thousand-days-ago").is_none());
        assert!(parse("9223372036854775807-hundred-years-ago").is_none());
        assert!(parse("9223372036854775807 9223372036854775807 days ago").is_none());
        assert!(parse("9223372036854775807 days ago").is_none());
        assert!(parse("in 4294967296 months").is_none());
    }
}
