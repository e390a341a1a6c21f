//! Travel-date expression parsing: classify free-text date expressions by
//! calendar precision and normalize day-precise ones to ISO-8601.
//!
//! A booking flow only accepts expressions that name an exact calendar day.
//! Everything else ("mar 23" without a year, "march 2021", "next week") is a
//! coarser granularity that the dialog must resolve with the user.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// A parsed date expression, tagged by calendar granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateExpr {
    /// Names one exact calendar day.
    Definite(NaiveDate),
    /// Month and day without a year (recurs every year).
    MonthDay { month: u32, day: u32 },
    /// Month within a year, no day.
    YearMonth { year: i32, month: u32 },
    /// A bare year.
    Year(i32),
    /// Relative granularity marker ("today", "next week", a weekday name).
    Relative(String),
}

impl DateExpr {
    /// True when the expression resolves to one exact calendar day.
    pub fn is_definite(&self) -> bool {
        matches!(self, Self::Definite(_))
    }

    /// ISO-8601 rendering for day-precise expressions.
    pub fn to_iso(&self) -> Option<String> {
        match self {
            Self::Definite(date) => Some(format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                date.month(),
                date.day()
            )),
            _ => None,
        }
    }
}

/// Parse failure: the text is not a recognizable date expression, or it
/// names a day that does not exist on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimexError {
    #[error("unrecognized date expression: {0:?}")]
    Unrecognized(String),
    #[error("no such calendar day: {year:04}-{month:02}-{day:02}")]
    InvalidDay { year: i32, month: u32, day: u32 },
}

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| regex(r"^(\d{4})-(\d{1,2})-(\d{1,2})$"));
static ISO_YEAR_MONTH: LazyLock<Regex> = LazyLock::new(|| regex(r"^(\d{4})-(\d{1,2})$"));
static BARE_YEAR: LazyLock<Regex> = LazyLock::new(|| regex(r"^(\d{4})$"));
static SLASH_DATE: LazyLock<Regex> = LazyLock::new(|| regex(r"^(\d{1,2})/(\d{1,2})/(\d{4})$"));
static SLASH_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| regex(r"^(\d{1,2})/(\d{1,2})$"));
static MONTH_FIRST: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^(?i)([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:\s*,?\s+(\d{4}))?$"));
static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    regex(r"^(?i)(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?([a-z]+)\.?(?:\s*,?\s+(\d{4}))?$")
});
static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| regex(r"^(?i)([a-z]+)\.?\s+(\d{4})$"));
static RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"^(?i)(today|tomorrow|yesterday|tonight|(?:next|this|last)\s+(?:week|month|year|weekend|monday|tuesday|wednesday|thursday|friday|saturday|sunday)|monday|tuesday|wednesday|thursday|friday|saturday|sunday)$",
    )
});

fn regex(pattern: &str) -> Regex {
    // Patterns are compile-time constants; a failure here is a bug.
    #[allow(clippy::unwrap_used)]
    Regex::new(pattern).unwrap()
}

/// Parse a free-text date expression into its calendar granularity.
pub fn parse(text: &str) -> Result<DateExpr, TimexError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TimexError::Unrecognized(text.to_string()));
    }

    if let Some(caps) = ISO_DATE.captures(text) {
        return definite(num(&caps, 1), unum(&caps, 2), unum(&caps, 3));
    }
    if let Some(caps) = SLASH_DATE.captures(text) {
        return definite(num(&caps, 3), unum(&caps, 1), unum(&caps, 2));
    }
    if let Some(caps) = ISO_YEAR_MONTH.captures(text) {
        let (year, month) = (num(&caps, 1), unum(&caps, 2));
        if (1..=12).contains(&month) {
            return Ok(DateExpr::YearMonth { year, month });
        }
        return Err(TimexError::Unrecognized(text.to_string()));
    }
    if let Some(caps) = BARE_YEAR.captures(text) {
        return Ok(DateExpr::Year(num(&caps, 1)));
    }
    if let Some(caps) = SLASH_MONTH_DAY.captures(text) {
        let (month, day) = (unum(&caps, 1), unum(&caps, 2));
        if (1..=12).contains(&month) && (1..=31).contains(&day) {
            return Ok(DateExpr::MonthDay { month, day });
        }
        return Err(TimexError::Unrecognized(text.to_string()));
    }
    if RELATIVE.is_match(text) {
        return Ok(DateExpr::Relative(text.to_ascii_lowercase()));
    }
    if let Some(caps) = MONTH_FIRST.captures(text)
        && let Some(month) = month_number(&caps[1])
    {
        let day = unum(&caps, 2);
        return match caps.get(3) {
            Some(year) => definite(parse_year(year.as_str()), month, day),
            None if (1..=31).contains(&day) => Ok(DateExpr::MonthDay { month, day }),
            None => Err(TimexError::Unrecognized(text.to_string())),
        };
    }
    if let Some(caps) = DAY_FIRST.captures(text)
        && let Some(month) = month_number(&caps[2])
    {
        let day = unum(&caps, 1);
        return match caps.get(3) {
            Some(year) => definite(parse_year(year.as_str()), month, day),
            None if (1..=31).contains(&day) => Ok(DateExpr::MonthDay { month, day }),
            None => Err(TimexError::Unrecognized(text.to_string())),
        };
    }
    if let Some(caps) = MONTH_YEAR.captures(text)
        && let Some(month) = month_number(&caps[1])
    {
        return Ok(DateExpr::YearMonth {
            year: parse_year(&caps[2]),
            month,
        });
    }

    Err(TimexError::Unrecognized(text.to_string()))
}

/// Parse and normalize in one step: `Some(iso)` only for day-precise input.
pub fn definite_date(text: &str) -> Option<String> {
    parse(text).ok().and_then(|expr| expr.to_iso())
}

fn definite(year: i32, month: u32, day: u32) -> Result<DateExpr, TimexError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(DateExpr::Definite)
        .ok_or(TimexError::InvalidDay { year, month, day })
}

fn num(caps: &regex::Captures<'_>, index: usize) -> i32 {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default()
}

fn unum(caps: &regex::Captures<'_>, index: usize) -> u32 {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default()
}

fn parse_year(text: &str) -> i32 {
    text.parse().unwrap_or_default()
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_ascii_lowercase();
    let months = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    months.iter().position(|month| {
        // Three-letter abbreviations and longer prefixes both resolve
        // ("mar", "sept"), but "ma" must not match two months.
        name.len() >= 3 && month.starts_with(&name)
    }).map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(text: &str) -> Option<String> {
        definite_date(text)
    }

    #[test]
    fn iso_dates_are_definite() {
        assert_eq!(iso("2021-03-23"), Some("2021-03-23".to_string()));
        assert_eq!(iso(" 2021-3-2 "), Some("2021-03-02".to_string()));
    }

    #[test]
    fn named_month_forms_with_year_are_definite() {
        assert_eq!(iso("mar 23 2021"), Some("2021-03-23".to_string()));
        assert_eq!(iso("March 23, 2021"), Some("2021-03-23".to_string()));
        assert_eq!(iso("apr 15 2021"), Some("2021-04-15".to_string()));
        assert_eq!(iso("23 mar 2021"), Some("2021-03-23".to_string()));
        assert_eq!(iso("3rd of June 2022"), Some("2022-06-03".to_string()));
    }

    #[test]
    fn slash_dates_are_definite() {
        assert_eq!(iso("3/23/2021"), Some("2021-03-23".to_string()));
        assert_eq!(iso("12/1/2024"), Some("2024-12-01".to_string()));
    }

    #[test]
    fn month_day_without_year_is_ambiguous() {
        assert_eq!(parse("mar 23"), Ok(DateExpr::MonthDay { month: 3, day: 23 }));
        assert_eq!(parse("3/23"), Ok(DateExpr::MonthDay { month: 3, day: 23 }));
        assert!(iso("mar 23").is_none());
    }

    #[test]
    fn coarser_granularities_are_ambiguous() {
        assert_eq!(
            parse("march 2021"),
            Ok(DateExpr::YearMonth {
                year: 2021,
                month: 3
            })
        );
        assert_eq!(
            parse("2021-03"),
            Ok(DateExpr::YearMonth {
                year: 2021,
                month: 3
            })
        );
        assert_eq!(parse("2021"), Ok(DateExpr::Year(2021)));
    }

    #[test]
    fn relative_markers_are_ambiguous() {
        for text in ["today", "Tomorrow", "next week", "this month", "friday"] {
            let expr = parse(text).unwrap();
            assert!(matches!(expr, DateExpr::Relative(_)), "{text}: {expr:?}");
            assert!(!expr.is_definite());
        }
    }

    #[test]
    fn nonsense_is_unrecognized() {
        assert!(matches!(parse("soonish"), Err(TimexError::Unrecognized(_))));
        assert!(matches!(parse(""), Err(TimexError::Unrecognized(_))));
        assert!(matches!(parse("$500"), Err(TimexError::Unrecognized(_))));
    }

    #[test]
    fn impossible_days_are_rejected() {
        assert_eq!(
            parse("feb 30 2021"),
            Err(TimexError::InvalidDay {
                year: 2021,
                month: 2,
                day: 30
            })
        );
    }

    #[test]
    fn short_month_prefixes_do_not_misresolve() {
        // "ma" is ambiguous between march/may and must not parse.
        assert!(parse("ma 23 2021").is_err());
    }
}
