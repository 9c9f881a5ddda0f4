//! Cell parsing and formatting.
//!
//! Sheets are edited by hand, so parsing is lenient: thousands separators,
//! currency symbols, a handful of date layouts and 12-hour times are all
//! accepted. Formatting always writes one canonical layout.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p", "%I:%M:%S %p"];

/// Canonical timestamp layout written back to sheets.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹'];

/// Parse a money or quantity cell.
///
/// Handles currency symbols or a currency code (`EGP 1,234.56`), thousands
/// separators and parentheses for negatives. Anything else left in the cell,
/// such as an exponent or a unit, gives `None`.
#[must_use]
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = trim_currency(s);
    if s.is_empty() {
        return None;
    }

    // Check for parentheses indicating negative
    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, trim_currency(&s[1..s.len() - 1]))
    } else {
        (false, s)
    };

    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    let (sign_negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    let well_formed = digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !well_formed {
        return None;
    }

    let value = Decimal::from_str(digits).ok()?;
    if is_negative != sign_negative {
        Some(-value)
    } else {
        Some(value)
    }
}

fn trim_symbols(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || CURRENCY_SYMBOLS.contains(&c))
}

fn is_currency_code(run: &str) -> bool {
    (1..=3).contains(&run.len()) && run.chars().all(|c| c.is_ascii_uppercase())
}

/// Strip surrounding whitespace, currency symbols and a currency code of up
/// to three capital letters at either end.
fn trim_currency(s: &str) -> &str {
    let s = trim_symbols(s);
    let lead = s.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(s.len());
    let s = if is_currency_code(&s[..lead]) {
        trim_symbols(&s[lead..])
    } else {
        s
    };
    let tail = s
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_ascii_alphabetic())
        .map_or(0, |(i, c)| i + c.len_utf8());
    if is_currency_code(&s[tail..]) {
        trim_symbols(&s[..tail])
    } else {
        s
    }
}

/// Parse a date cell. A timestamp is cut down to its date.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

/// Parse a timestamp cell. A bare date means midnight.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a time-of-day cell (`17:30`, `17:30:00`, `5:30 PM`).
#[must_use]
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

/// Parse a yes/no cell. Blank is `false`; unrecognized text is `None`.
#[must_use]
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "" | "no" | "n" | "false" | "0" => Some(false),
        "yes" | "y" | "true" | "1" | "x" => Some(true),
        _ => None,
    }
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn format_datetime(at: NaiveDateTime) -> String {
    at.format(DATETIME_FORMAT).to_string()
}

/// Format a time as `HH:MM`.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Format a decimal without trailing zeros.
#[must_use]
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Format an optional cell.
#[must_use]
pub fn format_opt<T>(value: Option<T>, format: impl Fn(T) -> String) -> String {
    value.map(format).unwrap_or_default()
}

/// Format a yes/no cell.
#[must_use]
pub fn format_bool(value: bool) -> String {
    let text = if value { "Yes" } else { "No" };
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("100.00"), Some(dec!(100)));
        assert_eq!(parse_decimal("EGP 1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_decimal("$100.00"), Some(dec!(100)));
        assert_eq!(parse_decimal("-50"), Some(dec!(-50)));
        assert_eq!(parse_decimal("(50.00)"), Some(dec!(-50)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("N/A"), None);
        assert_eq!(parse_decimal("1,234.56 EGP"), Some(dec!(1234.56)));
        assert_eq!(parse_decimal("+7"), Some(dec!(7)));
        assert_eq!(parse_decimal("£ 2 500"), Some(dec!(2500)));
    }

    #[test]
    fn test_parse_decimal_rejects_stray_text() {
        assert_eq!(parse_decimal("1.5e3"), None);
        assert_eq!(parse_decimal("3 x 12"), None);
        assert_eq!(parse_decimal("1 1/2"), None);
        assert_eq!(parse_decimal("1.2.3"), None);
        assert_eq!(parse_decimal("12 cartons"), None);
        assert_eq!(parse_decimal("5-3"), None);
        assert_eq!(parse_decimal("EGP"), None);
        assert_eq!(parse_decimal("-"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("2024-03-09"), expected);
        assert_eq!(parse_date("09/03/2024"), expected);
        assert_eq!(parse_date("2024/03/09"), expected);
        assert_eq!(parse_date("2024-03-09 14:00:00"), expected);
        assert_eq!(parse_date("next week"), None);
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0);
        assert_eq!(parse_datetime("2024-03-09 14:05:00"), expected);
        assert_eq!(parse_datetime("2024-03-09 14:05"), expected);
        assert_eq!(parse_datetime("2024-03-09T14:05:00"), expected);
        assert_eq!(parse_datetime("09/03/2024 14:05"), expected);
        assert_eq!(
            parse_datetime("2024-03-09"),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_parse_time_formats() {
        let expected = NaiveTime::from_hms_opt(17, 30, 0);
        assert_eq!(parse_time("17:30"), expected);
        assert_eq!(parse_time("17:30:00"), expected);
        assert_eq!(parse_time("5:30 PM"), expected);
        assert_eq!(parse_time("25:00"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("x"), Some(true));
        assert_eq!(parse_bool(""), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_formatting() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        assert_eq!(format_datetime(at), "2024-03-09 07:05:00");
        assert_eq!(format_date(at.date()), "2024-03-09");
        assert_eq!(format_time(at.time()), "07:05");
        assert_eq!(format_decimal(dec!(12.500)), "12.5");
        assert_eq!(format_opt(None::<Decimal>, format_decimal), "");
        assert_eq!(format_bool(true), "Yes");
    }
}
