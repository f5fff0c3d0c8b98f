//! ISO date plumbing shared by the domain modules. Transaction dates are
//! `YYYY-MM-DD`; budget and report months are `YYYY-MM`.

use lazy_static::lazy_static;
use regex::Regex;
use time::{format_description::FormatItem, macros::format_description, Date};

pub const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s, ISO_DATE).ok()
}

pub fn format_date(date: Date) -> String {
    // The format description has no fallible components
    date.format(ISO_DATE).expect("format ISO date")
}

/// `YYYY-MM` month key of a date.
pub fn month_of(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

pub fn is_valid_month(s: &str) -> bool {
    lazy_static! {
        static ref MONTH_RE: Regex = Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").unwrap();
    }
    MONTH_RE.is_match(s)
}

/// The month immediately before a `YYYY-MM` key.
pub fn previous_month(month: &str) -> Option<String> {
    let (year, m) = month.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let m: u8 = m.parse().ok()?;
    Some(if m == 1 {
        format!("{:04}-12", year - 1)
    } else {
        format!("{year:04}-{:02}", m - 1)
    })
}

/// The month immediately after a `YYYY-MM` key.
pub fn next_month(month: &str) -> Option<String> {
    let (year, m) = month.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let m: u8 = m.parse().ok()?;
    Some(if m == 12 {
        format!("{:04}-01", year + 1)
    } else {
        format!("{year:04}-{:02}", m + 1)
    })
}

/// The `n` month keys ending with (and including) `end`'s month, ascending.
pub fn trailing_months(end: Date, n: usize) -> Vec<String> {
    let mut months = Vec::with_capacity(n);
    let mut current = month_of(end);
    for _ in 0..n {
        months.push(current.clone());
        match previous_month(&current) {
            Some(prev) => current = prev,
            None => break,
        }
    }
    months.reverse();
    months
}

/// Serde adapter for `Date` as an ISO `YYYY-MM-DD` string.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let s = String::deserialize(d)?;
        Date::parse(&s, super::ISO_DATE).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parse_and_format_roundtrip() {
        let d = parse_date("2026-08-05").unwrap();
        assert_eq!(d, date!(2026 - 08 - 05));
        assert_eq!(format_date(d), "2026-08-05");
        assert!(parse_date("08/05/2026").is_none());
    }

    #[test]
    fn month_helpers() {
        assert_eq!(month_of(date!(2026 - 01 - 31)), "2026-01");
        assert!(is_valid_month("2026-08"));
        assert!(!is_valid_month("2026-13"));
        assert!(!is_valid_month("2026-8"));
        assert_eq!(previous_month("2026-01").as_deref(), Some("2025-12"));
        assert_eq!(previous_month("2026-08").as_deref(), Some("2026-07"));
        assert_eq!(next_month("2026-12").as_deref(), Some("2027-01"));
    }

    #[test]
    fn trailing_months_span_year_boundaries() {
        let months = trailing_months(date!(2026 - 02 - 10), 4);
        assert_eq!(months, vec!["2025-11", "2025-12", "2026-01", "2026-02"]);
    }
}
