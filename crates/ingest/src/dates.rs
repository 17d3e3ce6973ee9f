//! Effective-date resolution.
//!
//! Priority: declared front-matter date, a date in the file name, filesystem
//! creation time, filesystem modification time, then "now".

use std::fs::Metadata;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::DateSource;

static DASHED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("valid regex"));
static COMPACT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(\d{4})(\d{2})(\d{2})(?:\D|$)").expect("valid regex"));

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a declared date: RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or
/// `YYYY/MM/DD`. Naive values are taken as UTC.
pub fn parse_declared_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return midnight(date);
        }
    }
    None
}

/// Finds a `YYYY-MM-DD` or `YYYYMMDD` calendar date inside a file name.
pub fn date_from_file_name(name: &str) -> Option<DateTime<Utc>> {
    let from_caps = |caps: regex::Captures<'_>| {
        let year = caps.get(1)?.as_str().parse().ok()?;
        let month = caps.get(2)?.as_str().parse().ok()?;
        let day = caps.get(3)?.as_str().parse().ok()?;
        midnight(NaiveDate::from_ymd_opt(year, month, day)?)
    };
    DASHED_DATE
        .captures_iter(name)
        .find_map(from_caps)
        .or_else(|| COMPACT_DATE.captures_iter(name).find_map(from_caps))
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Applies the priority chain. `fs_meta` is `None` for raw text.
pub(crate) fn resolve_effective_date(
    declared: Option<&str>,
    file_name: &str,
    fs_meta: Option<&Metadata>,
) -> (DateTime<Utc>, DateSource) {
    if let Some(raw) = declared {
        match parse_declared_date(raw) {
            Some(date) => return (date, DateSource::Declared),
            None => debug!(value = raw, file_name, "declared_date_unparseable"),
        }
    }
    if let Some(date) = date_from_file_name(file_name) {
        return (date, DateSource::Filename);
    }
    if let Some(meta) = fs_meta {
        if let Ok(created) = meta.created() {
            return (DateTime::<Utc>::from(created), DateSource::Created);
        }
        if let Ok(modified) = meta.modified() {
            return (DateTime::<Utc>::from(modified), DateSource::Modified);
        }
    }
    (Utc::now(), DateSource::Now)
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn declared_formats() {
        assert_eq!(parse_declared_date("2024-03-01"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_declared_date("2024/03/01"), Some(ymd(2024, 3, 1)));
        assert_eq!(
            parse_declared_date("2024-03-01 12:30:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(
            parse_declared_date("2024-03-01T12:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())
        );
        assert_eq!(parse_declared_date("March 1st"), None);
        assert_eq!(parse_declared_date("2024-13-40"), None);
    }

    #[test]
    fn file_name_dates() {
        assert_eq!(
            date_from_file_name("2024-05-06-smart-plugs.md"),
            Some(ymd(2024, 5, 6))
        );
        assert_eq!(date_from_file_name("post_20230102.md"), Some(ymd(2023, 1, 2)));
        assert_eq!(date_from_file_name("v2-99999999.md"), None);
        assert_eq!(date_from_file_name("smart-plugs.md"), None);
    }

    #[test]
    fn invalid_dashed_date_falls_through_to_compact() {
        let date = date_from_file_name("9999-99-99_20220315.md").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2022, 3, 15));
    }

    #[test]
    fn priority_chain_without_filesystem() {
        let (date, source) = resolve_effective_date(Some("2020-01-01"), "2021-01-01.md", None);
        assert_eq!((date, source), (ymd(2020, 1, 1), DateSource::Declared));

        let (date, source) = resolve_effective_date(Some("garbage"), "2021-01-01.md", None);
        assert_eq!((date, source), (ymd(2021, 1, 1), DateSource::Filename));

        let (_, source) = resolve_effective_date(None, "plain.md", None);
        assert_eq!(source, DateSource::Now);
    }

    #[test]
    fn filesystem_time_used_when_nothing_declared() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let meta = file.as_file().metadata().unwrap();
        let (_, source) = resolve_effective_date(None, "plain.md", Some(&meta));
        assert!(matches!(source, DateSource::Created | DateSource::Modified));
    }
}
