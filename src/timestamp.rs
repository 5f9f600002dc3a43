//! Timestamp normalization for transcript headers.
//!
//! Headers carry locale-formatted `D/M/Y` dates and `H:M[:S]` times. They are
//! shown verbatim; this module only turns them into a comparable instant so
//! chats can be ranked by the recency of their last message.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::trace;

/// Instant assigned to dates that cannot be interpreted. Sorts as oldest.
pub const UNPARSEABLE: i64 = 0;

/// Convert a header date and time into milliseconds since the Unix epoch.
///
/// Returns [`UNPARSEABLE`] when the date does not split into three numeric
/// parts or the components do not form a valid calendar instant. Missing
/// minutes or seconds default to zero; two-digit years are read as 20YY.
#[must_use]
pub fn normalize(date: &str, time: &str) -> i64 {
    to_datetime(date, time).map_or_else(
        || {
            trace!(date, time, "Unparseable timestamp");
            UNPARSEABLE
        },
        |dt| dt.and_utc().timestamp_millis(),
    )
}

/// Parse a header date and time into a calendar value.
#[must_use]
pub fn to_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let parts: Vec<&str> = date.trim().split('/').collect();
    if parts.len() < 3 {
        return None;
    }

    let day: u32 = parts[0].trim().parse().ok()?;
    // Headers count months from 1, which is what chrono expects as well
    let month: u32 = parts[1].trim().parse().ok()?;
    let year = expand_year(parts[2].trim())?;

    let mut clock = time.trim().split(':');
    let hour: u32 = clock.next()?.trim().parse().ok()?;
    let minute: u32 = parse_or_zero(clock.next())?;
    let second: u32 = parse_or_zero(clock.next())?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Expand a two-digit year into the 2000s; longer years pass through.
fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    if raw.len() <= 2 {
        Some(2000 + year)
    } else {
        Some(year)
    }
}

fn parse_or_zero(part: Option<&str>) -> Option<u32> {
    match part {
        Some(p) => p.trim().parse().ok(),
        None => Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1/2/23", "09:00", "2023-02-01T09:00:00")]
    #[case("01/02/2023", "09:00:30", "2023-02-01T09:00:30")]
    #[case("31/12/99", "23:59", "2099-12-31T23:59:00")]
    #[case("5/6/2024", "7:05", "2024-06-05T07:05:00")]
    fn test_to_datetime(#[case] date: &str, #[case] time: &str, #[case] expected: &str) {
        let parsed = to_datetime(date, time).unwrap();
        assert_eq!(parsed.format("%Y-%m-%dT%H:%M:%S").to_string(), expected);
    }

    #[rstest]
    #[case("", "09:00")]
    #[case("1/2", "09:00")]
    #[case("32/1/23", "09:00")]
    #[case("1/13/23", "09:00")]
    #[case("a/b/c", "09:00")]
    #[case("1/2/23", "")]
    fn test_unparseable_is_sentinel(#[case] date: &str, #[case] time: &str) {
        assert_eq!(normalize(date, time), UNPARSEABLE);
    }

    #[test]
    fn test_ordering_follows_calendar() {
        let earlier = normalize("1/2/23", "09:00");
        let later = normalize("1/2/23", "09:01");
        let next_year = normalize("1/1/2024", "00:00");
        assert!(earlier < later);
        assert!(later < next_year);
        assert!(UNPARSEABLE < earlier);
    }

    #[test]
    fn test_two_digit_year_sorts_with_four_digit() {
        assert_eq!(normalize("5/6/24", "10:00"), normalize("5/6/2024", "10:00"));
        assert!(normalize("31/12/1999", "23:59") < normalize("1/1/99", "00:00"));
    }

    #[test]
    fn test_missing_seconds_default_to_zero() {
        assert_eq!(normalize("1/2/23", "09:00"), normalize("1/2/23", "09:00:00"));
    }
}
