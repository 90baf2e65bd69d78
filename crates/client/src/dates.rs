//! Reading and showing timestamps in the configured timezone.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, Result};

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::Input(format!("unknown timezone: {name}")))
}

/// Which end of a day a bare date stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parses an RFC 3339 timestamp, or a `YYYY-MM-DD` day taken in `tz`.
///
/// A bare day is widened to its first or last instant so that inclusive
/// ranges cover the whole day.
pub fn parse_bound(raw: &str, tz: Tz, bound: Bound) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Input(format!("invalid date: {raw}")))?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
            .ok_or_else(|| AppError::Input("invalid end of day".to_string()))?,
    };

    let local = match tz.from_local_datetime(&day.and_time(time)) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(early, late) => match bound {
            Bound::Start => early,
            Bound::End => late,
        },
        LocalResult::None => {
            return Err(AppError::Input(format!(
                "{raw} does not exist in {tz}"
            )));
        }
    };
    Ok(local.with_timezone(&Utc))
}

pub fn parse_optional(raw: Option<&str>, tz: Tz, bound: Bound) -> Result<Option<DateTime<Utc>>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_bound(s, tz, bound))
        .transpose()
}

pub fn format(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}
