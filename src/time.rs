//! Time and Timezone Utilities Module
//!
//! Provides date parsing, timezone resolution, and formatting utilities.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_english::{Dialect, parse_date_string};
use chrono_tz::Tz;
use iana_time_zone::get_timezone;
use std::sync::OnceLock;
use tzf_rs::DefaultFinder;

use crate::error::{Error, Result};

// tzf-rs DefaultFinder is pre-compiled and very fast
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

// ===================== DATE PARSING =====================

/// Parse a strict `YYYY-MM-DD` date.
///
/// # Arguments
/// * `value` - Date string
/// * `field` - Field name reported in the error
///
/// # Errors
/// Returns [`Error::InvalidDate`] for anything that is not a real calendar date
pub fn parse_iso_date(value: &str, field: &'static str) -> Result<NaiveDate> {
    let invalid = || Error::InvalidDate { field, value: value.to_string() };
    // Exactly YYYY-MM-DD with a four-digit year from 0001; chrono's %Y also takes
    // signed and extended years that overflow later date arithmetic
    let b = value.as_bytes();
    let shape_ok = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter().enumerate().all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shape_ok || value.starts_with("0000") {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

/// Parse a date given as `YYYY-MM-DD` or as an English expression.
///
/// Relative expressions such as "today" or "next friday" are resolved
/// against `anchor`, so "today" means today in the anchor's zone.
pub fn parse_date_expr<T>(
    value: &str,
    anchor: DateTime<T>,
    field: &'static str,
) -> Result<NaiveDate>
where
    T: TimeZone,
    T::Offset: Copy,
{
    if let Ok(date) = parse_iso_date(value.trim(), field) {
        return Ok(date);
    }
    parse_date_string(value, anchor, Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|_| Error::InvalidDate { field, value: value.to_string() })
}

// ===================== TIMEZONE UTILITIES =====================

/// Get the system's configured timezone.
///
/// Falls back to UTC if the system timezone cannot be determined.
pub fn system_timezone() -> Tz {
    get_timezone().ok().and_then(|s| s.parse().ok()).unwrap_or(Tz::UTC)
}

/// Resolve timezone from geographic coordinates.
///
/// # Arguments
/// * `lon` - Longitude in degrees
/// * `lat` - Latitude in degrees
///
/// # Returns
/// The resolved timezone, or UTC if resolution fails
pub fn resolve_timezone(lon: f64, lat: f64) -> Tz {
    let finder = TZF_FINDER.get_or_init(DefaultFinder::new);

    // Get the IANA string (e.g., "Asia/Baghdad")
    let tzid = finder.get_tz_name(lon, lat);

    // Parse into chrono_tz::Tz to get historical correctness
    tzid.parse::<Tz>().unwrap_or(Tz::UTC)
}

/// Parse an IANA zone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse().map_err(|_| Error::InvalidTimezone(name.to_string()))
}

/// UTC offset of `tz` in fractional hours, as observed at local noon of `date`.
///
/// Noon sits clear of the midnight-adjacent DST transitions most zones use,
/// so the returned value is the offset in force for the daylight hours.
pub fn utc_offset_hours(tz: Tz, date: NaiveDate) -> f64 {
    let noon = date.and_time(NaiveTime::MIN) + TimeDelta::hours(12);
    let offset = tz.offset_from_local_datetime(&noon).earliest().map_or_else(
        || tz.offset_from_utc_datetime(&noon).fix(),
        |o| o.fix(),
    );
    f64::from(offset.local_minus_utc()) / 3600.0
}

/// Calendar date "today" for an observer at a fixed offset.
pub fn today_at_offset(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Calendar date "today" in a zone.
pub fn today_in(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

// ===================== FORMATTING =====================

/// Format a wall-clock time as 24-hour "HH:MM"; seconds are truncated.
pub fn format_hm<T: TimeZone>(dt: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    dt.format("%H:%M").to_string()
}

// ===================== TESTS =====================
