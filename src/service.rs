//! Query Service Module
//!
//! The two request shapes an embedding front end exposes: daily prayer
//! times for a location, and the UTC day span behind a local date range.
//! Both validate their input here so the calculator and mapper only ever see
//! well-formed values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::country::{normalize_country, resolve_country_tz};
use crate::error::{Error, Result};
use crate::geo::GeoLocation;
use crate::solar::{self, AngleParameters, MidnightConvention, SolarTimes};
use crate::span::{local_range_to_utc_span, month_bounds, utc_date_to_local_date};
use crate::time::{format_hm, parse_iso_date, today_at_offset, today_in};

// ===================== PRAYER TIMES =====================

/// Prayer-time request; unset fields fall back to the [`Config`] defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrayerTimesQuery {
    /// `YYYY-MM-DD`; today at the location's offset when absent
    pub date: Option<String>,
    pub fajr_angle: Option<f64>,
    pub maghrib_offset_min: Option<f64>,
    pub midnight_mode: Option<MidnightConvention>,
}

/// Event times as `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Times {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub sunset: String,
    pub maghrib: String,
    pub midnight: String,
}

impl From<&SolarTimes> for Times {
    fn from(t: &SolarTimes) -> Self {
        Self {
            fajr: format_hm(&t.dawn),
            sunrise: format_hm(&t.sunrise),
            dhuhr: format_hm(&t.solar_noon),
            sunset: format_hm(&t.sunset),
            maghrib: format_hm(&t.dusk),
            midnight: format_hm(&t.midnight),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimesParams {
    pub fajr_angle: f64,
    pub maghrib_offset_min: f64,
    pub midnight_mode: MidnightConvention,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerTimesResponse {
    pub date: NaiveDate,
    pub lat: f64,
    pub lng: f64,
    pub tz: f64,
    pub params: TimesParams,
    pub times: Times,
}

/// Compute the daily times for a location.
///
/// # Arguments
/// * `config` - Service defaults
/// * `location` - Observer location and fixed UTC offset
/// * `query` - Request overrides
/// * `now` - Current instant, used only when the query has no date
///
/// # Errors
/// [`Error::InvalidDate`] for a malformed date and [`Error::OutOfRange`] for
/// angle or offset overrides outside their ranges.
pub fn prayer_times(
    config: &Config,
    location: &GeoLocation,
    query: &PrayerTimesQuery,
    now: DateTime<Utc>,
) -> Result<PrayerTimesResponse> {
    let date = match query.date.as_deref() {
        Some(s) => parse_iso_date(s, "date")?,
        None => today_at_offset(now, location.offset()),
    };

    let defaults = config.angles;
    let params = AngleParameters::new(
        query.fajr_angle.unwrap_or(defaults.dawn_angle_deg),
        query.maghrib_offset_min.unwrap_or(defaults.dusk_offset_min),
        query.midnight_mode.unwrap_or(defaults.midnight),
    )?;

    let times = solar::compute(date, location, &params);

    Ok(PrayerTimesResponse {
        date,
        lat: location.lat(),
        lng: location.lon(),
        tz: location.utc_offset_hours(),
        params: TimesParams {
            fajr_angle: params.dawn_angle_deg,
            maghrib_offset_min: params.dusk_offset_min,
            midnight_mode: params.midnight,
        },
        times: Times::from(&times),
    })
}

// ===================== DAY SPAN =====================

/// Local date-range request; both bounds absent means the current month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySpanQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    /// ISO 3166-1 alpha-2 code
    pub country: Option<String>,
}

/// One UTC-dated day and the local date it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayItem {
    pub utc_date: NaiveDate,
    pub local_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySpanResponse {
    pub country: String,
    pub timezone: String,
    pub start_local: NaiveDate,
    pub end_local: NaiveDate,
    pub start_utc: NaiveDate,
    pub end_utc: NaiveDate,
    pub items: Vec<DayItem>,
}

/// Resolve a local date range in a country to the UTC dates that cover it.
///
/// When either bound is missing the whole current month in the country's
/// zone is used.
///
/// # Errors
/// [`Error::InvalidCountry`], [`Error::InvalidDate`] or
/// [`Error::StartAfterEnd`] for bad input.
pub fn day_span(
    config: &Config,
    query: &DaySpanQuery,
    now: DateTime<Utc>,
) -> Result<DaySpanResponse> {
    let requested = query.country.as_deref().filter(|cc| !cc.trim().is_empty());
    let country = normalize_country(requested.or(Some(config.default_country.as_str())));
    if country.len() != 2 || !country.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(Error::InvalidCountry(country));
    }
    let tz = resolve_country_tz(Some(country.as_str()));

    let (start, end) = match (query.start.as_deref(), query.end.as_deref()) {
        (Some(s), Some(e)) => (parse_iso_date(s, "start")?, parse_iso_date(e, "end")?),
        _ => month_bounds(today_in(now, tz)),
    };

    let span = local_range_to_utc_span(start, end, tz)?;
    let items = span
        .utc_dates()
        .map(|utc_date| DayItem { utc_date, local_date: utc_date_to_local_date(utc_date, tz) })
        .collect();

    Ok(DaySpanResponse {
        country,
        timezone: tz.name().to_string(),
        start_local: span.start_local,
        end_local: span.end_local,
        start_utc: span.start_utc_date,
        end_utc: span.end_utc_date,
        items,
    })
}

// ===================== TESTS =====================
