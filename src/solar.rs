//! Solar Event Calculation Module
//!
//! Closed-form daily solar events for a date and location: dawn at a
//! twilight depression angle, sunrise, solar noon, sunset, dusk as a fixed
//! offset after sunset, and the night midpoint.
//!
//! Solar geometry uses the truncated Fourier series for the equation of time
//! and declination (Spencer, 1971) over a fixed 365-day fractional year.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::geo::{GeoLocation, SUNRISE_ZENITH_DEG, check_range};

// ===================== CONSTANTS =====================

pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Default twilight depression angle for dawn in degrees
pub const DEFAULT_DAWN_ANGLE_DEG: f64 = 17.7;
pub const MIN_DAWN_ANGLE_DEG: f64 = 8.0;
pub const MAX_DAWN_ANGLE_DEG: f64 = 30.0;

/// Default dusk offset after sunset in minutes
pub const DEFAULT_DUSK_OFFSET_MIN: f64 = 4.0;
pub const MIN_DUSK_OFFSET_MIN: f64 = 0.0;
pub const MAX_DUSK_OFFSET_MIN: f64 = 20.0;

// ===================== PARAMETERS =====================

/// Which pair of events the night midpoint bisects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MidnightConvention {
    /// Midpoint of dusk and the following dawn
    #[default]
    #[serde(rename = "maghrib_to_fajr")]
    DuskToDawn,
    /// Midpoint of sunset and the following sunrise
    #[serde(rename = "sunset_to_sunrise")]
    SunsetToSunrise,
}

impl MidnightConvention {
    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuskToDawn => "maghrib_to_fajr",
            Self::SunsetToSunrise => "sunset_to_sunrise",
        }
    }
}

impl fmt::Display for MidnightConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MidnightConvention {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "dusk_to_dawn" | "maghrib_to_fajr" => Ok(Self::DuskToDawn),
            "sunset_to_sunrise" => Ok(Self::SunsetToSunrise),
            _ => Err(format!(
                "Unknown midnight convention '{}' (use dusk-to-dawn or sunset-to-sunrise)",
                s
            )),
        }
    }
}

/// Angle and offset configuration for one calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleParameters {
    /// Sun depression below the horizon at dawn, degrees (8 - 30)
    pub dawn_angle_deg: f64,
    /// Minutes from sunset to dusk (0 - 20)
    pub dusk_offset_min: f64,
    pub midnight: MidnightConvention,
}

impl Default for AngleParameters {
    fn default() -> Self {
        Self {
            dawn_angle_deg: DEFAULT_DAWN_ANGLE_DEG,
            dusk_offset_min: DEFAULT_DUSK_OFFSET_MIN,
            midnight: MidnightConvention::DuskToDawn,
        }
    }
}

impl AngleParameters {
    /// Build validated parameters.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfRange`] naming the offending parameter.
    pub fn new(
        dawn_angle_deg: f64,
        dusk_offset_min: f64,
        midnight: MidnightConvention,
    ) -> Result<Self> {
        let params = Self { dawn_angle_deg, dusk_offset_min, midnight };
        params.validate()?;
        Ok(params)
    }

    pub fn with_dawn_angle(mut self, deg: f64) -> Self {
        self.dawn_angle_deg = deg;
        self
    }

    pub fn with_dusk_offset(mut self, minutes: f64) -> Self {
        self.dusk_offset_min = minutes;
        self
    }

    pub fn with_midnight(mut self, midnight: MidnightConvention) -> Self {
        self.midnight = midnight;
        self
    }

    /// Check both numeric parameters against their documented ranges.
    pub fn validate(&self) -> Result<()> {
        check_range("fajr_angle", self.dawn_angle_deg, MIN_DAWN_ANGLE_DEG, MAX_DAWN_ANGLE_DEG)?;
        check_range(
            "maghrib_offset_min",
            self.dusk_offset_min,
            MIN_DUSK_OFFSET_MIN,
            MAX_DUSK_OFFSET_MIN,
        )
    }

    fn clamped(&self) -> Self {
        Self {
            dawn_angle_deg: self.dawn_angle_deg.clamp(MIN_DAWN_ANGLE_DEG, MAX_DAWN_ANGLE_DEG),
            dusk_offset_min: self.dusk_offset_min.clamp(MIN_DUSK_OFFSET_MIN, MAX_DUSK_OFFSET_MIN),
            midnight: self.midnight,
        }
    }
}

// ===================== RESULTS =====================

/// Event times in minutes from local midnight of the calculation date.
///
/// Values are not wrapped: a negative value belongs to the previous day and
/// a value of 1440 or more to the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventMinutes {
    pub dawn: f64,
    pub sunrise: f64,
    pub noon: f64,
    pub sunset: f64,
    pub dusk: f64,
}

/// The six daily events as wall-clock times in the location's fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarTimes {
    pub dawn: DateTime<FixedOffset>,
    pub sunrise: DateTime<FixedOffset>,
    pub solar_noon: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
    pub dusk: DateTime<FixedOffset>,
    pub midnight: DateTime<FixedOffset>,
}

/// Morning events are before solar noon, evening events after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayHalf {
    Morning,
    Evening,
}

impl DayHalf {
    fn sign(self) -> f64 {
        match self {
            Self::Morning => -1.0,
            Self::Evening => 1.0,
        }
    }
}

// ===================== SOLAR DAY CONTEXT =====================

/// Solar geometry of one date at one location.
///
/// Holds the intermediates shared by every event of the day so each event is
/// a single hour-angle evaluation.
#[derive(Debug, Clone, Copy)]
pub struct SolarDay {
    date: NaiveDate,
    lat_rad: f64,
    /// Solar declination in radians
    declination: f64,
    /// Solar noon in minutes from local midnight
    noon: f64,
    offset: FixedOffset,
}

impl SolarDay {
    pub fn new(date: NaiveDate, location: &GeoLocation) -> Self {
        let (eot, declination) = equation_of_time_and_declination(day_of_year(date));
        Self {
            date,
            lat_rad: location.lat().to_radians(),
            declination,
            noon: solar_noon_minutes(location.lon(), location.utc_offset_hours(), eot),
            offset: location.offset(),
        }
    }

    pub fn declination(&self) -> f64 {
        self.declination
    }

    pub fn noon_minutes(&self) -> f64 {
        self.noon
    }

    /// Minutes from local midnight at which the sun reaches `zenith_deg`.
    pub fn event_minutes(&self, zenith_deg: f64, half: DayHalf) -> f64 {
        event_minutes_by_zenith(self.lat_rad, self.declination, self.noon, zenith_deg, half)
    }

    /// Wall-clock time of a minute offset from this day's local midnight.
    pub fn to_local(&self, minutes: f64) -> DateTime<FixedOffset> {
        to_local_datetime(self.date, minutes, self.offset)
    }
}

// ===================== CALCULATION =====================

/// Raw event minutes for a date and location.
///
/// Dawn and dusk parameters are clamped into their valid ranges.
pub fn compute_minutes(
    date: NaiveDate,
    location: &GeoLocation,
    params: &AngleParameters,
) -> EventMinutes {
    compute_minutes_for(&SolarDay::new(date, location), params)
}

/// Raw event minutes for an already prepared [`SolarDay`].
pub fn compute_minutes_for(day: &SolarDay, params: &AngleParameters) -> EventMinutes {
    let params = params.clamped();

    let sunrise = day.event_minutes(SUNRISE_ZENITH_DEG, DayHalf::Morning);
    let sunset = day.event_minutes(SUNRISE_ZENITH_DEG, DayHalf::Evening);
    let dawn = day.event_minutes(90.0 + params.dawn_angle_deg, DayHalf::Morning);

    EventMinutes { dawn, sunrise, noon: day.noon, sunset, dusk: sunset + params.dusk_offset_min }
}

/// Compute the six daily events for a date and location.
///
/// Never fails for a valid [`GeoLocation`]; polar inputs saturate to the
/// nearest achievable event instead of erroring.
pub fn compute(date: NaiveDate, location: &GeoLocation, params: &AngleParameters) -> SolarTimes {
    let day = SolarDay::new(date, location);
    let minutes = compute_minutes_for(&day, params);

    let (first, second) = match params.midnight {
        MidnightConvention::DuskToDawn => (minutes.dusk, minutes.dawn),
        MidnightConvention::SunsetToSunrise => (minutes.sunset, minutes.sunrise),
    };
    let start = day.to_local(first);
    let mut end = day.to_local(second);
    if end <= start {
        end += TimeDelta::days(1);
    }
    let midnight = start + (end - start) / 2;

    SolarTimes {
        dawn: day.to_local(minutes.dawn),
        sunrise: day.to_local(minutes.sunrise),
        solar_noon: day.to_local(minutes.noon),
        sunset: day.to_local(minutes.sunset),
        dusk: day.to_local(minutes.dusk),
        midnight,
    }
}

// ===================== FORMULAS =====================

/// 1-based day of the year (1 - 366).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Equation of time (minutes) and solar declination (radians) for day `n`.
pub fn equation_of_time_and_declination(n: u32) -> (f64, f64) {
    let gamma = 2.0 * PI / 365.0 * (f64::from(n) - 1.0);

    let eot = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());

    let decl = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    (eot, decl)
}

/// Solar noon in minutes from local midnight.
///
/// # Arguments
/// * `lon_east_deg` - Longitude in degrees, east positive
/// * `utc_offset_hours` - Local offset from UTC in hours
/// * `eot_min` - Equation of time in minutes
pub fn solar_noon_minutes(lon_east_deg: f64, utc_offset_hours: f64, eot_min: f64) -> f64 {
    let time_offset = eot_min + 4.0 * lon_east_deg - 60.0 * utc_offset_hours;
    720.0 - time_offset
}

/// Minutes from local midnight at which the sun is at `zenith_deg`.
///
/// The hour-angle cosine is clamped to [-1, 1]: where the sun never reaches
/// the zenith angle the result saturates to noon (never reached from below)
/// or to noon ± 12h (never drops that low).
pub fn event_minutes_by_zenith(
    lat_rad: f64,
    decl: f64,
    solar_noon_min: f64,
    zenith_deg: f64,
    half: DayHalf,
) -> f64 {
    let zenith = zenith_deg.to_radians();
    let cos_omega =
        (zenith.cos() - lat_rad.sin() * decl.sin()) / (lat_rad.cos() * decl.cos());
    if cos_omega.abs() > 1.0 {
        debug!(cos_omega, zenith_deg, "hour angle out of domain, saturating");
    }
    let omega_deg = cos_omega.clamp(-1.0, 1.0).acos().to_degrees();
    solar_noon_min + half.sign() * 4.0 * omega_deg
}

/// Convert a minute offset from midnight of `date` to a wall-clock time.
///
/// Minutes outside [0, 1440) move the date by whole days. The remainder is
/// split into hour and rounded minute (half-to-even); a minute that rounds to
/// 60 carries into the next hour, and from 23:59.5 on into the next day.
pub fn to_local_datetime(
    date: NaiveDate,
    minutes: f64,
    offset: FixedOffset,
) -> DateTime<FixedOffset> {
    debug_assert!(minutes.is_finite(), "event minutes must be finite, got {minutes}");

    let day_shift = (minutes / MINUTES_PER_DAY).floor();
    let m = minutes - day_shift * MINUTES_PER_DAY;
    let hh = (m / 60.0).floor() as i64;
    let mm = (m % 60.0).round_ties_even() as i64;

    let local = date.and_time(NaiveTime::MIN)
        + TimeDelta::days(day_shift as i64)
        + TimeDelta::minutes(hh * 60 + mm);
    let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(t: &DateTime<FixedOffset>) -> String {
        t.format("%H:%M").to_string()
    }

    fn baghdad() -> GeoLocation {
        GeoLocation::new(33.3152, 44.3661, 3.0).unwrap()
    }

    #[test]
    fn test_baghdad_summer_solstice_reference() {
        let times = compute(ymd(2025, 6, 21), &baghdad(), &AngleParameters::default());

        assert_eq!(hm(&times.dawn), "03:12");
        assert_eq!(hm(&times.sunrise), "04:53");
        assert_eq!(hm(&times.solar_noon), "12:04");
        assert_eq!(hm(&times.sunset), "19:15");
        assert_eq!(hm(&times.dusk), "19:19");
        assert_eq!(hm(&times.midnight), "23:15");
        assert_eq!(times.midnight.date_naive(), ymd(2025, 6, 21));
        assert_eq!(times.midnight.second(), 30);
    }

    #[test]
    fn test_tehran_half_hour_offset() {
        let tehran = GeoLocation::new(35.6892, 51.3890, 3.5).unwrap();
        let times = compute(ymd(2025, 1, 15), &tehran, &AngleParameters::default());

        assert_eq!(hm(&times.dawn), "05:45");
        assert_eq!(hm(&times.sunrise), "07:13");
        assert_eq!(hm(&times.solar_noon), "12:13");
        assert_eq!(hm(&times.sunset), "17:13");
        assert_eq!(hm(&times.dusk), "17:17");
        assert_eq!(hm(&times.midnight), "23:31");
        assert_eq!(times.sunrise.offset().local_minus_utc(), 12600);
    }

    #[test]
    fn test_custom_angle_and_zero_offset() {
        let params = AngleParameters::default().with_dawn_angle(18.0).with_dusk_offset(0.0);
        let times = compute(ymd(2025, 6, 21), &baghdad(), &params);

        assert_eq!(hm(&times.dawn), "03:10");
        assert_eq!(times.dusk, times.sunset);
        assert_eq!(hm(&times.midnight), "23:12");
    }

    #[test]
    fn test_sunset_to_sunrise_midnight_crosses_date() {
        let params =
            AngleParameters::default().with_midnight(MidnightConvention::SunsetToSunrise);
        let times = compute(ymd(2025, 6, 21), &baghdad(), &params);

        assert_eq!(hm(&times.midnight), "00:04");
        assert_eq!(times.midnight.date_naive(), ymd(2025, 6, 22));
    }

    #[test]
    fn test_equinox_noon_at_greenwich() {
        let origin = GeoLocation::new(0.0, 0.0, 0.0).unwrap();
        let minutes = compute_minutes(ymd(2025, 3, 20), &origin, &AngleParameters::default());

        // Equation of time is about -7 to -8 minutes in late March, so noon runs late
        assert!(
            minutes.noon > 725.0 && minutes.noon < 731.0,
            "Equinox solar noon out of range: {} min",
            minutes.noon
        );

        let times = compute(ymd(2025, 3, 20), &origin, &AngleParameters::default());
        assert_eq!(hm(&times.solar_noon), "12:08");
    }

    #[test]
    fn test_event_ordering_across_year_and_latitudes() {
        let params = AngleParameters::default();
        for lat in [-60.0, -45.0, -20.0, 0.0, 15.0, 33.3, 51.5, 60.0] {
            for lon in [-150.0, -75.0, 0.0, 44.4, 139.7] {
                let offset = (lon / 15.0_f64).round();
                let loc = GeoLocation::new(lat, lon, offset).unwrap();
                for month in 1..=12 {
                    let m = compute_minutes(ymd(2025, month, 15), &loc, &params);
                    assert!(
                        m.dawn < m.sunrise
                            && m.sunrise <= m.noon
                            && m.noon <= m.sunset
                            && m.sunset <= m.dusk,
                        "Ordering violated at lat={} lon={} month={}: {:?}",
                        lat,
                        lon,
                        month,
                        m
                    );
                }
            }
        }
    }

    #[test]
    fn test_midnight_bisects_dusk_and_next_dawn() {
        let loc = GeoLocation::new(21.4225, 39.8262, 3.0).unwrap();
        for month in 1..=12 {
            let times = compute(ymd(2025, month, 1), &loc, &AngleParameters::default());
            let next_dawn = times.dawn + TimeDelta::days(1);

            let before = (times.midnight - times.dusk).num_seconds();
            let after = (next_dawn - times.midnight).num_seconds();
            assert!(
                (before - after).abs() <= 60,
                "Midnight not centered in month {}: {}s vs {}s",
                month,
                before,
                after
            );
        }
    }

    #[test]
    fn test_polar_day_saturates() {
        let svalbard = GeoLocation::new(80.0, 0.0, 0.0).unwrap();
        let m = compute_minutes(ymd(2025, 6, 21), &svalbard, &AngleParameters::default());

        // Sun never sets: hour angle saturates to 180 degrees
        assert!((m.sunset - m.sunrise - MINUTES_PER_DAY).abs() < 1e-9);
        assert_eq!(m.dawn, m.sunrise);

        let times = compute(ymd(2025, 6, 21), &svalbard, &AngleParameters::default());
        assert_eq!(hm(&times.sunrise), "00:01");
        assert_eq!(times.sunset.date_naive(), ymd(2025, 6, 22));
        assert_eq!(hm(&times.sunset), "00:01");
    }

    #[test]
    fn test_polar_night_saturates() {
        let svalbard = GeoLocation::new(80.0, 0.0, 0.0).unwrap();
        let m = compute_minutes(ymd(2025, 12, 21), &svalbard, &AngleParameters::default());

        // Sun never rises: hour angle collapses to zero at noon
        assert_eq!(m.sunrise, m.noon);
        assert_eq!(m.sunset, m.noon);
        assert!(m.dawn < m.sunrise, "Dawn twilight still reachable at 80N in December");

        let times = compute(ymd(2025, 12, 21), &svalbard, &AngleParameters::default());
        assert_eq!(hm(&times.dawn), "08:11");
        assert_eq!(hm(&times.sunrise), "11:58");
    }

    #[test]
    fn test_poles_do_not_panic() {
        for lat in [-90.0, -89.9, 89.9, 90.0] {
            let loc = GeoLocation::new(lat, 0.0, 0.0).unwrap();
            for month in 1..=12 {
                let m = compute_minutes(ymd(2024, month, 1), &loc, &AngleParameters::default());
                assert!(m.sunrise.is_finite() && m.sunset.is_finite() && m.dawn.is_finite());
                let _ = compute(ymd(2024, month, 1), &loc, &AngleParameters::default());
            }
        }
    }

    #[test]
    fn test_out_of_range_parameters_are_clamped() {
        let wild = AngleParameters::default().with_dawn_angle(45.0).with_dusk_offset(-5.0);
        let clamped = AngleParameters::default().with_dawn_angle(30.0).with_dusk_offset(0.0);
        let date = ymd(2025, 3, 1);

        assert_eq!(compute(date, &baghdad(), &wild), compute(date, &baghdad(), &clamped));
    }

    #[test]
    fn test_parameter_validation() {
        assert!(AngleParameters::new(17.7, 4.0, MidnightConvention::DuskToDawn).is_ok());
        assert!(AngleParameters::new(8.0, 20.0, MidnightConvention::SunsetToSunrise).is_ok());
        assert!(AngleParameters::new(7.9, 4.0, MidnightConvention::DuskToDawn).is_err());
        assert!(AngleParameters::new(17.7, 20.1, MidnightConvention::DuskToDawn).is_err());
    }

    #[test]
    fn test_midnight_convention_parsing() {
        let parse = |s: &str| s.parse::<MidnightConvention>();
        assert_eq!(parse("dusk-to-dawn"), Ok(MidnightConvention::DuskToDawn));
        assert_eq!(parse("maghrib_to_fajr"), Ok(MidnightConvention::DuskToDawn));
        assert_eq!(parse("Sunset-To-Sunrise"), Ok(MidnightConvention::SunsetToSunrise));
        assert!("noon-to-noon".parse::<MidnightConvention>().is_err());
        assert_eq!(MidnightConvention::SunsetToSunrise.to_string(), "sunset_to_sunrise");
    }

    #[test]
    fn test_to_local_datetime_wraps_days() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let date = ymd(2025, 1, 1);

        let before = to_local_datetime(date, -30.0, utc);
        assert_eq!(before.date_naive(), ymd(2024, 12, 31));
        assert_eq!(hm(&before), "23:30");

        let after = to_local_datetime(date, 1470.0, utc);
        assert_eq!(after.date_naive(), ymd(2025, 1, 2));
        assert_eq!(hm(&after), "00:30");

        let two_back = to_local_datetime(date, -1500.0, utc);
        assert_eq!(two_back.date_naive(), ymd(2024, 12, 30));
        assert_eq!(hm(&two_back), "23:00");
    }

    #[test]
    fn test_to_local_datetime_minute_carry() {
        let plus3 = FixedOffset::east_opt(3 * 3600).unwrap();
        let date = ymd(2025, 6, 1);

        assert_eq!(hm(&to_local_datetime(date, 59.6, plus3)), "01:00");
        assert_eq!(hm(&to_local_datetime(date, 125.4, plus3)), "02:05");

        let carry = to_local_datetime(date, 1439.7, plus3);
        assert_eq!(carry.date_naive(), ymd(2025, 6, 2));
        assert_eq!(hm(&carry), "00:00");
        assert_eq!(carry.offset().local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_mismatched_offset_lands_on_previous_day() {
        // Far-east longitude with a far-west offset pushes noon before midnight
        let loc = GeoLocation::new(10.0, 170.0, -10.0).unwrap();
        let times = compute(ymd(2025, 4, 10), &loc, &AngleParameters::default());

        assert_eq!(times.solar_noon.date_naive(), ymd(2025, 4, 9));
        assert!(times.dawn < times.sunrise && times.sunrise < times.solar_noon);
    }

    #[test]
    fn test_prepared_day_gives_same_minutes() {
        let date = ymd(2025, 6, 21);
        let params = AngleParameters::default().with_dawn_angle(18.0);
        let day = SolarDay::new(date, &baghdad());

        assert_eq!(compute_minutes_for(&day, &params), compute_minutes(date, &baghdad(), &params));
        assert_eq!(compute_minutes_for(&day, &params).noon, day.noon_minutes());
    }

    #[test]
    fn test_declination_extremes() {
        let (_, june) = equation_of_time_and_declination(172);
        let (_, december) = equation_of_time_and_declination(355);
        assert!((june.to_degrees() - 23.45).abs() < 0.1);
        assert!((december.to_degrees() + 23.42).abs() < 0.1);
    }
}
