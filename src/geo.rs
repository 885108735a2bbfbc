//! Geographic Location Module
//!
//! Observer location for the solar event calculator: latitude, east-positive
//! longitude and a fixed UTC offset in fractional hours.

use chrono::FixedOffset;

use crate::error::{Error, Result};

// ===================== CONSTANTS =====================

/// Zenith angle for sunrise/sunset in degrees.
///
/// 90° plus 34' of standard refraction plus the 16' apparent solar radius.
pub const SUNRISE_ZENITH_DEG: f64 = 90.833;

/// Widest UTC offset found in tzdata (Line Islands, UTC+14)
pub const MAX_UTC_OFFSET_HOURS: f64 = 14.0;

// ===================== LOCATION =====================

/// Observer location with its fixed UTC offset.
///
/// Construction validates every field, so the calculator can treat a
/// `GeoLocation` as always well-formed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    lat: f64,
    lon: f64,
    utc_offset_hours: f64,
    offset: FixedOffset,
}

impl GeoLocation {
    /// Create a location.
    ///
    /// # Arguments
    /// * `lat` - Latitude in degrees (-90 to 90)
    /// * `lon` - Longitude in degrees, east positive (-180 to 180)
    /// * `utc_offset_hours` - Offset from UTC in hours, e.g. 3.5 for UTC+03:30
    ///
    /// # Errors
    /// Returns [`Error::OutOfRange`] for coordinates outside their ranges and
    /// [`Error::UnrepresentableOffset`] when the offset cannot be a fixed zone.
    pub fn new(lat: f64, lon: f64, utc_offset_hours: f64) -> Result<Self> {
        check_range("latitude", lat, -90.0, 90.0)?;
        check_range("longitude", lon, -180.0, 180.0)?;
        let offset = fixed_offset_from_hours(utc_offset_hours)
            .ok_or(Error::UnrepresentableOffset(utc_offset_hours))?;
        Ok(Self { lat, lon, utc_offset_hours, offset })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn utc_offset_hours(&self) -> f64 {
        self.utc_offset_hours
    }

    /// The fixed zone all computed wall-clock times are expressed in.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

// ===================== HELPERS =====================

/// Build a fixed offset from fractional hours.
///
/// The whole-hour part is truncated toward zero and the remainder is rounded
/// to whole minutes, so -3.5 becomes -03:30 and 5.75 becomes +05:45.
pub fn fixed_offset_from_hours(hours: f64) -> Option<FixedOffset> {
    if !hours.is_finite() || hours.abs() > MAX_UTC_OFFSET_HOURS {
        return None;
    }
    let whole = hours.trunc();
    let minutes = ((hours - whole) * 60.0).round();
    let seconds = (whole * 3600.0 + minutes * 60.0) as i32;
    FixedOffset::east_opt(seconds)
}

pub(crate) fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(Error::OutOfRange { name, min, max, value });
    }
    Ok(())
}

// ===================== TESTS =====================
