//! Country Time Zone Resolution Module
//!
//! Maps an ISO 3166-1 alpha-2 country code to a representative IANA zone.

use chrono_tz::Tz;
use tracing::debug;

use crate::zone_table::COUNTRY_ZONES;

/// Country used when the caller does not name one
pub const DEFAULT_COUNTRY: &str = "IQ";

/// Zone returned for countries without tzdata entries
pub const FALLBACK_ZONE: &str = "UTC";

/// All zones tzdata lists for a country, in tzdata order.
///
/// The code is matched case-insensitively; unknown codes yield an empty slice.
pub fn country_timezones(code: &str) -> &'static [&'static str] {
    let code = code.to_ascii_uppercase();
    match COUNTRY_ZONES.binary_search_by(|(cc, _)| (*cc).cmp(code.as_str())) {
        Ok(idx) => COUNTRY_ZONES[idx].1,
        Err(_) => &[],
    }
}

/// Normalize an optional country code, falling back to [`DEFAULT_COUNTRY`].
pub fn normalize_country(code: Option<&str>) -> String {
    match code.map(str::trim) {
        Some(cc) if !cc.is_empty() => cc.to_ascii_uppercase(),
        _ => DEFAULT_COUNTRY.to_string(),
    }
}

/// Resolve a country code to a single IANA zone name.
///
/// Prefers the first zone outside `Etc/`, then the first listed zone, then
/// [`FALLBACK_ZONE`]. Never fails.
pub fn resolve_country_timezone(code: Option<&str>) -> &'static str {
    let cc = normalize_country(code);
    let zones = country_timezones(&cc);
    let Some(first) = zones.first() else {
        debug!(country = %cc, "no zones for country, using {}", FALLBACK_ZONE);
        return FALLBACK_ZONE;
    };
    zones.iter().copied().find(|z| !z.starts_with("Etc/")).unwrap_or(*first)
}

/// Resolve a country code to a parsed zone, UTC if the name is unknown to chrono-tz.
pub fn resolve_country_tz(code: Option<&str>) -> Tz {
    let name = resolve_country_timezone(code);
    name.parse().unwrap_or_else(|_| {
        debug!(zone = name, "zone not in compiled tz database, using UTC");
        Tz::UTC
    })
}

// ===================== TESTS =====================
