//! Output Formatting Module
//!
//! Provides text and JSON rendering for the query responses.

use serde::Serialize;

use miqat::geo::fixed_offset_from_hours;
use miqat::service::{DaySpanResponse, PrayerTimesResponse};

// ===================== JSON OUTPUT =====================

/// Print any response as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// JSON body for the zone listing.
#[derive(Debug, Serialize)]
pub struct ZoneListing<'a> {
    pub country: &'a str,
    pub timezone: &'a str,
    pub candidates: &'a [&'static str],
}

// ===================== TERMINAL OUTPUT =====================

/// Render daily prayer times as aligned text.
///
/// # Arguments
/// * `res` - Prayer-time response to render
pub fn render_prayer_times(res: &PrayerTimesResponse) -> String {
    let offset = fixed_offset_from_hours(res.tz)
        .map_or_else(|| format!("{:+}h", res.tz), |o| o.to_string());
    let t = &res.times;
    let p = &res.params;

    let mut out = String::new();
    out.push_str(&format!("Date        : {} (UTC{})\n", res.date, offset));
    out.push_str(&format!("Location    : {:.4}, {:.4}\n", res.lat, res.lng));
    out.push_str(&format!("Fajr        : {}\n", t.fajr));
    out.push_str(&format!("Sunrise     : {}\n", t.sunrise));
    out.push_str(&format!("Dhuhr       : {}\n", t.dhuhr));
    out.push_str(&format!("Sunset      : {}\n", t.sunset));
    out.push_str(&format!("Maghrib     : {}\n", t.maghrib));
    out.push_str(&format!("Midnight    : {}\n", t.midnight));
    out.push_str(&format!(
        "Fajr angle {}° | Maghrib offset {} min | Midnight {}\n",
        p.fajr_angle, p.maghrib_offset_min, p.midnight_mode
    ));
    out
}

/// Render a local-day span with one line per UTC date.
pub fn render_day_span(res: &DaySpanResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!("Country     : {} ({})\n", res.country, res.timezone));
    out.push_str(&format!("Local range : {} .. {}\n", res.start_local, res.end_local));
    out.push_str(&format!("UTC range   : {} .. {}\n", res.start_utc, res.end_utc));
    out.push_str(&format!("{:-<28}\n", ""));
    out.push_str(&format!("{:<12}   {:<12}\n", "UTC date", "Local date"));
    for item in &res.items {
        out.push_str(&format!("{:<12} → {:<12}\n", item.utc_date, item.local_date));
    }
    out
}

pub fn render_zone(zone: &ZoneListing<'_>) -> String {
    let mut out = format!("{}: {}\n", zone.country, zone.timezone);
    if zone.candidates.len() > 1 {
        out.push_str(&format!("Candidates  : {}\n", zone.candidates.join(", ")));
    }
    out
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use miqat::service::{DayItem, Times, TimesParams};
    use miqat::solar::MidnightConvention;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_render_prayer_times() {
        let res = PrayerTimesResponse {
            date: ymd(2025, 1, 15),
            lat: 35.6892,
            lng: 51.389,
            tz: 3.5,
            params: TimesParams {
                fajr_angle: 17.7,
                maghrib_offset_min: 4.0,
                midnight_mode: MidnightConvention::DuskToDawn,
            },
            times: Times {
                fajr: "05:45".into(),
                sunrise: "07:13".into(),
                dhuhr: "12:13".into(),
                sunset: "17:13".into(),
                maghrib: "17:17".into(),
                midnight: "23:31".into(),
            },
        };
        let text = render_prayer_times(&res);

        assert!(text.starts_with("Date        : 2025-01-15 (UTC+03:30)\n"));
        assert!(text.contains("Maghrib     : 17:17\n"));
        assert!(text.contains("Midnight maghrib_to_fajr"));
    }

    #[test]
    fn test_render_day_span() {
        let res = DaySpanResponse {
            country: "IQ".into(),
            timezone: "Asia/Baghdad".into(),
            start_local: ymd(2025, 1, 1),
            end_local: ymd(2025, 1, 1),
            start_utc: ymd(2024, 12, 31),
            end_utc: ymd(2025, 1, 1),
            items: vec![
                DayItem { utc_date: ymd(2024, 12, 31), local_date: ymd(2024, 12, 31) },
                DayItem { utc_date: ymd(2025, 1, 1), local_date: ymd(2025, 1, 1) },
            ],
        };
        let text = render_day_span(&res);

        assert!(text.contains("Country     : IQ (Asia/Baghdad)"));
        assert!(text.contains("UTC range   : 2024-12-31 .. 2025-01-01"));
        assert_eq!(text.lines().filter(|l| l.contains('→')).count(), 2);
    }

    #[test]
    fn test_render_zone() {
        let single =
            ZoneListing { country: "IQ", timezone: "Asia/Baghdad", candidates: &["Asia/Baghdad"] };
        assert_eq!(render_zone(&single), "IQ: Asia/Baghdad\n");

        let many = ZoneListing {
            country: "ES",
            timezone: "Europe/Madrid",
            candidates: &["Europe/Madrid", "Africa/Ceuta", "Atlantic/Canary"],
        };
        assert!(render_zone(&many).ends_with("Africa/Ceuta, Atlantic/Canary\n"));
    }
}
