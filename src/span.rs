//! Local Date / UTC Date Mapping Module
//!
//! Converts an inclusive local calendar-date range in an IANA zone into the
//! UTC instants and UTC calendar dates it covers, and maps UTC-dated records
//! back to the local date a viewer in that zone would file them under.

use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{Error, Result};

// ===================== TYPES =====================

/// A local date range and the UTC span that intersects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalUtcSpan {
    pub start_local: NaiveDate,
    pub end_local: NaiveDate,
    pub timezone: Tz,
    /// Instant of local midnight at `start_local`
    pub start_utc: DateTime<Utc>,
    /// Last microsecond before local midnight after `end_local`
    pub end_utc: DateTime<Utc>,
    pub start_utc_date: NaiveDate,
    pub end_utc_date: NaiveDate,
}

impl LocalUtcSpan {
    /// Every UTC calendar date in the span, inclusive.
    pub fn utc_dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end_utc_date;
        self.start_utc_date.iter_days().take_while(move |d| *d <= end)
    }

    /// Every local calendar date in the span, inclusive.
    pub fn local_dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end_local;
        self.start_local.iter_days().take_while(move |d| *d <= end)
    }
}

// ===================== MAPPING =====================

/// Map an inclusive local date range to the UTC span that covers it.
///
/// Offsets are resolved at each boundary instant, so DST and historical
/// offset changes inside the range are honored.
///
/// # Errors
/// Returns [`Error::StartAfterEnd`] when `start > end`.
pub fn local_range_to_utc_span(
    start: NaiveDate,
    end: NaiveDate,
    tz: Tz,
) -> Result<LocalUtcSpan> {
    if start > end {
        return Err(Error::StartAfterEnd { start, end });
    }
    let after_end =
        end.succ_opt().ok_or(Error::InvalidDate { field: "end", value: end.to_string() })?;

    let start_utc = local_midnight(tz, start).with_timezone(&Utc);
    let end_utc = local_midnight(tz, after_end).with_timezone(&Utc) - TimeDelta::microseconds(1);

    Ok(LocalUtcSpan {
        start_local: start,
        end_local: end,
        timezone: tz,
        start_utc,
        end_utc,
        start_utc_date: start_utc.date_naive(),
        end_utc_date: end_utc.date_naive(),
    })
}

/// Local date on which a UTC-dated record falls, anchored at 12:00 UTC.
///
/// Noon keeps the result on the same calendar date for every offset under
/// twelve hours; a midnight anchor would slip a day for all western zones.
pub fn utc_date_to_local_date(utc_date: NaiveDate, tz: Tz) -> NaiveDate {
    let noon = utc_date.and_time(NaiveTime::MIN) + TimeDelta::hours(12);
    Utc.from_utc_datetime(&noon).with_timezone(&tz).date_naive()
}

/// First instant of a local calendar day.
///
/// An ambiguous midnight resolves to its earlier instant. A midnight that
/// falls into a DST gap resolves to the end of the gap, which is the first
/// wall-clock time that exists on that day.
pub fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(earliest, latest) => {
            warn!(%date, %tz, %earliest, %latest, "ambiguous local midnight, using earlier");
            earliest
        }
        LocalResult::None => {
            // The offset in force before the gap maps this wall time onto the transition
            let before = tz.offset_from_utc_datetime(&(naive - TimeDelta::days(1))).fix();
            let instant = naive - TimeDelta::seconds(i64::from(before.local_minus_utc()));
            let t = Utc.from_utc_datetime(&instant).with_timezone(&tz);
            warn!(%date, %tz, start = %t, "local midnight skipped by DST gap");
            t
        }
    }
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_first.and_then(|d| d.pred_opt()).unwrap_or(date);
    (first, last)
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::{Havana, Sao_Paulo};
    use chrono_tz::Asia::{Baghdad, Tehran, Tokyo};
    use chrono_tz::Pacific::{Apia, Kiritimati};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_utc_single_day() {
        let span = local_range_to_utc_span(ymd(2025, 1, 1), ymd(2025, 1, 1), Tz::UTC).unwrap();

        assert_eq!(span.start_utc_date, ymd(2025, 1, 1));
        assert_eq!(span.end_utc_date, ymd(2025, 1, 1));
        assert_eq!(span.start_utc, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(span.end_utc.time().hour(), 23);
        assert_eq!(span.end_utc.time().nanosecond(), 999_999_000);
        assert_eq!(span.utc_dates().count(), 1);
    }

    #[test]
    fn test_tehran_day_starts_on_previous_utc_date() {
        let span = local_range_to_utc_span(ymd(2025, 1, 1), ymd(2025, 1, 1), Tehran).unwrap();

        // Local midnight at +03:30 is 20:30 UTC the day before
        assert_eq!(span.start_utc, Utc.with_ymd_and_hms(2024, 12, 31, 20, 30, 0).unwrap());
        assert_eq!(span.start_utc_date, ymd(2024, 12, 31));
        assert_eq!(span.end_utc_date, ymd(2025, 1, 1));
        assert_eq!(
            span.utc_dates().collect::<Vec<_>>(),
            vec![ymd(2024, 12, 31), ymd(2025, 1, 1)]
        );
    }

    #[test]
    fn test_western_zone_extends_into_next_utc_date() {
        let span =
            local_range_to_utc_span(ymd(2025, 3, 1), ymd(2025, 3, 31), Sao_Paulo).unwrap();

        assert_eq!(span.start_utc_date, ymd(2025, 3, 1));
        assert_eq!(span.end_utc_date, ymd(2025, 4, 1));
        assert_eq!(span.local_dates().count(), 31);
        assert_eq!(span.utc_dates().count(), 32);
    }

    #[test]
    fn test_offset_resolved_per_instant() {
        // Havana switches to daylight time on 2025-03-09 at 00:00 local
        let span = local_range_to_utc_span(ymd(2025, 3, 1), ymd(2025, 3, 20), Havana).unwrap();

        assert_eq!(span.start_utc, Utc.with_ymd_and_hms(2025, 3, 1, 5, 0, 0).unwrap());
        assert_eq!(
            span.end_utc + TimeDelta::microseconds(1),
            Utc.with_ymd_and_hms(2025, 3, 21, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_midnight_in_dst_gap() {
        // 2025-03-09 00:00 does not exist in Havana; the day starts at 01:00 CDT
        let start = local_midnight(Havana, ymd(2025, 3, 9));
        assert_eq!(start.with_timezone(&Utc), Utc.with_ymd_and_hms(2025, 3, 9, 5, 0, 0).unwrap());
        assert_eq!(start.date_naive(), ymd(2025, 3, 9));
        assert_eq!(start.hour(), 1);
    }

    #[test]
    fn test_midnight_when_day_repeats_hour() {
        // Havana falls back from 01:00 CDT to 00:00 CST on 2025-11-02; midnight occurs twice
        let midnight = local_midnight(Havana, ymd(2025, 11, 2));
        assert_eq!(
            midnight.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2025, 11, 2, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_samoa_skipped_day() {
        // Apia skipped 2011-12-30 entirely; the range still yields a valid span
        let span = local_range_to_utc_span(ymd(2011, 12, 29), ymd(2011, 12, 31), Apia).unwrap();
        assert!(span.start_utc < span.end_utc);
        assert_eq!(span.start_utc_date, ymd(2011, 12, 29));
    }

    #[test]
    fn test_start_after_end() {
        let err = local_range_to_utc_span(ymd(2025, 2, 1), ymd(2025, 1, 1), Baghdad).unwrap_err();
        assert!(matches!(err, Error::StartAfterEnd { .. }));
    }

    #[test]
    fn test_reverse_mapping_same_day() {
        let stored = ymd(2025, 6, 15);
        assert_eq!(utc_date_to_local_date(stored, Tokyo), stored);
        assert_eq!(utc_date_to_local_date(stored, Baghdad), stored);
        assert_eq!(utc_date_to_local_date(stored, Sao_Paulo), stored);
        assert_eq!(utc_date_to_local_date(stored, Tz::UTC), stored);
    }

    #[test]
    fn test_reverse_mapping_beyond_twelve_hours() {
        // UTC+14 is past the noon anchor's safe range
        let stored = ymd(2025, 6, 15);
        assert_eq!(utc_date_to_local_date(stored, Kiritimati), ymd(2025, 6, 16));
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(ymd(2025, 2, 14)), (ymd(2025, 2, 1), ymd(2025, 2, 28)));
        assert_eq!(month_bounds(ymd(2024, 2, 29)), (ymd(2024, 2, 1), ymd(2024, 2, 29)));
        assert_eq!(month_bounds(ymd(2025, 12, 31)), (ymd(2025, 12, 1), ymd(2025, 12, 31)));
        assert_eq!(month_bounds(ymd(2025, 1, 1)), (ymd(2025, 1, 1), ymd(2025, 1, 31)));
    }
}
