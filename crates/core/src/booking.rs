//! Appointment slot arithmetic.
//!
//! The salon opens and closes at fixed local times and offers start times on a
//! fixed grid (every `slot_minutes` from opening). A start is free when the
//! whole service fits before closing and its interval does not overlap any
//! active appointment of the chosen stylist. Intervals are half-open, so an
//! appointment ending at 10:00 does not block one starting at 10:00.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Furthest a booking or availability lookup may reach, in days from today.
pub const BOOKING_HORIZON_DAYS: i64 = 365;

/// Invalid opening-hours configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingHoursError {
    #[error("opening time must be before closing time")]
    OpenAfterClose,
    #[error("slot length must be between 5 and 240 minutes")]
    InvalidSlotLength,
}

/// Daily opening hours in the salon's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingHours {
    open: NaiveTime,
    close: NaiveTime,
    slot_minutes: u32,
}

impl BookingHours {
    /// Create opening hours.
    ///
    /// # Errors
    ///
    /// Returns an error if `open` is not before `close` or the slot length is
    /// outside 5..=240 minutes.
    pub fn new(open: NaiveTime, close: NaiveTime, slot_minutes: u32) -> Result<Self, BookingHoursError> {
        if open >= close {
            return Err(BookingHoursError::OpenAfterClose);
        }
        if !(5..=240).contains(&slot_minutes) {
            return Err(BookingHoursError::InvalidSlotLength);
        }
        Ok(Self {
            open,
            close,
            slot_minutes,
        })
    }

    #[must_use]
    pub const fn open(&self) -> NaiveTime {
        self.open
    }

    #[must_use]
    pub const fn close(&self) -> NaiveTime {
        self.close
    }

    #[must_use]
    pub const fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }
}

/// An occupied interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub start: DateTime<Utc>,
    pub duration_minutes: i32,
}

impl Booking {
    /// End of the interval, saturating at the latest representable instant.
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.start
            .checked_add_signed(TimeDelta::minutes(i64::from(self.duration_minutes)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Half-open interval overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Convert a local wall-clock time at `offset` to UTC.
///
/// `None` only at the edges of chrono's calendar.
#[must_use]
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let local = date.and_time(time);
    local
        .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
        .map(|utc| utc.and_utc())
}

/// UTC bounds `[start, end)` of a local calendar day.
#[must_use]
pub fn local_day_bounds(date: NaiveDate, offset: FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_to_utc(date, NaiveTime::default(), offset)?;
    let end = start.checked_add_signed(TimeDelta::days(1))?;
    Some((start, end))
}

/// Whether a salon-local `date` lies between yesterday and
/// [`BOOKING_HORIZON_DAYS`] ahead of `today`.
///
/// Yesterday is allowed so a client a few hours behind the salon can still
/// ask about its own "today".
#[must_use]
pub fn within_horizon(date: NaiveDate, today: NaiveDate) -> bool {
    let earliest = today.checked_sub_signed(TimeDelta::days(1));
    let latest = today.checked_add_signed(TimeDelta::days(BOOKING_HORIZON_DAYS));
    earliest.is_none_or(|earliest| date >= earliest) && latest.is_none_or(|latest| date <= latest)
}

/// Whether `start` is on the slot grid and the whole service fits inside
/// opening hours on that local day.
#[must_use]
pub fn is_bookable_start(
    start: DateTime<Utc>,
    hours: &BookingHours,
    offset: FixedOffset,
    service_minutes: i32,
) -> bool {
    let local = start.with_timezone(&offset).naive_local();
    let date = local.date();
    let open = date.and_time(hours.open);
    let close = date.and_time(hours.close);
    let Some(end) = local.checked_add_signed(TimeDelta::minutes(i64::from(service_minutes))) else {
        return false;
    };

    if service_minutes <= 0 || local < open || end > close {
        return false;
    }
    let since_open = (local - open).num_seconds();
    since_open % (i64::from(hours.slot_minutes) * 60) == 0
}

/// Free start times on `date` for a service of `service_minutes`.
///
/// Starts at or before `now` are skipped, as are starts whose interval
/// overlaps any of `booked`.
#[must_use]
pub fn available_slots(
    date: NaiveDate,
    hours: &BookingHours,
    offset: FixedOffset,
    service_minutes: i32,
    booked: &[Booking],
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    if service_minutes <= 0 {
        return Vec::new();
    }

    let (Some(mut start), Some(close)) = (
        local_to_utc(date, hours.open, offset),
        local_to_utc(date, hours.close, offset),
    ) else {
        return Vec::new();
    };
    let step = TimeDelta::minutes(i64::from(hours.slot_minutes));
    let mut slots = Vec::new();

    loop {
        let candidate = Booking {
            start,
            duration_minutes: service_minutes,
        };
        if candidate.end() > close {
            break;
        }
        if start > now && !booked.iter().any(|b| b.overlaps(&candidate)) {
            slots.push(start);
        }
        match start.checked_add_signed(step) {
            Some(next) => start = next,
            None => break,
        }
    }

    slots
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn hours() -> BookingHours {
        BookingHours::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            30,
        )
        .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_hours_validation() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            BookingHours::new(nine, nine, 30),
            Err(BookingHoursError::OpenAfterClose)
        );
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert_eq!(
            BookingHours::new(nine, ten, 0),
            Err(BookingHoursError::InvalidSlotLength)
        );
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = Booking {
            start: utc(9, 0),
            duration_minutes: 60,
        };
        let touching = Booking {
            start: utc(10, 0),
            duration_minutes: 30,
        };
        let inside = Booking {
            start: utc(9, 30),
            duration_minutes: 15,
        };
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn test_empty_day_offers_full_grid() {
        let slots = available_slots(date(), &hours(), FixedOffset::east_opt(0).unwrap(), 60, &[], long_ago());
        // 09:00 .. 11:00 inclusive; an hour-long service starting 11:30 would overrun.
        assert_eq!(slots, vec![utc(9, 0), utc(9, 30), utc(10, 0), utc(10, 30), utc(11, 0)]);
    }

    #[test]
    fn test_booked_interval_blocks_overlapping_starts() {
        let booked = [Booking {
            start: utc(10, 0),
            duration_minutes: 30,
        }];
        let slots = available_slots(date(), &hours(), FixedOffset::east_opt(0).unwrap(), 60, &booked, long_ago());
        assert_eq!(slots, vec![utc(9, 0), utc(10, 30), utc(11, 0)]);
    }

    #[test]
    fn test_past_starts_are_skipped() {
        let slots = available_slots(date(), &hours(), FixedOffset::east_opt(0).unwrap(), 30, &[], utc(10, 15));
        assert_eq!(slots, vec![utc(10, 30), utc(11, 0), utc(11, 30)]);
    }

    #[test]
    fn test_offset_shifts_grid_to_utc() {
        // UTC+2: local 09:00 is 07:00 UTC.
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let slots = available_slots(date(), &hours(), offset, 180, &[], long_ago());
        assert_eq!(slots, vec![utc(7, 0)]);
    }

    #[test]
    fn test_is_bookable_start() {
        let offset = FixedOffset::east_opt(0).unwrap();
        assert!(is_bookable_start(utc(9, 30), &hours(), offset, 60));
        assert!(!is_bookable_start(utc(9, 15), &hours(), offset, 30));
        assert!(!is_bookable_start(utc(11, 30), &hours(), offset, 60));
        assert!(!is_bookable_start(utc(8, 30), &hours(), offset, 30));
        assert!(!is_bookable_start(utc(9, 0), &hours(), offset, 0));
    }

    #[test]
    fn test_local_day_bounds() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let (start, end) = local_day_bounds(date(), offset).unwrap();
        assert_eq!(start, utc(5, 0));
        assert_eq!(end - start, TimeDelta::days(1));
    }

    #[test]
    fn test_slot_starting_now_is_not_offered() {
        let slots = available_slots(date(), &hours(), FixedOffset::east_opt(0).unwrap(), 30, &[], utc(11, 0));
        assert_eq!(slots, vec![utc(11, 30)]);
    }

    #[test]
    fn test_calendar_edge_dates_do_not_overflow() {
        let utc_offset = FixedOffset::east_opt(0).unwrap();
        let last_day: NaiveDate = serde_json::from_str("\"+262142-12-31\"").unwrap();
        assert_eq!(local_day_bounds(last_day, utc_offset), None);
        assert_eq!(local_day_bounds(NaiveDate::MAX, utc_offset), None);
        assert!(local_to_utc(NaiveDate::MIN, NaiveTime::default(), FixedOffset::east_opt(3600).unwrap()).is_none());

        let late_start: DateTime<Utc> = serde_json::from_str("\"+262142-12-31T23:30:00Z\"").unwrap();
        let all_day = BookingHours::new(
            NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
            30,
        )
        .unwrap();
        assert!(!is_bookable_start(late_start, &all_day, utc_offset, 60));
        assert!(!is_bookable_start(late_start, &hours(), utc_offset, 60));
        assert_eq!(
            Booking {
                start: late_start,
                duration_minutes: 60
            }
            .end(),
            DateTime::<Utc>::MAX_UTC
        );
        assert!(available_slots(NaiveDate::MAX, &all_day, utc_offset, 60, &[], long_ago()).is_empty());
    }

    #[test]
    fn test_within_horizon() {
        let today = date();
        assert!(within_horizon(today, today));
        assert!(within_horizon(today.pred_opt().unwrap(), today));
        assert!(!within_horizon(today - TimeDelta::days(2), today));
        assert!(within_horizon(today + TimeDelta::days(BOOKING_HORIZON_DAYS), today));
        assert!(!within_horizon(today + TimeDelta::days(BOOKING_HORIZON_DAYS + 1), today));
        assert!(!within_horizon(NaiveDate::MAX, today));
    }
}
