//! Calendar-facing event composition and time-window filtering.

use chrono::{Duration, NaiveDateTime};
use chrono_tz::Tz;

use crate::identity;

/// Summary prefix marking the pupil's lessons in the shared calendar.
pub const SUMMARY_TAG: &str = "[Mo] ";

/// Google color id stamped on every lesson event.
pub const COLOR_TAG: &str = "5";

/// Events that ended more than this many days ago are not written.
pub const PAST_GRACE_DAYS: i64 = 14;

/// Events starting further out than this many days are not written.
pub const FUTURE_HORIZON_DAYS: i64 = 60;

/// A calendar event ready for upserting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonEvent {
    pub id: String,
    pub summary: String,
    pub location: String,
    /// Wall-clock start in `timezone`.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub timezone: Tz,
    pub color_id: String,
}

/// Outcome of an insert-or-update against the remote calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Compose the calendar event for one dated lesson.
///
/// The summary gets the family-calendar tag, and the id is derived from
/// the tagged summary together with the times and room.
pub fn compose_event(
    start: NaiveDateTime,
    end: NaiveDateTime,
    subject: &str,
    room: &str,
    timezone: Tz,
) -> LessonEvent {
    let summary = format!("{SUMMARY_TAG}{subject}");
    LessonEvent {
        id: identity::event_id(start, end, &summary, room),
        summary,
        location: room.to_string(),
        start,
        end,
        timezone,
        color_id: COLOR_TAG.to_string(),
    }
}

/// Whether an event falls inside the sync window around `now`.
///
/// Keeps events whose end is no older than [`PAST_GRACE_DAYS`] and whose
/// start is no further out than [`FUTURE_HORIZON_DAYS`].
pub fn within_window(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> bool {
    if end < now - Duration::days(PAST_GRACE_DAYS) {
        return false;
    }
    if start > now + Duration::days(FUTURE_HORIZON_DAYS) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn paris() -> Tz {
        "Europe/Paris".parse().unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_summary_is_tagged_and_id_scoped() {
        let event = compose_event(at(8, 8), at(8, 9), "MATH", "12", paris());
        assert_eq!(event.summary, "[Mo] MATH");
        assert!(event.id.starts_with("mo_"));
        assert_eq!(event.location, "12");
        assert_eq!(event.color_id, COLOR_TAG);
    }

    #[test]
    fn test_identical_lessons_share_an_id() {
        let a = compose_event(at(8, 8), at(8, 9), "MATH", "12", paris());
        let b = compose_event(at(8, 8), at(8, 9), "MATH", "12", paris());
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_window_keeps_the_present() {
        let now = at(8, 12);
        assert!(within_window(at(8, 8), at(8, 9), now));
    }

    #[test]
    fn test_window_past_boundary() {
        let now = at(20, 12);
        // Ended exactly 14 days ago: kept (the filter is strict).
        assert!(within_window(at(6, 11), at(6, 12), now));
        // A minute older: dropped.
        let old_end = now - Duration::days(PAST_GRACE_DAYS) - Duration::minutes(1);
        assert!(!within_window(old_end - Duration::hours(1), old_end, now));
    }

    #[test]
    fn test_window_future_boundary() {
        let now = at(1, 12);
        let horizon = now + Duration::days(FUTURE_HORIZON_DAYS);
        // Starting exactly at the horizon: kept.
        assert!(within_window(horizon, horizon + Duration::hours(1), now));
        // A minute beyond: dropped.
        let start = horizon + Duration::minutes(1);
        assert!(!within_window(start, start + Duration::hours(1), now));
    }
}
