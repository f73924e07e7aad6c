//! Insert-or-update against the configured Google calendar.

use anyhow::{Context, Result};
use cartable_core::event::{LessonEvent, UpsertOutcome};
use chrono::{NaiveDateTime, TimeZone, Utc};
use google_calendar::types::{Event, EventDateTime, SendUpdates};
use log::debug;

use crate::auth::GoogleSession;

/// The pipeline's write handle on one Google calendar.
pub struct GoogleCalendar {
    session: GoogleSession,
    calendar_id: String,
}

impl GoogleCalendar {
    pub fn new(session: GoogleSession, calendar_id: impl Into<String>) -> Self {
        Self {
            session,
            calendar_id: calendar_id.into(),
        }
    }

    /// Insert the event under its caller-supplied id; on an id collision,
    /// update the existing event with the same body.
    ///
    /// After a successful call the calendar holds exactly one event with
    /// this id and these fields, so repeated calls with the same input are
    /// no-ops beyond network traffic. Notifications are suppressed either
    /// way. Non-conflict failures propagate to the caller.
    pub async fn upsert(&mut self, event: &LessonEvent) -> Result<UpsertOutcome> {
        self.session.ensure_fresh().await?;
        let client = self.session.client();
        let body = to_google_event(event)?;

        let inserted = client
            .events()
            .insert(
                &self.calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &body,
            )
            .await;

        match inserted {
            Ok(_) => {
                debug!("Created {}", event.id);
                Ok(UpsertOutcome::Created)
            }
            Err(e) if is_conflict(&e) => {
                client
                    .events()
                    .update(
                        &self.calendar_id,
                        &event.id,
                        0,
                        0,
                        false,
                        SendUpdates::None,
                        false,
                        &body,
                    )
                    .await
                    .with_context(|| format!("Failed to update event: {}", event.summary))?;
                debug!("Updated {}", event.id);
                Ok(UpsertOutcome::Updated)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to create event: {}", event.summary)),
        }
    }
}

/// The API reports an id collision as a 409 duplicate.
fn is_conflict(error: &impl std::fmt::Display) -> bool {
    let text = error.to_string();
    text.contains("409")
        || text.to_ascii_lowercase().contains("already exists")
        || text.to_ascii_lowercase().contains("duplicate")
}

/// Map a lesson event onto the API type, stamping the configured zone.
fn to_google_event(event: &LessonEvent) -> Result<Event> {
    Ok(Event {
        id: event.id.clone(),
        summary: event.summary.clone(),
        location: event.location.clone(),
        start: Some(event_date_time(event, event.start)?),
        end: Some(event_date_time(event, event.end)?),
        color_id: event.color_id.clone(),
        ..Default::default()
    })
}

fn event_date_time(event: &LessonEvent, local: NaiveDateTime) -> Result<EventDateTime> {
    let zoned = event
        .timezone
        .from_local_datetime(&local)
        .earliest()
        .with_context(|| format!("{local} does not exist in {}", event.timezone))?;
    Ok(EventDateTime {
        date: None,
        date_time: Some(zoned.with_timezone(&Utc)),
        time_zone: event.timezone.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartable_core::event::compose_event;
    use chrono::NaiveDate;

    fn paris_event(date: (i32, u32, u32)) -> LessonEvent {
        let day = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        compose_event(
            day.and_hms_opt(8, 0, 0).unwrap(),
            day.and_hms_opt(9, 0, 0).unwrap(),
            "MATH",
            "12",
            "Europe/Paris".parse().unwrap(),
        )
    }

    #[test]
    fn test_mapping_stamps_zone_and_converts_to_utc() {
        // CEST in September: 08:00 local is 06:00Z.
        let mapped = to_google_event(&paris_event((2025, 9, 8))).expect("should map");
        let start = mapped.start.expect("start set");
        assert_eq!(start.time_zone, "Europe/Paris");
        assert_eq!(
            start.date_time,
            Some(Utc.with_ymd_and_hms(2025, 9, 8, 6, 0, 0).unwrap())
        );
        assert_eq!(start.date, None);
    }

    #[test]
    fn test_mapping_in_winter_offset() {
        // CET in January: 08:00 local is 07:00Z.
        let mapped = to_google_event(&paris_event((2025, 1, 6))).expect("should map");
        let start = mapped.start.expect("start set");
        assert_eq!(
            start.date_time,
            Some(Utc.with_ymd_and_hms(2025, 1, 6, 7, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_mapping_carries_identity_fields() {
        let event = paris_event((2025, 9, 8));
        let mapped = to_google_event(&event).expect("should map");
        assert_eq!(mapped.id, event.id);
        assert_eq!(mapped.summary, "[Mo] MATH");
        assert_eq!(mapped.location, "12");
        assert_eq!(mapped.color_id, event.color_id);
    }

    #[test]
    fn test_conflict_detection() {
        assert!(is_conflict(&"code: 409 Conflict"));
        assert!(is_conflict(&"The requested identifier already exists"));
        assert!(!is_conflict(&"code: 403 Forbidden"));
    }
}
