//! Pipeline trait implementations for the real collaborators.

use anyhow::Result;
use cartable_core::event::{LessonEvent, UpsertOutcome};
use cartable_core::lesson::WeekGrid;
use cartable_portal::driver::PortalDriver;
use cartable_portal::grid;
use cartable_provider_google::calendar::GoogleCalendar;

use crate::pipeline::{CalendarSink, TimetablePortal};

impl TimetablePortal for PortalDriver {
    async fn current_week(&mut self) -> Result<WeekGrid> {
        grid::extract_week(self).await
    }

    async fn advance_week(&mut self) -> Result<bool> {
        self.next_week().await
    }
}

impl CalendarSink for GoogleCalendar {
    async fn upsert(&mut self, event: &LessonEvent) -> Result<UpsertOutcome> {
        GoogleCalendar::upsert(self, event).await
    }
}
