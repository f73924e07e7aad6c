//! The week-by-week sync pipeline.
//!
//! Generic over its two collaborators so tests can drive it with fixtures:
//! a portal producing week grids and a sink receiving upserts. One broken
//! cell never stops a week; a remote write failure stops the run, and the
//! deterministic id space makes the next run converge.

use anyhow::Result;
use cartable_core::event::{self, LessonEvent, UpsertOutcome};
use cartable_core::label;
use cartable_core::lesson::WeekGrid;
use cartable_core::locale::Locale;
use chrono::{Duration, NaiveDateTime};
use chrono_tz::Tz;
use log::{debug, info, warn};

/// Produces the displayed week and advances through the window.
#[allow(async_fn_in_trait)]
pub trait TimetablePortal {
    /// Extract the currently displayed week.
    async fn current_week(&mut self) -> Result<WeekGrid>;

    /// Advance one week. `false` when no advance control was found.
    async fn advance_week(&mut self) -> Result<bool>;
}

/// Receives composed events.
#[allow(async_fn_in_trait)]
pub trait CalendarSink {
    async fn upsert(&mut self, event: &LessonEvent) -> Result<UpsertOutcome>;
}

/// Per-run settings the pipeline needs.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Window size, starting at the currently displayed week.
    pub weeks_to_fetch: u32,
    /// Zone stamped on every event and used for "now".
    pub timezone: Tz,
    /// Log instead of writing.
    pub dry_run: bool,
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub created: usize,
    pub updated: usize,
    /// Cells dropped by parsing, validation, or the time window.
    pub skipped: usize,
}

/// Drive the full window: extract, compose, upsert, advance.
pub async fn run<P, S>(
    portal: &mut P,
    sink: &mut S,
    locale: &Locale,
    options: &SyncOptions,
) -> Result<SyncStats>
where
    P: TimetablePortal,
    S: CalendarSink,
{
    let mut stats = SyncStats::default();
    let now = now_in(options.timezone);

    for week_index in 0..options.weeks_to_fetch {
        let grid = portal.current_week().await?;

        let anchor = match grid.monday {
            Some(monday) => monday,
            // The initially displayed week contains today, so today is an
            // acceptable approximate anchor when the banner fails to parse.
            None if week_index == 0 => {
                warn!(
                    "Week banner did not parse ({:?}); anchoring the visible week on today",
                    grid.header
                );
                now.date()
            }
            // After advancing, a fresh banner is expected; do not guess.
            None => {
                warn!(
                    "Skipping week {}: banner did not parse ({:?})",
                    week_index + 1,
                    grid.header
                );
                stats.skipped += grid.cells.len();
                if !portal.advance_week().await? {
                    break;
                }
                continue;
            }
        };

        let mut week_events = 0usize;
        for cell in &grid.cells {
            let Some(lesson) = label::parse_cell(cell, locale) else {
                debug!("Skipping unparseable cell: {:?}", cell.label);
                stats.skipped += 1;
                continue;
            };
            let Some(day) = lesson.day_index.filter(|d| (0..=6).contains(d)) else {
                debug!("Skipping cell without a day column: {:?}", cell.label);
                stats.skipped += 1;
                continue;
            };

            let date = anchor + Duration::days(day);
            let start = date.and_time(lesson.start);
            let end = date.and_time(lesson.end);
            if end <= start {
                debug!("Skipping cell with a non-positive span: {:?}", cell.label);
                stats.skipped += 1;
                continue;
            }
            if !event::within_window(start, end, now) {
                debug!("Outside the sync window: {:?}", cell.label);
                stats.skipped += 1;
                continue;
            }

            let composed =
                event::compose_event(start, end, &lesson.subject, &lesson.room, options.timezone);

            if options.dry_run {
                info!("[dry-run] would upsert {} ({})", composed.summary, composed.id);
                week_events += 1;
                continue;
            }

            match sink.upsert(&composed).await? {
                UpsertOutcome::Created => stats.created += 1,
                UpsertOutcome::Updated => stats.updated += 1,
            }
            week_events += 1;
        }
        info!(
            "Week {}/{}: {} events ({} cells)",
            week_index + 1,
            options.weeks_to_fetch,
            week_events,
            grid.cells.len()
        );

        if week_index + 1 < options.weeks_to_fetch && !portal.advance_week().await? {
            info!("No further weeks available, stopping after week {}", week_index + 1);
            break;
        }
    }

    Ok(stats)
}

fn now_in(timezone: Tz) -> NaiveDateTime {
    chrono::Utc::now().with_timezone(&timezone).naive_local()
}
