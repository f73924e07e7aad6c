//! Intermediate timetable types.
//!
//! The portal produces [`WeekGrid`] values; the label parser turns each raw
//! cell into a [`Lesson`]. Lessons are transient: they live only long enough
//! to be composed into calendar events, nothing is stored between weeks.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One scheduled class, as recovered from a grid cell's accessibility label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// Day offset from the week's Monday (0 = Monday). Lessons whose cell
    /// carried no usable day column are discarded by the pipeline.
    pub day_index: Option<i64>,
    pub subject: String,
    /// Empty when the label carries no room annotation.
    pub room: String,
}

/// A raw grid cell: accessibility label plus the day column it sits in.
///
/// This is the shape the DOM-side collection script returns, so it stays
/// deliberately loose (`i64` day index, validated later).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCell {
    pub label: String,
    pub day_index: Option<i64>,
}

/// Everything extracted from one displayed week.
#[derive(Debug, Clone, Default)]
pub struct WeekGrid {
    /// Monday of the displayed week, when the period banner parsed.
    pub monday: Option<NaiveDate>,
    /// Cell order is not semantically significant.
    pub cells: Vec<RawCell>,
    /// Raw banner text, kept for diagnostics.
    pub header: String,
}
