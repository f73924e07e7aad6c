//! Shared types and parsing for the cartable ecosystem.
//!
//! Everything here is portal- and provider-neutral: the grid scraper
//! produces [`lesson::WeekGrid`] values, the parsers turn them into
//! [`lesson::Lesson`]s, and the pipeline composes those into
//! [`event::LessonEvent`]s keyed by [`identity::event_id`].

pub mod error;
pub mod event;
pub mod identity;
pub mod label;
pub mod lesson;
pub mod locale;
pub mod week;
