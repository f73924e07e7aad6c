//! Accessibility-label parsing for timetable cells.
//!
//! The portal encodes each lesson in a cell's free-text accessibility
//! label, conventionally time span first, then subject, then optional room
//! and teacher annotations:
//!
//! ```text
//! 08:00 - 09:00 ENGLISH LV1 — Room 105 — Teacher: Dupont
//! ```
//!
//! The format is locale-dependent and fragile, so parsing is tolerant: a
//! label without two recognisable time tokens yields no lesson, and every
//! other field degrades to a placeholder or an empty string.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use crate::lesson::{Lesson, RawCell};
use crate::locale::Locale;

/// Subject used when the label carries nothing beyond the time span.
pub const PLACEHOLDER_SUBJECT: &str = "Lesson";

/// One wall-clock token: `08:00`, `8h00`, `08 H 00`.
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*[h:]\s*([0-5]\d)").expect("static pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// Parse one grid cell into a lesson.
///
/// Returns `None` when the label does not carry at least two valid time
/// tokens; it never panics on malformed input.
pub fn parse_cell(cell: &RawCell, locale: &Locale) -> Option<Lesson> {
    let label = collapse_whitespace(&cell.label);

    let mut times = Vec::with_capacity(2);
    let mut span_end = 0;
    for caps in TIME.captures_iter(&label) {
        let (Ok(hour), Ok(minute)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
            continue;
        };
        // Tokens like "27:30" match the pattern but are not wall-clock times.
        let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
            continue;
        };
        if let Some(m) = caps.get(0) {
            span_end = m.end();
        }
        times.push(time);
        if times.len() == 2 {
            break;
        }
    }
    if times.len() < 2 {
        return None;
    }

    let room = extract_room(&label, locale);

    // The subject is whatever follows the time span, cut before any room or
    // teacher annotation.
    let tail = &label[span_end..];
    let mut cut = tail.len();
    if let Some(m) = locale.room_pattern().find(tail) {
        cut = cut.min(m.start());
    }
    if let Some(m) = locale.teacher_pattern().find(tail) {
        cut = cut.min(m.start());
    }
    let subject = trim_decorations(&tail[..cut]);
    let subject = if subject.is_empty() {
        PLACEHOLDER_SUBJECT.to_string()
    } else {
        subject
    };

    Some(Lesson {
        start: times[0],
        end: times[1],
        day_index: cell.day_index,
        subject,
        room,
    })
}

/// First room annotation in the label, trimmed; empty when none.
fn extract_room(label: &str, locale: &Locale) -> String {
    let Some(caps) = locale.room_pattern().captures(label) else {
        return String::new();
    };
    let Some(phrase) = caps.get(1) else {
        return String::new();
    };
    let mut value = phrase.as_str();
    // A teacher annotation separated by a plain hyphen ends up inside the
    // captured phrase; cut it off.
    if let Some(m) = locale.teacher_pattern().find(value) {
        value = &value[..m.start()];
    }
    trim_decorations(value)
}

fn collapse_whitespace(label: &str) -> String {
    WHITESPACE.replace_all(label.trim(), " ").into_owned()
}

fn trim_decorations(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '—' | '–' | ':' | '·'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(label: &str) -> RawCell {
        RawCell {
            label: label.to_string(),
            day_index: Some(0),
        }
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_full_label_roundtrip() {
        let lesson = parse_cell(
            &cell("08:00 - 09:00 ENGLISH LV1 — Room 105 — Teacher: Dupont"),
            &Locale::french(),
        )
        .expect("should parse");

        assert_eq!(lesson.start, time(8, 0));
        assert_eq!(lesson.end, time(9, 0));
        assert_eq!(lesson.subject, "ENGLISH LV1");
        assert_eq!(lesson.room, "105");
    }

    #[test]
    fn test_french_h_separator_and_salle() {
        let lesson = parse_cell(&cell("8h30 - 10h25 MATHS — Salle B12"), &Locale::french())
            .expect("should parse");

        assert_eq!(lesson.start, time(8, 30));
        assert_eq!(lesson.end, time(10, 25));
        assert_eq!(lesson.subject, "MATHS");
        assert_eq!(lesson.room, "B12");
    }

    #[test]
    fn test_spaced_hour_separator() {
        let lesson = parse_cell(&cell("08 H 00 - 09 H 00 HISTOIRE"), &Locale::french())
            .expect("should parse");

        assert_eq!(lesson.start, time(8, 0));
        assert_eq!(lesson.end, time(9, 0));
        assert_eq!(lesson.subject, "HISTOIRE");
        assert_eq!(lesson.room, "");
    }

    #[test]
    fn test_internal_whitespace_is_collapsed() {
        let lesson = parse_cell(&cell("  10:00   -  11:00   PE \n indoor "), &Locale::french())
            .expect("should parse");

        assert_eq!(lesson.subject, "PE indoor");
    }

    #[test]
    fn test_no_times_yields_no_lesson() {
        assert_eq!(parse_cell(&cell("no times here"), &Locale::french()), None);
    }

    #[test]
    fn test_single_time_yields_no_lesson() {
        assert_eq!(parse_cell(&cell("09:00 STUDY HALL"), &Locale::french()), None);
    }

    #[test]
    fn test_out_of_range_hours_are_not_times() {
        assert_eq!(parse_cell(&cell("27:00 - 28:00 X"), &Locale::french()), None);
    }

    #[test]
    fn test_bare_time_span_gets_placeholder_subject() {
        let lesson =
            parse_cell(&cell("08:00 - 09:00"), &Locale::french()).expect("should parse");

        assert_eq!(lesson.subject, PLACEHOLDER_SUBJECT);
        assert_eq!(lesson.room, "");
    }

    #[test]
    fn test_teacher_annotation_with_plain_hyphen() {
        let lesson = parse_cell(
            &cell("14:00 - 15:00 PHYSIQUE — Salle 204 - Prof Martin"),
            &Locale::french(),
        )
        .expect("should parse");

        assert_eq!(lesson.subject, "PHYSIQUE");
        assert_eq!(lesson.room, "204");
    }

    #[test]
    fn test_day_index_passes_through() {
        let raw = RawCell {
            label: "08:00 - 09:00 SVT".to_string(),
            day_index: Some(3),
        };
        let lesson = parse_cell(&raw, &Locale::french()).expect("should parse");
        assert_eq!(lesson.day_index, Some(3));
    }
}
