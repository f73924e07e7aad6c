//! Week banner parsing.
//!
//! The timetable view shows a period banner such as
//! `"Semaine 37 - 08/09/2025 au 14/09/2025"`; its first date is the Monday
//! of the displayed week.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2})/(\d{2})/(\d{4})\b").expect("static pattern"));

/// Monday anchor of the displayed week, from the period banner text.
///
/// Takes the first `DD/MM/YYYY` that is a real calendar date; `None` when
/// the banner carries none.
pub fn parse_week_banner(text: &str) -> Option<NaiveDate> {
    DATE.captures_iter(text).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_first_date_as_monday() {
        let monday = parse_week_banner("Week 37 - 08/09/2025 to 14/09/2025");
        assert_eq!(monday, NaiveDate::from_ymd_opt(2025, 9, 8));
    }

    #[test]
    fn test_french_banner() {
        let monday = parse_week_banner("Semaine du 02/03/2026 au 08/03/2026");
        assert_eq!(monday, NaiveDate::from_ymd_opt(2026, 3, 2));
    }

    #[test]
    fn test_no_date_yields_none() {
        assert_eq!(parse_week_banner("Emploi du temps"), None);
        assert_eq!(parse_week_banner(""), None);
    }

    #[test]
    fn test_impossible_date_is_skipped_for_a_later_valid_one() {
        let monday = parse_week_banner("du 99/99/2025 au 08/09/2025");
        assert_eq!(monday, NaiveDate::from_ymd_opt(2025, 9, 8));
    }
}
