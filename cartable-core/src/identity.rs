//! Deterministic event identity.
//!
//! The id scopes this tool's events inside the shared family calendar:
//! other integrations never mint `mo_`-prefixed ids, and repeated runs
//! derive the same id for the same lesson occurrence, so upserts converge
//! instead of duplicating. Renaming a subject or moving a room changes the
//! id, orphaning the previously written event; that is accepted (this tool
//! never deletes).

use chrono::NaiveDateTime;
use md5::{Digest, Md5};

/// Prefix scoping this tool's ids in the shared calendar.
pub const ID_PREFIX: &str = "mo_";

/// Derive the deterministic event id for one lesson occurrence.
///
/// Start and end contribute their full date and time without a zone
/// suffix, so the same Tuesday slot in different weeks yields different
/// ids. MD5 is used for distribution, not cryptographic strength.
pub fn event_id(start: NaiveDateTime, end: NaiveDateTime, title: &str, room: &str) -> String {
    let key = format!(
        "{}|{}|{}|{}",
        start.format("%Y-%m-%dT%H:%M:%S"),
        end.format("%Y-%m-%dT%H:%M:%S"),
        title,
        room
    );
    format!("{}{}", ID_PREFIX, hex::encode(Md5::digest(key.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::collections::HashSet;

    fn slot(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_same_quadruple_same_id() {
        let a = event_id(slot(8, 8), slot(8, 9), "[Mo] MATH", "12");
        let b = event_id(slot(8, 8), slot(8, 9), "[Mo] MATH", "12");
        assert_eq!(a, b);
        assert!(a.starts_with(ID_PREFIX));
    }

    #[test]
    fn test_each_field_contributes() {
        let base = event_id(slot(8, 8), slot(8, 9), "[Mo] MATH", "12");
        assert_ne!(base, event_id(slot(9, 8), slot(9, 9), "[Mo] MATH", "12"));
        assert_ne!(base, event_id(slot(8, 8), slot(8, 10), "[Mo] MATH", "12"));
        assert_ne!(base, event_id(slot(8, 8), slot(8, 9), "[Mo] PE", "12"));
        assert_ne!(base, event_id(slot(8, 8), slot(8, 9), "[Mo] MATH", "13"));
    }

    #[test]
    fn test_same_slot_in_another_week_differs() {
        let this_week = event_id(slot(8, 8), slot(8, 9), "[Mo] MATH", "12");
        let next_week = event_id(slot(15, 8), slot(15, 9), "[Mo] MATH", "12");
        assert_ne!(this_week, next_week);
    }

    /// Tiny deterministic generator, enough to spread quadruples around.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 16
        }
    }

    #[test]
    fn test_no_collisions_over_ten_thousand_quadruples() {
        let mut rng = Lcg(0x5eed);
        let base = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut seen = HashSet::new();

        for i in 0..10_000 {
            let day = (rng.next() % 365) as i64;
            let hour = (rng.next() % 12 + 8) as u32;
            let minute = (rng.next() % 60) as u32;
            let start = (base + Duration::days(day))
                .and_hms_opt(hour, minute, 0)
                .unwrap();
            let end = start + Duration::minutes((rng.next() % 180 + 30) as i64);
            // The loop index keeps every quadruple distinct by construction.
            let title = format!("SUBJECT {} {}", i, rng.next() % 100);
            let room = format!("{}", rng.next() % 300);

            let id = event_id(start, end, &title, &room);
            assert!(seen.insert(id), "collision at quadruple {}", i);
        }
    }
}
