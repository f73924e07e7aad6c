//! Portal vocabulary and selector tables.
//!
//! Every DOM lookup the portal driver performs is an ordered fallback
//! probe: selectors are tried in sequence and the first one matching at
//! least one element wins. Keeping the lists here, as data, lets a
//! deployment swap them when the portal renames a control, without touching
//! the navigation code. Entries starting with `//` are XPath, everything
//! else is CSS.

use regex::Regex;

/// Regional vocabulary and DOM probe tables for one portal deployment.
#[derive(Debug, Clone)]
pub struct Locale {
    room_pattern: Regex,
    teacher_pattern: Regex,
    pub selectors: Selectors,
}

/// Ordered selector fallback lists for every probe the driver performs.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub username: Vec<String>,
    pub password: Vec<String>,
    pub submit: Vec<String>,
    /// Links from the SSO portal into the timetable application.
    pub timetable_link: Vec<String>,
    /// The localised "school life" tab inside the timetable application.
    pub school_life_tab: Vec<String>,
    pub next_week: Vec<String>,
    pub week_banner: Vec<String>,
    /// Attributes carrying a cell's day column, checked on the cell and its
    /// ancestors.
    pub day_index_attributes: Vec<String>,
}

impl Locale {
    /// Build a locale from its room/teacher vocabulary.
    ///
    /// Words must be plain word characters; they are escaped before being
    /// assembled, so the patterns always compile.
    pub fn new(room_words: &[&str], teacher_words: &[&str], selectors: Selectors) -> Self {
        let room = escaped_alternation(room_words);
        let teacher = escaped_alternation(teacher_words);
        Self {
            room_pattern: Regex::new(&format!(r"(?i)\b(?:{room})\b\s*:?\s*([^—–]+)"))
                .expect("escaped vocabulary always compiles"),
            teacher_pattern: Regex::new(&format!(r"(?i)\b(?:{teacher})\b"))
                .expect("escaped vocabulary always compiles"),
            selectors,
        }
    }

    /// The French regional portal profile.
    pub fn french() -> Self {
        Self::new(
            &["salle", "room"],
            &["professeur", "prof", "enseignant", "teacher", "avec"],
            Selectors::french(),
        )
    }

    /// Matches a room annotation, capturing the room phrase.
    pub fn room_pattern(&self) -> &Regex {
        &self.room_pattern
    }

    /// Matches the start of a trailing teacher annotation.
    pub fn teacher_pattern(&self) -> &Regex {
        &self.teacher_pattern
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::french()
    }
}

fn escaped_alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

impl Selectors {
    /// Probe lists for the French regional portal.
    pub fn french() -> Self {
        Self {
            username: list(&[
                "input[name='email']",
                "input[name='username']",
                "input[name='user']",
                "#username",
                "input[type='email']",
                "input[type='text']",
            ]),
            password: list(&[
                "input[name='password']",
                "#password",
                "input[type='password']",
            ]),
            submit: list(&[
                "button[type='submit']",
                "input[type='submit']",
                "//button[contains(., 'Se connecter')]",
                "//button[contains(., 'Connexion')]",
            ]),
            timetable_link: list(&[
                "a[href*='vie-scolaire']",
                "a[title*='Vie Scolaire']",
                "//a[contains(., 'Vie Scolaire')]",
                "//a[contains(., 'vie scolaire')]",
            ]),
            school_life_tab: list(&[
                "[title='Vie scolaire']",
                "//a[contains(., 'Vie scolaire')]",
                "//span[contains(., 'Vie scolaire')]",
                "//li[contains(., 'Vie scolaire')]",
            ]),
            next_week: list(&[
                "[title='Semaine suivante']",
                "[aria-label='Semaine suivante']",
                "button.fc-next-button",
                "//button[contains(., '›')]",
            ]),
            week_banner: list(&[
                ".fc-toolbar-title",
                "#titrePeriode",
                ".titre-periode",
                "//h2[contains(., 'Semaine')]",
            ]),
            day_index_attributes: list(&[
                "data-day",
                "data-day-index",
                "data-col-index",
                "data-jour",
            ]),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self::french()
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
