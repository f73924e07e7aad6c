//! Google Calendar provider for cartable.
//!
//! Owns the two secret files (`credentials.json`, `token.json`), the OAuth
//! consent and refresh flows, and the insert-or-update operation the
//! pipeline writes events through.

pub mod auth;
pub mod calendar;
pub mod config;
