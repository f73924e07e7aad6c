//! Portal scraping for the cartable ecosystem.
//!
//! Drives a WebDriver-controlled browser through the regional SSO entry
//! point into the nested timetable application, and extracts the rendered
//! weekly grid. The WebDriver endpoint itself (chromedriver or
//! geckodriver) is expected to be running already; starting it is the
//! bootstrap step's job.

pub mod driver;
pub mod grid;
pub mod session;
