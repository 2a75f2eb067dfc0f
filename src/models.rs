use jiff::{civil::Date, tz::TimeZone};
use serde::Serialize;

use crate::{entities::movie, error::AppResult};

/// A movie joined with one user's watched entry.
#[derive(Clone, Debug, Serialize)]
pub struct WatchedMovie {
    pub movie: movie::Model,
    pub review: Option<String>,
    pub rating: Option<i32>,
}

/// A movie joined with one user's planned entry.
#[derive(Clone, Debug, Serialize)]
pub struct PlannedMovie {
    pub movie: movie::Model,
    pub expectation: Option<String>,
}

/// One user's review/rating for a movie.
#[derive(Clone, Debug, Serialize)]
pub struct MovieReview {
    pub username: String,
    pub review: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WatchOutcome {
    Recorded,
    AlreadyWatched,
}

/// Parses a `dd-mm-YYYY` release date to Unix seconds at local midnight.
pub fn parse_release_date(input: &str) -> AppResult<i64> {
    let date = Date::strptime("%d-%m-%Y", input.trim())?;
    let zoned = date.to_zoned(TimeZone::system())?;
    Ok(zoned.timestamp().as_second())
}

/// Renders a release timestamp as e.g. `Mar 05, 2025` in the local timezone.
pub fn format_release_date(ts: i64) -> String {
    match jiff::Timestamp::from_second(ts) {
        Ok(t) => t.to_zoned(TimeZone::system()).strftime("%b %d, %Y").to_string(),
        Err(_) => ts.to_string(),
    }
}
