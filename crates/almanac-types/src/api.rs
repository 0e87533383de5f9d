use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Event;

// -- Session --

/// Claims carried in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth forms --

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

// -- Event forms --

/// Body of `POST /insert`. Timestamps stay raw until the handler parses them.
#[derive(Debug, Deserialize)]
pub struct InsertEventForm {
    pub title: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventForm {
    pub id: i64,
    pub title: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteEventForm {
    pub id: i64,
}

/// One row of an import file. Column names match the spreadsheet template.
#[derive(Debug, Deserialize)]
pub struct ImportRow {
    pub title: String,
    pub start_event: String,
    pub end_event: String,
}

// -- Calendar feed --

/// Shape the calendar widget consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    #[serde(with = "crate::time::storage_format")]
    pub start: NaiveDateTime,
    #[serde(with = "crate::time::storage_format")]
    pub end: NaiveDateTime,
}

impl From<&Event> for EventResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            start: event.start,
            end: event.end,
        }
    }
}

/// Status string returned by the AJAX endpoints.
pub const SUCCESS: &str = "Success!";
