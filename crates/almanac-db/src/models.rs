/// Database row types. These map directly to SQLite rows and are converted
/// into `almanac-types` models at the edge of this crate.
use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use almanac_types::time::STORAGE_FORMAT;
use almanac_types::{Account, Event};

pub struct AccountRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

impl AccountRow {
    pub fn to_account(&self) -> Result<Account> {
        Ok(Account {
            id: self
                .id
                .parse()
                .with_context(|| format!("corrupt account id '{}'", self.id))?,
            username: self.username.clone(),
            created_at: parse_stored(&self.created_at)?.and_utc(),
        })
    }
}

pub struct EventRow {
    pub id: i64,
    pub title: String,
    pub start_event: String,
    pub end_event: String,
    pub owner_id: String,
}

impl TryFrom<EventRow> for Event {
    type Error = anyhow::Error;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Event {
            id: row.id,
            start: parse_stored(&row.start_event)?,
            end: parse_stored(&row.end_event)?,
            owner_id: row
                .owner_id
                .parse()
                .with_context(|| format!("corrupt owner_id '{}' on event {}", row.owner_id, row.id))?,
            title: row.title,
        })
    }
}

// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
fn parse_stored(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, STORAGE_FORMAT)
        .with_context(|| format!("corrupt timestamp '{}'", raw))
}
