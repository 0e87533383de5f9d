use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated identity. Handlers receive this from the session
/// middleware; the password hash never leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A schedule entry owned by exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub owner_id: Uuid,
}

/// Event fields as supplied by a caller, before an id or owner is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl NewEvent {
    /// `start < end` is not required; callers only get told about it.
    pub fn is_inverted(&self) -> bool {
        self.start >= self.end
    }
}

pub fn is_owner(account: &Account, event: &Event) -> bool {
    account.id == event.owner_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_form_timestamp;

    fn account(id: Uuid) -> Account {
        Account {
            id,
            username: "alice".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_check_compares_ids() {
        let alice = account(Uuid::new_v4());
        let bob = account(Uuid::new_v4());
        let event = Event {
            id: 1,
            title: "Standup".into(),
            start: parse_form_timestamp("2024-03-01 09:00:00").unwrap(),
            end: parse_form_timestamp("2024-03-01 09:15:00").unwrap(),
            owner_id: alice.id,
        };

        assert!(is_owner(&alice, &event));
        assert!(!is_owner(&bob, &event));
    }

    #[test]
    fn inverted_range_is_detected() {
        let event = NewEvent {
            title: "Backwards".into(),
            start: parse_form_timestamp("2024-03-01 10:00:00").unwrap(),
            end: parse_form_timestamp("2024-03-01 09:00:00").unwrap(),
        };
        assert!(event.is_inverted());
    }
}
