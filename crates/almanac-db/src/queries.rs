use crate::Database;
use crate::models::{AccountRow, EventRow};
use almanac_types::time::format_timestamp;
use almanac_types::{Event, NewEvent};
use anyhow::Result;
use rusqlite::{Connection, Row};
use uuid::Uuid;

const EVENT_COLUMNS: &str = "id, title, start_event, end_event, owner_id";

impl Database {
    // -- Accounts --

    /// Inserts an account unless the username is already taken. Returns
    /// `false` on a username collision; the UNIQUE constraint decides, so
    /// concurrent registrations cannot both win.
    pub fn create_account(&self, id: &Uuid, username: &str, password_hash: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO accounts (id, username, password_hash) VALUES (?1, ?2, ?3)
                 ON CONFLICT(username) DO NOTHING",
                (id.to_string(), username, password_hash),
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_account_by_username(&self, username: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| query_account(conn, "username", username))
    }

    pub fn get_account_by_id(&self, id: &Uuid) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| query_account(conn, "id", &id.to_string()))
    }

    // -- Events --
    //
    // Every statement below carries `owner_id` in its predicate. There is no
    // unscoped lookup by event id.

    pub fn list_events(&self, owner_id: &Uuid) -> Result<Vec<Event>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id = ?1 ORDER BY id"
            ))?;

            let rows = stmt
                .query_map([owner_id.to_string()], event_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(Event::try_from).collect()
        })
    }

    /// Returns the id of the new event.
    pub fn insert_event(&self, owner_id: &Uuid, event: &NewEvent) -> Result<i64> {
        self.with_conn_mut(|conn| {
            insert_event_row(conn, owner_id, event)?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Rewrites an event the caller owns. Returns the number of rows touched;
    /// zero means the id does not exist or belongs to someone else.
    pub fn update_event(&self, owner_id: &Uuid, id: i64, event: &NewEvent) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE events SET title = ?1, start_event = ?2, end_event = ?3
                 WHERE id = ?4 AND owner_id = ?5",
                rusqlite::params![
                    event.title,
                    format_timestamp(&event.start),
                    format_timestamp(&event.end),
                    id,
                    owner_id.to_string(),
                ],
            )?;
            Ok(changed)
        })
    }

    pub fn delete_event(&self, owner_id: &Uuid, id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM events WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![id, owner_id.to_string()],
            )?;
            Ok(changed)
        })
    }

    pub fn delete_all_events(&self, owner_id: &Uuid) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let changed =
                conn.execute("DELETE FROM events WHERE owner_id = ?1", [owner_id.to_string()])?;
            Ok(changed)
        })
    }

    /// Inserts a batch of events in one transaction: either every row lands
    /// or none do.
    pub fn bulk_insert_events(&self, owner_id: &Uuid, events: &[NewEvent]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for event in events {
                insert_event_row(&tx, owner_id, event)?;
            }
            tx.commit()?;
            Ok(events.len())
        })
    }
}

fn query_account(conn: &Connection, column: &str, value: &str) -> Result<Option<AccountRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, password_hash, created_at FROM accounts WHERE {column} = ?1"
    ))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(AccountRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn insert_event_row(conn: &Connection, owner_id: &Uuid, event: &NewEvent) -> Result<()> {
    conn.execute(
        "INSERT INTO events (title, start_event, end_event, owner_id) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            event.title,
            format_timestamp(&event.start),
            format_timestamp(&event.end),
            owner_id.to_string(),
        ],
    )?;
    Ok(())
}

fn event_row(row: &Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        title: row.get(1)?,
        start_event: row.get(2)?,
        end_event: row.get(3)?,
        owner_id: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::open_temp;
    use almanac_types::time::parse_form_timestamp;

    fn new_event(title: &str, start: &str, end: &str) -> NewEvent {
        NewEvent {
            title: title.into(),
            start: parse_form_timestamp(start).unwrap(),
            end: parse_form_timestamp(end).unwrap(),
        }
    }

    fn account(db: &Database, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        assert!(db.create_account(&id, username, "hash").unwrap());
        id
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let (_dir, db) = open_temp();
        account(&db, "alice");

        let inserted = db.create_account(&Uuid::new_v4(), "alice", "other").unwrap();
        assert!(!inserted);
    }

    #[test]
    fn account_lookups() {
        let (_dir, db) = open_temp();
        let id = account(&db, "alice");

        let by_name = db.get_account_by_username("alice").unwrap().unwrap();
        assert_eq!(by_name.id, id.to_string());
        assert_eq!(by_name.password_hash, "hash");

        let by_id = db.get_account_by_id(&id).unwrap().unwrap().to_account().unwrap();
        assert_eq!(by_id.username, "alice");

        assert!(db.get_account_by_username("bob").unwrap().is_none());
        assert!(db.get_account_by_id(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn insert_then_list_round_trips() {
        let (_dir, db) = open_temp();
        let owner = account(&db, "alice");

        let id = db
            .insert_event(&owner, &new_event("Meeting", "2024-01-01 09:00:00", "2024-01-01 10:00:00"))
            .unwrap();

        let events = db.list_events(&owner).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, id);
        assert_eq!(events[0].title, "Meeting");
        assert_eq!(format_timestamp(&events[0].start), "2024-01-01 09:00:00");
        assert_eq!(format_timestamp(&events[0].end), "2024-01-01 10:00:00");
        assert_eq!(events[0].owner_id, owner);
    }

    #[test]
    fn list_is_ordered_by_id() {
        let (_dir, db) = open_temp();
        let owner = account(&db, "alice");

        for title in ["late", "early", "middle"] {
            db.insert_event(&owner, &new_event(title, "2024-01-01", "2024-01-02"))
                .unwrap();
        }

        let titles: Vec<_> = db
            .list_events(&owner)
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["late", "early", "middle"]);
    }

    #[test]
    fn other_owners_cannot_touch_events() {
        let (_dir, db) = open_temp();
        let alice = account(&db, "alice");
        let bob = account(&db, "bob");

        let bobs = db
            .insert_event(&bob, &new_event("Dentist", "2024-02-01 08:00:00", "2024-02-01 09:00:00"))
            .unwrap();

        let hijack = new_event("Hijacked", "2024-02-01 08:00:00", "2024-02-01 09:00:00");
        assert_eq!(db.update_event(&alice, bobs, &hijack).unwrap(), 0);
        assert_eq!(db.delete_event(&alice, bobs).unwrap(), 0);

        let remaining = db.list_events(&bob).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "Dentist");
        assert!(db.list_events(&alice).unwrap().is_empty());
    }

    #[test]
    fn owner_can_update() {
        let (_dir, db) = open_temp();
        let owner = account(&db, "alice");
        let id = db
            .insert_event(&owner, &new_event("Draft", "2024-01-01 09:00:00", "2024-01-01 10:00:00"))
            .unwrap();

        let changed = db
            .update_event(&owner, id, &new_event("Final", "2024-01-02 11:00:00", "2024-01-02 12:30:00"))
            .unwrap();
        assert_eq!(changed, 1);

        let events = db.list_events(&owner).unwrap();
        assert_eq!(events[0].title, "Final");
        assert_eq!(format_timestamp(&events[0].end), "2024-01-02 12:30:00");
    }

    #[test]
    fn delete_twice_is_a_no_op() {
        let (_dir, db) = open_temp();
        let owner = account(&db, "alice");
        let id = db
            .insert_event(&owner, &new_event("Once", "2024-01-01", "2024-01-02"))
            .unwrap();

        assert_eq!(db.delete_event(&owner, id).unwrap(), 1);
        assert_eq!(db.delete_event(&owner, id).unwrap(), 0);
    }

    #[test]
    fn delete_all_leaves_other_owners_alone() {
        let (_dir, db) = open_temp();
        let alice = account(&db, "alice");
        let bob = account(&db, "bob");

        for _ in 0..3 {
            db.insert_event(&alice, &new_event("a", "2024-01-01", "2024-01-02"))
                .unwrap();
        }
        db.insert_event(&bob, &new_event("b", "2024-01-01", "2024-01-02"))
            .unwrap();

        assert_eq!(db.delete_all_events(&alice).unwrap(), 3);
        assert!(db.list_events(&alice).unwrap().is_empty());
        assert_eq!(db.list_events(&bob).unwrap().len(), 1);
    }

    #[test]
    fn bulk_insert_is_atomic() {
        let (_dir, db) = open_temp();
        let owner = account(&db, "alice");

        let batch = vec![
            new_event("Standup", "2024-03-01 09:00:00", "2024-03-01 09:15:00"),
            new_event("Review", "2024-03-01 14:00:00", "2024-03-01 15:00:00"),
        ];
        assert_eq!(db.bulk_insert_events(&owner, &batch).unwrap(), 2);
        assert_eq!(db.list_events(&owner).unwrap().len(), 2);

        // A trigger fails the second row; the first must not survive it.
        db.with_conn_mut(|conn| {
            conn.execute_batch(
                "CREATE TEMP TRIGGER reject_boom BEFORE INSERT ON events
                 WHEN NEW.title = 'boom'
                 BEGIN SELECT RAISE(ABORT, 'boom'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        let poisoned = vec![
            new_event("Lands first", "2024-03-02 09:00:00", "2024-03-02 10:00:00"),
            new_event("boom", "2024-03-02 11:00:00", "2024-03-02 12:00:00"),
        ];
        assert!(db.bulk_insert_events(&owner, &poisoned).is_err());

        let titles: Vec<_> = db
            .list_events(&owner)
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["Standup", "Review"]);
    }
}
