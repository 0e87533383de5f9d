use std::sync::Arc;

use almanac_db::Database;

use crate::state::{AppState, AppStateInner, SessionConfig};

pub fn temp_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("almanac.db")).unwrap();
    (dir, db)
}

/// State backed by a temp dir that also serves as the downloads directory.
pub fn test_state() -> (tempfile::TempDir, AppState) {
    let (dir, db) = temp_db();
    let state = Arc::new(AppStateInner {
        db,
        session: SessionConfig {
            secret: "test-session-secret".into(),
            ttl_days: 1,
            secure_cookies: false,
        },
        downloads_dir: dir.path().to_path_buf(),
    });
    (dir, state)
}
