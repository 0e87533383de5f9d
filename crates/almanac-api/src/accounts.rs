use std::sync::LazyLock;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::info;
use uuid::Uuid;

use almanac_db::Database;
use almanac_types::Account;

use crate::error::{ApiError, ApiResult};

/// Verified against when the username is unknown, so a miss costs the same
/// argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("almanac-unknown-account").ok());

/// Registration and credential checks on top of the accounts table.
pub struct AccountStore<'a> {
    db: &'a Database,
}

impl<'a> AccountStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn register(&self, username: &str, password: &str, confirm_password: &str) -> ApiResult<()> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::validation("Username and password are required"));
        }
        if password != confirm_password {
            return Err(ApiError::validation("Password does not match"));
        }

        let password_hash = hash_password(password)?;
        let id = Uuid::new_v4();

        if !self.db.create_account(&id, username, &password_hash)? {
            return Err(ApiError::conflict("Account already exists"));
        }

        info!("Registered account '{}' ({})", username, id);
        Ok(())
    }

    /// Returns the account only when both the username and the password
    /// match. Callers cannot tell which of the two was wrong.
    pub fn authenticate(&self, username: &str, password: &str) -> ApiResult<Option<Account>> {
        let Some(row) = self.db.get_account_by_username(username)? else {
            if let Some(parsed) = DUMMY_HASH.as_deref().and_then(|h| PasswordHash::new(h).ok()) {
                let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
            }
            return Ok(None);
        };

        let parsed_hash = PasswordHash::new(&row.password_hash)
            .map_err(|e| anyhow!("corrupt password hash for '{}': {}", username, e))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Ok(None);
        }

        Ok(Some(row.to_account()?))
    }

    pub fn find_by_username(&self, username: &str) -> ApiResult<Option<Account>> {
        let row = self.db.get_account_by_username(username)?;
        Ok(row.map(|r| r.to_account()).transpose()?)
    }

    pub fn find_by_id(&self, id: &Uuid) -> ApiResult<Option<Account>> {
        let row = self.db.get_account_by_id(id)?;
        Ok(row.map(|r| r.to_account()).transpose()?)
    }
}

fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_db;

    #[test]
    fn register_then_authenticate() {
        let (_dir, db) = temp_db();
        let accounts = AccountStore::new(&db);

        accounts.register("alice", "hunter22", "hunter22").unwrap();

        let account = accounts.authenticate("alice", "hunter22").unwrap().unwrap();
        assert_eq!(account.username, "alice");
        assert!(accounts.authenticate("alice", "hunter23").unwrap().is_none());
        assert!(accounts.authenticate("mallory", "hunter22").unwrap().is_none());
    }

    #[test]
    fn password_is_not_stored_in_plaintext() {
        let (_dir, db) = temp_db();
        AccountStore::new(&db)
            .register("alice", "hunter22", "hunter22")
            .unwrap();

        let row = db.get_account_by_username("alice").unwrap().unwrap();
        assert_ne!(row.password_hash, "hunter22");
        assert!(row.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let (_dir, db) = temp_db();
        let accounts = AccountStore::new(&db);

        let err = accounts.register("alice", "hunter22", "hunter2").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(accounts.find_by_username("alice").unwrap().is_none());
    }

    #[test]
    fn second_registration_conflicts() {
        let (_dir, db) = temp_db();
        let accounts = AccountStore::new(&db);

        accounts.register("alice", "first-pass", "first-pass").unwrap();
        let err = accounts
            .register("alice", "second-pass", "second-pass")
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        // The original credentials still win
        assert!(accounts.authenticate("alice", "first-pass").unwrap().is_some());
        assert!(accounts.authenticate("alice", "second-pass").unwrap().is_none());
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let (_dir, db) = temp_db();
        let accounts = AccountStore::new(&db);

        assert!(matches!(
            accounts.register("  ", "pw", "pw").unwrap_err(),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            accounts.register("alice", "", "").unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn find_by_id_matches_find_by_username() {
        let (_dir, db) = temp_db();
        let accounts = AccountStore::new(&db);
        accounts.register("alice", "pw", "pw").unwrap();

        let by_name = accounts.find_by_username("alice").unwrap().unwrap();
        let by_id = accounts.find_by_id(&by_name.id).unwrap().unwrap();
        assert_eq!(by_name, by_id);
        assert!(accounts.find_by_id(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn unknown_username_still_runs_a_verification() {
        let dummy = DUMMY_HASH.as_deref().expect("dummy hash");
        let parsed = PasswordHash::new(dummy).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");

        let (_dir, db) = temp_db();
        let accounts = AccountStore::new(&db);
        assert!(accounts
            .authenticate("nobody", "almanac-unknown-account")
            .unwrap()
            .is_none());
    }
}
