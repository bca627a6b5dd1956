//! Identity store: registration, login, and token-based user lookup.
//!
//! Users live as rows in a remote worksheet. Registration is check-then-act
//! (a column lookup followed by an append) because the backend offers no
//! atomic insert; concurrent registrations of the same id can in principle
//! both pass the check, and duplicates are then detected on later logins by
//! the first-match lookup. Passwords are stored as a fixed-length SHA-256
//! hex digest, never reversibly.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{instrument, warn};

use resale_core::{User, UserId, UserInfo};

use crate::sheets::{Row, SheetsError, TableHandle, TableStore};

/// Minimum password length, re-validated here even though the UI enforces it.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Header of the users worksheet, in column order.
pub const USERS_HEADER: [&str; 8] = [
    "user_id", "password", "name", "phone", "address", "zipcode", "line_id", "created_at",
];

/// Timestamp format used for server-assigned `created_at` cells.
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration with an already existing user id.
    #[error("user id already exists")]
    DuplicateId,

    /// Login or lookup for an unknown user id.
    #[error("user not found")]
    UserNotFound,

    /// Login with a password whose digest does not match.
    #[error("wrong password")]
    WrongPassword,

    /// Malformed registration input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Remote table backend failed.
    #[error("backend error: {0}")]
    Backend(#[from] SheetsError),
}

/// Registration input, validated by [`IdentityStore::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub zip_code: String,
    pub line_id: Option<String>,
}

/// Manages user records and credential verification over a table store.
pub struct IdentityStore<T> {
    store: T,
    spreadsheet: String,
    table: String,
}

impl<T: TableStore> IdentityStore<T> {
    /// Create an identity store over the given backend and worksheet names.
    #[must_use]
    pub fn new(store: T, spreadsheet: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            store,
            spreadsheet: spreadsheet.into(),
            table: table.into(),
        }
    }

    /// Register a new account.
    ///
    /// The password is digested before storage and `created_at` is assigned
    /// from `now`, never taken from the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for malformed input,
    /// [`AuthError::DuplicateId`] when the id is taken, and
    /// [`AuthError::Backend`] when the backend cannot be reached.
    #[instrument(skip(self, registration, now), fields(user_id = %registration.user_id))]
    pub async fn register(
        &self,
        registration: &Registration,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let user_id = UserId::parse(&registration.user_id)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        validate_registration(registration)?;

        let table = self.table().await?;

        // Duplicate check via a column lookup; see the module docs for the
        // check-then-act caveat.
        if self
            .store
            .find_cell_in_column(&table, 1, user_id.as_str())
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateId);
        }

        let row: Row = vec![
            user_id.into_inner(),
            hash_password(&registration.password),
            registration.name.trim().to_owned(),
            registration.phone.trim().to_owned(),
            registration.address.trim().to_owned(),
            registration.zip_code.trim().to_owned(),
            registration.line_id.clone().unwrap_or_default(),
            now.format(CREATED_AT_FORMAT).to_string(),
        ];
        self.store.append_row(&table, &row).await?;
        Ok(())
    }

    /// Verify credentials and return the reduced user view.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`], [`AuthError::WrongPassword`], or
    /// [`AuthError::Backend`].
    #[instrument(skip(self, password), fields(user_id = %user_id))]
    pub async fn login(&self, user_id: &str, password: &str) -> Result<UserInfo, AuthError> {
        let user = self.find_user(user_id).await?;
        if hash_password(password) != user.password_hash {
            return Err(AuthError::WrongPassword);
        }
        Ok(UserInfo {
            user_id: user.user_id,
            name: user.name,
            phone: user.phone,
        })
    }

    /// Look a user up by id, for resolving a session back to an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] or [`AuthError::Backend`].
    pub async fn get_user_info(&self, user_id: &UserId) -> Result<UserInfo, AuthError> {
        let user = self.find_user(user_id.as_str()).await?;
        Ok(UserInfo {
            user_id: user.user_id,
            name: user.name,
            phone: user.phone,
        })
    }

    async fn table(&self) -> Result<TableHandle, SheetsError> {
        self.store
            .ensure_table(&self.spreadsheet, &self.table, &USERS_HEADER)
            .await
    }

    async fn find_user(&self, user_id: &str) -> Result<User, AuthError> {
        let table = self.table().await?;
        let rows = self.store.read_all_rows(&table).await?;

        rows.iter()
            .skip(1) // header
            .find(|row| row.first().map(String::as_str) == Some(user_id))
            .and_then(user_from_row)
            .ok_or(AuthError::UserNotFound)
    }
}

/// Digest a password to its stored fixed-length hex form.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn validate_registration(registration: &Registration) -> Result<(), AuthError> {
    if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    for (label, value) in [
        ("name", &registration.name),
        ("phone", &registration.phone),
        ("address", &registration.address),
        ("zipcode", &registration.zip_code),
    ] {
        if value.trim().is_empty() {
            return Err(AuthError::Validation(format!("{label} is required")));
        }
    }
    Ok(())
}

/// Materialize a user row; malformed rows are skipped with a warning, not
/// surfaced as errors.
fn user_from_row(row: &Row) -> Option<User> {
    let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("").trim();

    let user_id = match UserId::parse(cell(0)) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "skipping malformed user row");
            return None;
        }
    };

    let line_id = match cell(6) {
        "" => None,
        other => Some(other.to_owned()),
    };

    let created_at = chrono::NaiveDateTime::parse_from_str(cell(7), CREATED_AT_FORMAT)
        .map_or(DateTime::<Utc>::MIN_UTC, |dt| dt.and_utc());

    Some(User {
        user_id,
        password_hash: cell(1).to_owned(),
        name: cell(2).to_owned(),
        phone: cell(3).to_owned(),
        address: cell(4).to_owned(),
        zip_code: cell(5).to_owned(),
        line_id,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::MemoryTableStore;

    fn registration(user_id: &str) -> Registration {
        Registration {
            user_id: user_id.to_owned(),
            password: "correct horse".to_owned(),
            name: "Alice".to_owned(),
            phone: "010-1234-5678".to_owned(),
            address: "Seoul".to_owned(),
            zip_code: "04524".to_owned(),
            line_id: None,
        }
    }

    fn store() -> IdentityStore<MemoryTableStore> {
        IdentityStore::new(MemoryTableStore::new(), "상품목록", "고객정보")
    }

    #[tokio::test]
    async fn register_then_login() {
        let identity = store();
        identity
            .register(&registration("alice"), Utc::now())
            .await
            .unwrap();

        let info = identity.login("alice", "correct horse").await.unwrap();
        assert_eq!(info.user_id.as_str(), "alice");
        assert_eq!(info.name, "Alice");

        // Stored row carries the digest, not the password.
        let rows = identity.store.rows("고객정보");
        assert_eq!(rows[1][1], hash_password("correct horse"));
        assert_ne!(rows[1][1], "correct horse");
        assert_eq!(rows[1][1].len(), 64);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let identity = store();
        identity
            .register(&registration("alice"), Utc::now())
            .await
            .unwrap();

        let err = identity
            .register(&registration("alice"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateId));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user() {
        let identity = store();
        identity
            .register(&registration("alice"), Utc::now())
            .await
            .unwrap();

        assert!(matches!(
            identity.login("alice", "wrong password").await,
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            identity.login("bob", "whatever").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn short_password_fails_validation() {
        let identity = store();
        let mut reg = registration("alice");
        reg.password = "short".to_owned();
        assert!(matches!(
            identity.register(&reg, Utc::now()).await,
            Err(AuthError::Validation(_))
        ));

        let mut reg = registration("bob");
        reg.phone = "  ".to_owned();
        assert!(matches!(
            identity.register(&reg, Utc::now()).await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn get_user_info_resolves_by_id() {
        let identity = store();
        identity
            .register(&registration("alice"), Utc::now())
            .await
            .unwrap();

        let id = UserId::parse("alice").unwrap();
        let info = identity.get_user_info(&id).await.unwrap();
        assert_eq!(info.phone, "010-1234-5678");

        let missing = UserId::parse("carol").unwrap();
        assert!(matches!(
            identity.get_user_info(&missing).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[test]
    fn digest_is_stable_and_hex() {
        let digest = hash_password("password123");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_password("password123"));
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(digest, hash_password("password124"));
    }
}
