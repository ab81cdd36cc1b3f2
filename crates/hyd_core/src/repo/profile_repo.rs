//! Key-value profile persistence.
//!
//! # Responsibility
//! - Persist one row per profile field in `profile_kv`.
//! - Hide SQLite value typing behind `ProfileValue`.
//!
//! # Invariants
//! - Keys are the fixed constants in `keys`; unknown keys are never written
//!   by core code.
//! - `set` is an upsert; the last write wins.

use crate::repo::reminder_repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};

/// Field keys stored in `profile_kv`.
pub mod keys {
    pub const USER_NAME: &str = "user_name";
    pub const USER_POINTS: &str = "user_points";
    pub const PROFILE_IMAGE: &str = "profile_image";
    pub const TODAY_MOOD: &str = "today_mood";
    pub const LAST_LOGIN_DATE: &str = "last_login_date";
}

/// Typed value for one profile field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValue {
    Text(String),
    Integer(i64),
    Bytes(Vec<u8>),
}

impl ProfileValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(value) => Some(value),
            _ => None,
        }
    }

    fn into_sql(self) -> Value {
        match self {
            Self::Text(value) => Value::Text(value),
            Self::Integer(value) => Value::Integer(value),
            Self::Bytes(value) => Value::Blob(value),
        }
    }

    fn from_sql(key: &str, value: Value) -> RepoResult<Self> {
        match value {
            Value::Text(value) => Ok(Self::Text(value)),
            Value::Integer(value) => Ok(Self::Integer(value)),
            Value::Blob(value) => Ok(Self::Bytes(value)),
            other => Err(RepoError::InvalidData(format!(
                "unsupported value {other:?} in profile_kv.{key}"
            ))),
        }
    }
}

/// Explicit load/save contract for profile fields.
pub trait ProfileStore {
    fn get(&self, key: &str) -> RepoResult<Option<ProfileValue>>;
    fn set(&self, key: &str, value: ProfileValue) -> RepoResult<()>;
    fn remove(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed profile store.
pub struct SqliteProfileStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileStore for SqliteProfileStore<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<ProfileValue>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM profile_kv WHERE key = ?1;",
                [key],
                |row| row.get::<_, Value>(0),
            )
            .optional()?;

        value
            .map(|value| ProfileValue::from_sql(key, value))
            .transpose()
    }

    fn set(&self, key: &str, value: ProfileValue) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO profile_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value.into_sql()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM profile_kv WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{keys, ProfileStore, ProfileValue, SqliteProfileStore};
    use crate::db::open_db_in_memory;

    #[test]
    fn set_overwrites_and_remove_clears() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteProfileStore::new(&conn);

        assert_eq!(store.get(keys::USER_NAME).unwrap(), None);
        store
            .set(keys::USER_NAME, ProfileValue::Text("Ana".to_string()))
            .unwrap();
        store
            .set(keys::USER_NAME, ProfileValue::Text("Vlad".to_string()))
            .unwrap();
        assert_eq!(
            store.get(keys::USER_NAME).unwrap(),
            Some(ProfileValue::Text("Vlad".to_string()))
        );

        store.remove(keys::USER_NAME).unwrap();
        assert_eq!(store.get(keys::USER_NAME).unwrap(), None);
    }

    #[test]
    fn values_keep_their_storage_type() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteProfileStore::new(&conn);

        store
            .set(keys::USER_POINTS, ProfileValue::Integer(42))
            .unwrap();
        store
            .set(keys::PROFILE_IMAGE, ProfileValue::Bytes(vec![0, 159, 255]))
            .unwrap();

        assert_eq!(
            store.get(keys::USER_POINTS).unwrap().unwrap().as_integer(),
            Some(42)
        );
        assert_eq!(
            store
                .get(keys::PROFILE_IMAGE)
                .unwrap()
                .unwrap()
                .into_bytes(),
            Some(vec![0, 159, 255])
        );
    }
}
