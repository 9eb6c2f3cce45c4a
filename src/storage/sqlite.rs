use crate::model::{StorageError, UserRecord};
use chrono::Utc;
use rand::Rng;
use rusqlite::{params, Connection, Row};
use sha2::{Digest, Sha256};

pub struct UserStore {
    conn: Connection,
}

impl UserStore {
    /// Opens the user database, creating the schema when absent.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                salt TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self { conn })
    }

    /// Creates an account. Each user gets a fresh random salt; only the
    /// salted hash is stored.
    pub fn create_user(&self, username: &str, password: &str) -> Result<(), StorageError> {
        let salt: [u8; 16] = rand::rng().random();
        let hash = hash_password(&salt, password);

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO users (username, password_hash, salt, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![username, hash, to_hex(&salt), Utc::now()],
        )?;
        if inserted == 0 {
            return Err(StorageError::UsernameTaken);
        }
        Ok(())
    }

    /// Checks a username/password pair. Unknown users and wrong passwords
    /// both come back as `false`.
    pub fn verify_user(&self, username: &str, password: &str) -> Result<bool, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT password_hash, salt FROM users WHERE username = ?1")?;
        let mut rows = stmt.query(params![username])?;

        if let Some(row) = rows.next()? {
            let stored: String = row.get(0)?;
            let salt_hex: String = row.get(1)?;
            let Some(salt) = from_hex(&salt_hex) else {
                return Ok(false);
            };
            Ok(hash_password(&salt, password) == stored)
        } else {
            Ok(false)
        }
    }

    /// Returns all accounts, without hashes or salts.
    pub fn list_users(&self) -> Result<Vec<UserRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT username, created_at FROM users ORDER BY username ASC")?;

        let rows = stmt.query_map([], Self::map_user)?;
        let mut users = Vec::new();
        for user in rows {
            users.push(user?);
        }

        Ok(users)
    }

    fn map_user(row: &Row) -> Result<UserRecord, rusqlite::Error> {
        Ok(UserRecord {
            username: row.get(0)?,
            created_at: row.get(1)?,
        })
    }
}

fn hash_password(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}
