//! SQLite Storage Handle
//! Mission: One explicitly constructed connection, passed into every store
//!
//! Stores never open their own connections. `main` builds a `Database`
//! from the configured path and tests build one in memory.

use anyhow::{Context, Result};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, OpenFlags};
use std::sync::Arc;
use tracing::{info, warn};

/// Schema for accounts, role profiles, meals and feedback
const SCHEMA_SQL: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('student', 'admin')),
    created_at TEXT NOT NULL
);

-- One profile row per account, in the table matching the account role
CREATE TABLE IF NOT EXISTS students (
    account_id INTEGER PRIMARY KEY REFERENCES accounts(account_id) ON DELETE CASCADE,
    student_name TEXT NOT NULL,
    student_roll TEXT,
    department TEXT,
    room_no TEXT,
    phone_number TEXT,
    email_id TEXT
);

CREATE TABLE IF NOT EXISTS admins (
    account_id INTEGER PRIMARY KEY REFERENCES accounts(account_id) ON DELETE CASCADE,
    admin_name TEXT NOT NULL,
    department TEXT,
    level TEXT
);

CREATE TABLE IF NOT EXISTS meals (
    meal_id INTEGER PRIMARY KEY AUTOINCREMENT,
    meal_name TEXT NOT NULL,
    meal_type TEXT NOT NULL,
    meal_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_meals_date_type
    ON meals(meal_date, meal_type);

CREATE TABLE IF NOT EXISTS feedback (
    feedback_id INTEGER PRIMARY KEY AUTOINCREMENT,
    meal_id INTEGER NOT NULL REFERENCES meals(meal_id) ON DELETE CASCADE,
    student_id INTEGER NOT NULL REFERENCES accounts(account_id),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comments TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_feedback_meal
    ON feedback(meal_id);

CREATE INDEX IF NOT EXISTS idx_feedback_student
    ON feedback(student_id, feedback_id DESC);
"#;

/// Shared handle to the dining database
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `db_path` and apply the schema
    pub fn open(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // locking handled by the Mutex below

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .context("Failed to apply journal pragmas")?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap_or_default();
        if journal_mode.to_lowercase() != "wal" {
            warn!(journal_mode = %journal_mode, "WAL mode not active");
        }

        let db = Self::init(conn)?;
        info!(path = db_path, "Dining database ready");
        Ok(db)
    }

    /// Fresh private database, used by tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Exclusive access to the connection for the duration of the guard
    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Round-trip a trivial query; returns the database clock
    pub fn ping(&self) -> rusqlite::Result<String> {
        self.lock()
            .query_row("SELECT datetime('now')", [], |row| row.get(0))
    }
}
