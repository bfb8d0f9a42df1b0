//! Account Storage
//! Mission: Persist accounts and their role profiles with SQLite

use crate::auth::models::{Account, AdminProfile, NewProfile, Profile, Role, StudentProfile};
use crate::db::Database;
use crate::error::StoreError;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

/// Account storage on the shared dining database
#[derive(Clone)]
pub struct AccountStore {
    db: Database,
}

impl AccountStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create an account and its role profile as one unit.
    ///
    /// The duplicate check and both inserts share a transaction; returning
    /// early drops it uncommitted, which rolls back any partial write.
    pub fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        profile: &NewProfile,
    ) -> Result<(Account, Profile), StoreError> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )?;
        if exists {
            return Err(StoreError::DuplicateEmail);
        }

        let role = profile.role();
        let created_at = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO accounts (email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![email, password_hash, role, created_at],
        )?;
        let account_id = tx.last_insert_rowid();

        let stored = match profile {
            NewProfile::Student {
                name,
                student_roll,
                department,
                room_no,
                phone_number,
            } => {
                tx.execute(
                    "INSERT INTO students
                        (account_id, student_name, student_roll, department, room_no, phone_number, email_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![account_id, name, student_roll, department, room_no, phone_number, email],
                )?;
                Profile::Student(StudentProfile {
                    user_id: account_id,
                    student_name: name.clone(),
                    student_roll: student_roll.clone(),
                    department: department.clone(),
                    room_no: room_no.clone(),
                    phone_number: phone_number.clone(),
                    email_id: Some(email.to_string()),
                })
            }
            NewProfile::Admin {
                name,
                department,
                level,
            } => {
                tx.execute(
                    "INSERT INTO admins (account_id, admin_name, department, level)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![account_id, name, department, level],
                )?;
                Profile::Admin(AdminProfile {
                    user_id: account_id,
                    admin_name: name.clone(),
                    department: department.clone(),
                    level: level.clone(),
                })
            }
        };

        tx.commit()?;

        info!(account_id, email, role = role.as_str(), "Account created");

        let account = Account {
            id: account_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at,
        };
        Ok((account, stored))
    }

    /// Get account by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let conn = self.db.lock();

        let account = conn
            .query_row(
                "SELECT account_id, email, password_hash, role, created_at
                 FROM accounts WHERE email = ?1",
                params![email],
                account_from_row,
            )
            .optional()?;

        Ok(account)
    }

    /// Load the profile matching the account role; `Profile::Empty` when the row is missing
    pub fn load_profile(&self, account: &Account) -> Result<Profile, StoreError> {
        let conn = self.db.lock();

        let profile = match account.role {
            Role::Student => conn
                .query_row(
                    "SELECT account_id, student_name, student_roll, department, room_no, phone_number, email_id
                     FROM students WHERE account_id = ?1",
                    params![account.id],
                    |row| {
                        Ok(Profile::Student(StudentProfile {
                            user_id: row.get(0)?,
                            student_name: row.get(1)?,
                            student_roll: row.get(2)?,
                            department: row.get(3)?,
                            room_no: row.get(4)?,
                            phone_number: row.get(5)?,
                            email_id: row.get(6)?,
                        }))
                    },
                )
                .optional()?,
            Role::Admin => conn
                .query_row(
                    "SELECT account_id, admin_name, department, level
                     FROM admins WHERE account_id = ?1",
                    params![account.id],
                    |row| {
                        Ok(Profile::Admin(AdminProfile {
                            user_id: row.get(0)?,
                            admin_name: row.get(1)?,
                            department: row.get(2)?,
                            level: row.get(3)?,
                        }))
                    },
                )
                .optional()?,
        };

        Ok(profile.unwrap_or(Profile::Empty {}))
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
    })
}
