//! User ledger: the `users` table as an accumulator of win/loss counters,
//! admin flags and credentials.

use crate::auth::password;
use crate::errors::{Error, Result};
use crate::store::models::users::UserRow;
use crate::store::repository::TableRepository;
use tracing::instrument;
use uuid::Uuid;

/// Minimum accepted username length at registration
const MIN_USERNAME_LEN: usize = 3;

pub struct Users<'r> {
    repo: &'r TableRepository,
}

impl<'r> Users<'r> {
    pub fn new(repo: &'r TableRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<UserRow>> {
        Ok(self.repo.read_table().await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        Ok(self.list().await?.into_iter().find(|u| u.id == id))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        Ok(self.list().await?.into_iter().find(|u| u.username == username))
    }

    /// Create an account. `credential` is the already-hashed token.
    ///
    /// Uniqueness is case-sensitive here; only credential updates compare
    /// case-insensitively.
    #[instrument(skip(self, credential), err)]
    pub async fn register(&self, username: &str, credential: &str) -> Result<UserRow> {
        if username.len() < MIN_USERNAME_LEN {
            return Err(Error::Validation {
                message: format!("username must be at least {MIN_USERNAME_LEN} characters"),
            });
        }

        let mut rows: Vec<UserRow> = self.repo.read_table().await?;
        if rows.iter().any(|u| u.username == username) {
            return Err(Error::Conflict {
                message: "username already exists".to_string(),
            });
        }

        let user = UserRow::new(Uuid::new_v4().to_string(), username.to_string(), credential.to_string());
        rows.push(user.clone());
        self.repo.write_table(&rows).await?;

        Ok(user)
    }

    /// Verify a username/password pair against the stored credential.
    #[instrument(skip(self, password), err)]
    pub async fn login(&self, username: &str, password: &str) -> Result<UserRow> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::Unauthenticated {
                message: "invalid username or password".to_string(),
            })?;

        // Key derivation is CPU-bound; keep it off the async runtime
        let plain = password.to_string();
        let stored = user.password.clone();
        let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&plain, &stored))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password verification task: {e}"),
            })?;

        if !is_valid {
            return Err(Error::Unauthenticated {
                message: "invalid username or password".to_string(),
            });
        }

        Ok(user)
    }

    /// Change username and/or credential.
    ///
    /// Username collisions are checked case-insensitively against every
    /// other user. `new_credential` is the already-hashed token.
    #[instrument(skip(self, new_credential), err)]
    pub async fn update_credentials(
        &self,
        user_id: &str,
        new_username: Option<&str>,
        new_credential: Option<&str>,
    ) -> Result<UserRow> {
        let mut rows: Vec<UserRow> = self.repo.read_table().await?;

        let idx = rows
            .iter()
            .position(|u| u.id == user_id)
            .ok_or_else(|| Error::NotFound {
                resource: "user",
                id: user_id.to_string(),
            })?;

        if let Some(new_username) = new_username {
            let collides = rows
                .iter()
                .enumerate()
                .any(|(i, u)| i != idx && u.username.eq_ignore_ascii_case(new_username));
            if collides {
                return Err(Error::Conflict {
                    message: "username already in use".to_string(),
                });
            }
            rows[idx].username = new_username.to_string();
        }
        if let Some(new_credential) = new_credential {
            rows[idx].password = new_credential.to_string();
        }

        let updated = rows[idx].clone();
        self.repo.write_table(&rows).await?;

        Ok(updated)
    }

    /// Set or clear a user's admin flag.
    #[instrument(skip(self), err)]
    pub async fn set_admin(&self, user_id: &str, is_admin: bool) -> Result<UserRow> {
        let mut rows: Vec<UserRow> = self.repo.read_table().await?;

        let row = rows
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| Error::NotFound {
                resource: "user",
                id: user_id.to_string(),
            })?;
        row.is_admin = is_admin;

        let updated = row.clone();
        self.repo.write_table(&rows).await?;

        Ok(updated)
    }

    /// Zero the win/loss counters of every user. Returns how many rows were written.
    #[instrument(skip(self), err)]
    pub async fn reset_all_counters(&self) -> Result<usize> {
        let mut rows: Vec<UserRow> = self.repo.read_table().await?;
        for row in &mut rows {
            row.wins = 0;
            row.losses = 0;
        }
        self.repo.write_table(&rows).await?;

        Ok(rows.len())
    }

    /// Remove every account. Returns the remaining row count (always 0).
    #[instrument(skip(self), err)]
    pub async fn purge_all(&self) -> Result<usize> {
        self.repo.write_table::<UserRow>(&[]).await?;
        Ok(0)
    }

    /// Idempotent admin-flag migration helper: rewrite all rows, promoting
    /// the user matched by username or id if not already an admin.
    ///
    /// Returns the total row count and the promoted/already-admin match.
    #[instrument(skip(self), err)]
    pub async fn promote(&self, username: Option<&str>, user_id: Option<&str>) -> Result<(usize, Option<UserRow>)> {
        let mut rows: Vec<UserRow> = self.repo.read_table().await?;

        let matches = |u: &UserRow| {
            username.is_some_and(|name| u.username == name) || user_id.is_some_and(|id| u.id == id)
        };

        for row in &mut rows {
            if !row.is_admin && matches(row) {
                row.is_admin = true;
            }
        }

        self.repo.write_table(&rows).await?;

        let promoted = rows.iter().find(|u| u.is_admin && matches(u)).cloned();
        Ok((rows.len(), promoted))
    }
}

/// Apply a counter delta to the matching row, clamped at a floor of 0.
///
/// Rows for unknown user ids are skipped - a settlement can reference a user
/// that has since been purged. Returns whether a row actually changed.
pub fn upsert_counters(rows: &mut [UserRow], user_id: &str, delta_wins: i32, delta_losses: i32) -> bool {
    let Some(row) = rows.iter_mut().find(|u| u.id == user_id) else {
        return false;
    };

    let wins = (row.wins + delta_wins).max(0);
    let losses = (row.losses + delta_losses).max(0);
    let changed = wins != row.wins || losses != row.losses;

    row.wins = wins;
    row.losses = losses;
    changed
}
