//! Administrator accounts and sessions

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        admin::{AdminAccount, AdminSession},
        fold_case,
    },
};

impl Repository {
    pub async fn admins_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn admins_get_by_id(&self, id: i64) -> AppResult<AdminAccount> {
        sqlx::query_as::<_, AdminAccount>("SELECT * FROM admin_accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Administrator {} not found", id)))
    }

    /// Get administrator by username (case-insensitive)
    pub async fn admins_get_by_username(&self, username: &str) -> AppResult<Option<AdminAccount>> {
        let admin = sqlx::query_as::<_, AdminAccount>(
            "SELECT * FROM admin_accounts WHERE username_folded = ?",
        )
        .bind(fold_case(username))
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    pub async fn admins_create(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> AppResult<AdminAccount> {
        sqlx::query_as::<_, AdminAccount>(
            r#"
            INSERT INTO admin_accounts (username, username_folded, password_hash, email, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(fold_case(username))
        .bind(password_hash)
        .bind(email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "An administrator with that username already exists"))
    }

    /// Open a session for an administrator
    pub async fn sessions_create(&self, admin_id: i64, expires_at: DateTime<Utc>) -> AppResult<AdminSession> {
        let session = sqlx::query_as::<_, AdminSession>(
            r#"
            INSERT INTO admin_sessions (id, admin_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(admin_id)
        .bind(Utc::now())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }

    pub async fn sessions_get(&self, id: Uuid) -> AppResult<Option<AdminSession>> {
        let session = sqlx::query_as::<_, AdminSession>("SELECT * FROM admin_sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(session)
    }

    pub async fn sessions_delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM admin_sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove sessions past their expiry; returns how many were removed
    pub async fn sessions_purge_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
