//! User repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use super::repository::{meta_from_text, parse_db_timestamp, to_json_text};
use crate::models::{DerivedId, User, UserRequest};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    org_id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    role: Option<String>,
    meta: String,
    created_at: String,
    updated_at: String,
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, org_id, email, name, role, meta, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get user")?;

        Ok(row.map(row_to_user))
    }

    pub async fn list_by_org(&self, org_id: &str) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, org_id, email, name, role, meta, created_at, updated_at
            FROM users
            WHERE org_id = ?
            ORDER BY email
            "#,
        )
        .bind(org_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to list users")?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    /// Insert the user, or overwrite it when `(org_id, email)` already exists
    pub async fn upsert(&self, req: &UserRequest) -> Result<User> {
        let id = req.derived_id();
        let now = Utc::now().to_rfc3339();
        let meta = to_json_text(&req.meta.clone().unwrap_or_default())?;

        sqlx::query(
            r#"
            INSERT INTO users (id, org_id, email, name, role, meta, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                role = excluded.role,
                meta = excluded.meta,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&req.org_id)
        .bind(&req.email)
        .bind(&req.name)
        .bind(&req.role)
        .bind(&meta)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to upsert user")?;

        self.get_by_id(&id)
            .await?
            .context("Failed to retrieve upserted user")
    }

    /// Return the stored user for `(org_id, email)`, inserting it on first sight
    pub async fn read_or_insert(&self, req: &UserRequest) -> Result<User> {
        if let Some(existing) = self.get_by_id(&req.derived_id()).await? {
            return Ok(existing);
        }
        self.upsert(req).await
    }

    /// Apply `name`, `role` and `meta` from `req`; the key fields never change
    pub async fn update(&self, req: &UserRequest) -> Result<Option<User>> {
        let id = req.derived_id();
        let Some(existing) = self.get_by_id(&id).await? else {
            return Ok(None);
        };

        let name = req.name.clone().or(existing.name);
        let role = req.role.clone().or(existing.role);
        let meta = req.meta.clone().unwrap_or(existing.meta);
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, role = ?, meta = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&name)
        .bind(&role)
        .bind(to_json_text(&meta)?)
        .bind(&now)
        .bind(&id)
        .execute(self.pool)
        .await
        .context("Failed to update user")?;

        self.get_by_id(&id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: UserRow) -> User {
    User {
        meta: meta_from_text(&row.meta),
        id: row.id,
        org_id: row.org_id,
        email: row.email,
        name: row.name,
        role: row.role,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
