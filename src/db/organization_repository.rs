//! Organization (tenant) repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use super::repository::{from_json_text, meta_from_text, parse_db_timestamp, to_json_text};
use crate::models::{DerivedId, Organization, OrganizationRequest};

#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: String,
    name: String,
    status: String,
    domains: String,
    meta: String,
    created_at: String,
    updated_at: String,
}

pub struct OrganizationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Organization>> {
        let rows = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT id, name, status, domains, meta, created_at, updated_at
            FROM organizations
            ORDER BY name
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list organizations")?;

        Ok(rows.into_iter().map(row_to_org).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT id, name, status, domains, meta, created_at, updated_at
            FROM organizations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get organization")?;

        Ok(row.map(row_to_org))
    }

    /// Insert the organization, or overwrite it when the name already exists
    pub async fn upsert(&self, req: &OrganizationRequest) -> Result<Organization> {
        let id = req.derived_id();
        let now = Utc::now().to_rfc3339();
        let domains = to_json_text(&req.domains.clone().unwrap_or_default())?;
        let meta = to_json_text(&req.meta.clone().unwrap_or_default())?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, status, domains, meta, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                status = excluded.status,
                domains = excluded.domains,
                meta = excluded.meta,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(req.status.unwrap_or_default().to_string())
        .bind(&domains)
        .bind(&meta)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to upsert organization")?;

        self.get_by_id(&id)
            .await?
            .context("Failed to retrieve upserted organization")
    }

    /// Apply the fields present in `req` to the stored organization
    pub async fn update(&self, req: &OrganizationRequest) -> Result<Option<Organization>> {
        let id = req.derived_id();
        let Some(existing) = self.get_by_id(&id).await? else {
            return Ok(None);
        };

        let status = req.status.unwrap_or(existing.status);
        let domains = req.domains.clone().unwrap_or(existing.domains);
        let meta = req.meta.clone().unwrap_or(existing.meta);
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE organizations
            SET status = ?, domains = ?, meta = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(to_json_text(&domains)?)
        .bind(to_json_text(&meta)?)
        .bind(&now)
        .bind(&id)
        .execute(self.pool)
        .await
        .context("Failed to update organization")?;

        self.get_by_id(&id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete organization")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_org(row: OrganizationRow) -> Organization {
    Organization {
        status: row.status.parse().unwrap_or_default(),
        domains: from_json_text(Some(&row.domains)),
        meta: meta_from_text(&row.meta),
        id: row.id,
        name: row.name,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
