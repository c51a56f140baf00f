//! Deal repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use super::repository::{meta_from_text, parse_db_timestamp, to_json_text};
use crate::models::{Deal, DealRequest, DerivedId};

#[derive(Debug, sqlx::FromRow)]
struct DealRow {
    id: String,
    org_id: Option<String>,
    name: String,
    status: String,
    domain: Option<String>,
    meta: String,
    created_at: String,
    updated_at: String,
}

pub struct DealRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DealRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Deal>> {
        let row = sqlx::query_as::<_, DealRow>(
            r#"
            SELECT id, org_id, name, status, domain, meta, created_at, updated_at
            FROM deals
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get deal")?;

        Ok(row.map(row_to_deal))
    }

    pub async fn list_by_org(&self, org_id: &str) -> Result<Vec<Deal>> {
        let rows = sqlx::query_as::<_, DealRow>(
            r#"
            SELECT id, org_id, name, status, domain, meta, created_at, updated_at
            FROM deals
            WHERE org_id = ?
            ORDER BY name
            "#,
        )
        .bind(org_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to list deals")?;

        Ok(rows.into_iter().map(row_to_deal).collect())
    }

    /// Insert the deal, or overwrite it when the name already exists
    pub async fn upsert(&self, req: &DealRequest) -> Result<Deal> {
        let id = req.derived_id();
        let now = Utc::now().to_rfc3339();
        let meta = to_json_text(&req.meta.clone().unwrap_or_default())?;

        sqlx::query(
            r#"
            INSERT INTO deals (id, org_id, name, status, domain, meta, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                org_id = excluded.org_id,
                name = excluded.name,
                status = excluded.status,
                domain = excluded.domain,
                meta = excluded.meta,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&req.org_id)
        .bind(&req.name)
        .bind(req.status.unwrap_or_default().to_string())
        .bind(&req.domain)
        .bind(&meta)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to upsert deal")?;

        self.get_by_id(&id)
            .await?
            .context("Failed to retrieve upserted deal")
    }

    /// Apply the fields present in `req` to the stored deal
    pub async fn update(&self, req: &DealRequest) -> Result<Option<Deal>> {
        let id = req.derived_id();
        let Some(existing) = self.get_by_id(&id).await? else {
            return Ok(None);
        };

        let org_id = req.org_id.clone().or(existing.org_id);
        let status = req.status.unwrap_or(existing.status);
        let domain = req.domain.clone().or(existing.domain);
        let meta = req.meta.clone().unwrap_or(existing.meta);
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE deals
            SET org_id = ?, status = ?, domain = ?, meta = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&org_id)
        .bind(status.to_string())
        .bind(&domain)
        .bind(to_json_text(&meta)?)
        .bind(&now)
        .bind(&id)
        .execute(self.pool)
        .await
        .context("Failed to update deal")?;

        self.get_by_id(&id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM deals WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete deal")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_deal(row: DealRow) -> Deal {
    Deal {
        status: row.status.parse().unwrap_or_default(),
        meta: meta_from_text(&row.meta),
        id: row.id,
        org_id: row.org_id,
        name: row.name,
        domain: row.domain,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
