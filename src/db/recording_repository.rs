//! Call recording repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use super::repository::{
    from_json_text, meta_from_text, parse_db_timestamp, to_db_timestamp, to_json_text,
};
use crate::models::{DerivedId, Recording, RecordingRequest};

const RECORDING_COLUMNS: &str = "id, org_id, deal_id, url, title, description, participants, \
video_path, duration, meta, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct RecordingRow {
    id: String,
    org_id: Option<String>,
    deal_id: Option<String>,
    url: String,
    title: Option<String>,
    description: Option<String>,
    participants: Option<String>,
    video_path: Option<String>,
    duration: Option<f64>,
    meta: String,
    created_at: String,
    updated_at: String,
}

pub struct RecordingRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RecordingRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Recording>> {
        let row = sqlx::query_as::<_, RecordingRow>(&format!(
            "SELECT {} FROM recordings WHERE id = ?",
            RECORDING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get recording")?;

        Ok(row.map(row_to_recording))
    }

    pub async fn list_by_org(&self, org_id: &str) -> Result<Vec<Recording>> {
        let rows = sqlx::query_as::<_, RecordingRow>(&format!(
            "SELECT {} FROM recordings WHERE org_id = ? ORDER BY created_at DESC",
            RECORDING_COLUMNS
        ))
        .bind(org_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to list recordings")?;

        Ok(rows.into_iter().map(row_to_recording).collect())
    }

    /// Recordings of an organization in which `email` took part
    pub async fn list_for_participant(&self, org_id: &str, email: &str) -> Result<Vec<Recording>> {
        let rows = sqlx::query_as::<_, RecordingRow>(&format!(
            r#"
            SELECT {} FROM recordings
            WHERE org_id = ?
              AND EXISTS (SELECT 1 FROM json_each(recordings.participants) WHERE value = ?)
            ORDER BY created_at DESC
            "#,
            RECORDING_COLUMNS
        ))
        .bind(org_id)
        .bind(email)
        .fetch_all(self.pool)
        .await
        .context("Failed to list recordings for participant")?;

        Ok(rows.into_iter().map(row_to_recording).collect())
    }

    /// Insert the recording, or overwrite it when the derived id already exists.
    ///
    /// A client-supplied `created_at` is stored as given; otherwise the row
    /// is stamped now. An existing row keeps its original `created_at`.
    pub async fn upsert(&self, req: &RecordingRequest) -> Result<Recording> {
        let id = req.derived_id();
        let now = Utc::now();
        let created_at = to_db_timestamp(&req.created_at.unwrap_or(now));
        let participants = req.participants.as_ref().map(to_json_text).transpose()?;
        let meta = to_json_text(&req.meta.clone().unwrap_or_default())?;

        sqlx::query(
            r#"
            INSERT INTO recordings (id, org_id, deal_id, url, title, description, participants,
                                    video_path, duration, meta, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                deal_id = excluded.deal_id,
                title = excluded.title,
                description = excluded.description,
                participants = excluded.participants,
                video_path = excluded.video_path,
                duration = excluded.duration,
                meta = excluded.meta,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&req.org_id)
        .bind(&req.deal_id)
        .bind(&req.url)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&participants)
        .bind(&req.video_path)
        .bind(req.duration)
        .bind(&meta)
        .bind(&created_at)
        .bind(to_db_timestamp(&now))
        .execute(self.pool)
        .await
        .context("Failed to upsert recording")?;

        self.get_by_id(&id)
            .await?
            .context("Failed to retrieve upserted recording")
    }

    /// Apply the fields present in `req` to the stored recording
    pub async fn update(&self, req: &RecordingRequest) -> Result<Option<Recording>> {
        let id = req.derived_id();
        let Some(existing) = self.get_by_id(&id).await? else {
            return Ok(None);
        };

        let deal_id = req.deal_id.clone().or(existing.deal_id);
        let title = req.title.clone().or(existing.title);
        let description = req.description.clone().or(existing.description);
        let participants = req.participants.clone().or(existing.participants);
        let video_path = req.video_path.clone().or(existing.video_path);
        let duration = req.duration.or(existing.duration);
        let meta = req.meta.clone().unwrap_or(existing.meta);
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE recordings
            SET deal_id = ?, title = ?, description = ?, participants = ?,
                video_path = ?, duration = ?, meta = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&deal_id)
        .bind(&title)
        .bind(&description)
        .bind(participants.as_ref().map(to_json_text).transpose()?)
        .bind(&video_path)
        .bind(duration)
        .bind(to_json_text(&meta)?)
        .bind(&now)
        .bind(&id)
        .execute(self.pool)
        .await
        .context("Failed to update recording")?;

        self.get_by_id(&id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recordings WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete recording")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_recording(row: RecordingRow) -> Recording {
    Recording {
        participants: row
            .participants
            .as_deref()
            .map(|text| from_json_text(Some(text))),
        meta: meta_from_text(&row.meta),
        id: row.id,
        org_id: row.org_id,
        deal_id: row.deal_id,
        url: row.url,
        title: row.title,
        description: row.description,
        video_path: row.video_path,
        duration: row.duration,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
