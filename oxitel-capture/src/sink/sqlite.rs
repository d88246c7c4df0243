use std::path::Path;

use async_trait::async_trait;
use oxitel_core::{AggregateRecord, SubjectId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::RecordSink;

#[derive(Debug, thiserror::Error)]
pub enum SqliteSinkError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Relational sink: one `vitals` row per completed cycle.
#[derive(Clone)]
pub struct SqliteSink {
    pool: SqlitePool,
    subject: SubjectId,
}

/// One stored cycle, as read back from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct VitalsRow {
    pub hr: f64,
    pub spo2: f64,
    pub measured_on: String,
    pub subject_id: i64,
}

impl SqliteSink {
    pub async fn new(
        path: impl AsRef<Path>,
        subject: SubjectId,
    ) -> Result<Self, SqliteSinkError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool, subject })
    }

    pub async fn new_in_memory(subject: SubjectId) -> Result<Self, SqliteSinkError> {
        // One connection only; each pooled :memory: connection would
        // otherwise get its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool, subject })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), SqliteSinkError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vitals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hr REAL NOT NULL,
                spo2 REAL NOT NULL,
                measured_on TEXT NOT NULL,
                subject_id INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// All stored cycles, oldest first. Used by tests and ad-hoc inspection.
    pub async fn rows(&self) -> Result<Vec<VitalsRow>, SqliteSinkError> {
        let rows = sqlx::query(
            "SELECT hr, spo2, measured_on, subject_id FROM vitals ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                Ok(VitalsRow {
                    hr: r.try_get("hr")?,
                    spo2: r.try_get("spo2")?,
                    measured_on: r.try_get("measured_on")?,
                    subject_id: r.try_get("subject_id")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl RecordSink for SqliteSink {
    type Error = SqliteSinkError;

    async fn deliver(&self, record: &AggregateRecord) -> Result<(), Self::Error> {
        sqlx::query(
            "INSERT INTO vitals (hr, spo2, measured_on, subject_id) VALUES (?, ?, ?, ?)",
        )
        .bind(record.avg_heart_rate)
        .bind(record.avg_spo2)
        .bind(record.measured_on.to_string())
        .bind(self.subject.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
