use async_trait::async_trait;
use chrono::{DateTime, Utc};
use popcorn_model::{SeriesId, TrackedSeriesState, TrackingRecord, UserId};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::database::ports::TrackedSeriesRepository;
use crate::error::{PopcornError, Result, TransitionError};

pub(super) fn series_to_db(id: SeriesId) -> Result<i64> {
    i64::try_from(id.get()).map_err(|_| {
        PopcornError::Internal(format!("series id {id} exceeds BIGINT"))
    })
}

pub(super) fn series_from_db(raw: i64) -> Result<SeriesId> {
    u64::try_from(raw).map(SeriesId).map_err(|_| {
        PopcornError::Internal(format!("negative series id {raw} in store"))
    })
}

#[derive(Debug, Clone)]
pub struct PostgresTrackedSeriesRepository {
    pool: PgPool,
}

impl PostgresTrackedSeriesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(
        row: &PgRow,
        user_id: UserId,
        state: TrackedSeriesState,
    ) -> Result<TrackingRecord> {
        let series_id: i64 = row.try_get("series_id")?;
        let recorded_at: DateTime<Utc> = row.try_get("recorded_at")?;
        Ok(TrackingRecord {
            user_id,
            series_id: series_from_db(series_id)?,
            state,
            recorded_at,
        })
    }
}

#[async_trait]
impl TrackedSeriesRepository for PostgresTrackedSeriesRepository {
    async fn add(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        state: TrackedSeriesState,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let sql = match state {
            TrackedSeriesState::Watchlist => {
                r#"
                INSERT INTO series_watchlist (user_id, series_id, added_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, series_id) DO NOTHING
                "#
            }
            TrackedSeriesState::Watching => {
                r#"
                INSERT INTO series_watching
                    (user_id, series_id, started_at, is_stopped, updated_at)
                VALUES ($1, $2, $3, FALSE, $3)
                ON CONFLICT (user_id, series_id) DO NOTHING
                "#
            }
            TrackedSeriesState::Completed => {
                r#"
                INSERT INTO series_completed (user_id, series_id, completed_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, series_id) DO NOTHING
                "#
            }
            TrackedSeriesState::Stopped => {
                return Err(TransitionError::InvalidTarget { state }.into());
            }
        };

        let result = sqlx::query(sql)
            .bind(user_id.to_uuid())
            .bind(series_to_db(series_id)?)
            .bind(at)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn remove(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        state: TrackedSeriesState,
    ) -> Result<u64> {
        let sql = match state {
            TrackedSeriesState::Watchlist => {
                "DELETE FROM series_watchlist WHERE user_id = $1 AND series_id = $2"
            }
            TrackedSeriesState::Watching => {
                "DELETE FROM series_watching WHERE user_id = $1 AND series_id = $2"
            }
            TrackedSeriesState::Stopped => {
                r#"
                DELETE FROM series_watching
                WHERE user_id = $1 AND series_id = $2 AND is_stopped
                "#
            }
            TrackedSeriesState::Completed => {
                "DELETE FROM series_completed WHERE user_id = $1 AND series_id = $2"
            }
        };

        let result = sqlx::query(sql)
            .bind(user_id.to_uuid())
            .bind(series_to_db(series_id)?)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn stop_watching(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE series_watching
            SET is_stopped = TRUE, updated_at = $3
            WHERE user_id = $1 AND series_id = $2
            "#,
        )
        .bind(user_id.to_uuid())
        .bind(series_to_db(series_id)?)
        .bind(at)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn resume_watching(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE series_watching
            SET is_stopped = FALSE, updated_at = $3
            WHERE user_id = $1 AND series_id = $2 AND is_stopped
            "#,
        )
        .bind(user_id.to_uuid())
        .bind(series_to_db(series_id)?)
        .bind(at)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn records(
        &self,
        user_id: UserId,
        state: TrackedSeriesState,
    ) -> Result<Vec<TrackingRecord>> {
        let sql = match state {
            TrackedSeriesState::Watchlist => {
                r#"
                SELECT series_id, added_at AS recorded_at
                FROM series_watchlist
                WHERE user_id = $1
                ORDER BY added_at DESC, series_id
                "#
            }
            TrackedSeriesState::Watching => {
                r#"
                SELECT series_id, started_at AS recorded_at
                FROM series_watching
                WHERE user_id = $1 AND NOT is_stopped
                ORDER BY started_at DESC, series_id
                "#
            }
            TrackedSeriesState::Stopped => {
                r#"
                SELECT series_id, updated_at AS recorded_at
                FROM series_watching
                WHERE user_id = $1 AND is_stopped
                ORDER BY updated_at DESC, series_id
                "#
            }
            TrackedSeriesState::Completed => {
                r#"
                SELECT series_id, completed_at AS recorded_at
                FROM series_completed
                WHERE user_id = $1
                ORDER BY completed_at DESC, series_id
                "#
            }
        };

        let rows = sqlx::query(sql)
            .bind(user_id.to_uuid())
            .fetch_all(self.pool())
            .await?;

        rows.iter()
            .map(|row| Self::map_row(row, user_id, state))
            .collect()
    }
}
