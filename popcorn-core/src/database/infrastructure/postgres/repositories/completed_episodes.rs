use async_trait::async_trait;
use chrono::{DateTime, Utc};
use popcorn_model::{CompletedEpisodeRecord, EpisodeKey, UserId};
use sqlx::{PgPool, Row};

use super::tracked_series::{series_from_db, series_to_db};
use crate::database::ports::CompletedEpisodeRepository;
use crate::error::{PopcornError, Result};

fn number_to_db(value: u16) -> Result<i16> {
    i16::try_from(value).map_err(|_| {
        PopcornError::Internal(format!("episode number {value} exceeds SMALLINT"))
    })
}

fn number_from_db(value: i16) -> Result<u16> {
    u16::try_from(value).map_err(|_| {
        PopcornError::Internal(format!("negative episode number {value} in store"))
    })
}

#[derive(Debug, Clone)]
pub struct PostgresCompletedEpisodeRepository {
    pool: PgPool,
}

impl PostgresCompletedEpisodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompletedEpisodeRepository for PostgresCompletedEpisodeRepository {
    async fn add_to_completed(
        &self,
        user_id: UserId,
        key: EpisodeKey,
        completed_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO episodes_completed
                (user_id, series_id, season_number, episode_number, completed_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, series_id, season_number, episode_number)
            DO NOTHING
            "#,
        )
        .bind(user_id.to_uuid())
        .bind(series_to_db(key.series_id)?)
        .bind(number_to_db(key.season_number)?)
        .bind(number_to_db(key.episode_number)?)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn remove_from_completed(
        &self,
        user_id: UserId,
        key: EpisodeKey,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM episodes_completed
            WHERE user_id = $1
              AND series_id = $2
              AND season_number = $3
              AND episode_number = $4
            "#,
        )
        .bind(user_id.to_uuid())
        .bind(series_to_db(key.series_id)?)
        .bind(number_to_db(key.season_number)?)
        .bind(number_to_db(key.episode_number)?)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn get_completed(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CompletedEpisodeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT series_id, season_number, episode_number, completed_at
            FROM episodes_completed
            WHERE user_id = $1
            ORDER BY completed_at DESC
            "#,
        )
        .bind(user_id.to_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<CompletedEpisodeRecord> {
                let series_id: i64 = row.try_get("series_id")?;
                let season_number: i16 = row.try_get("season_number")?;
                let episode_number: i16 = row.try_get("episode_number")?;
                Ok(CompletedEpisodeRecord {
                    user_id,
                    key: EpisodeKey::new(
                        series_from_db(series_id)?,
                        number_from_db(season_number)?,
                        number_from_db(episode_number)?,
                    ),
                    completed_at: row.try_get("completed_at")?,
                })
            })
            .collect()
    }
}
