use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use popcorn_model::{
    CompletedEpisodeRecord, EpisodeKey, SeriesId, TrackedSeriesState,
    TrackingRecord, User, UserId,
};
use tokio::sync::Mutex;

use super::ports::{
    CompletedEpisodeRepository, TrackedSeriesRepository, UserRepository,
};
use crate::error::{PopcornError, Result, TransitionError};

type Pair = (UserId, SeriesId);

#[derive(Debug, Clone)]
struct WatchingRow {
    started_at: DateTime<Utc>,
    is_stopped: bool,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct TrackingTables {
    watchlist: HashMap<Pair, DateTime<Utc>>,
    watching: HashMap<Pair, WatchingRow>,
    completed: HashMap<Pair, DateTime<Utc>>,
}

fn insert_once(
    set: &mut HashMap<Pair, DateTime<Utc>>,
    pair: Pair,
    at: DateTime<Utc>,
) -> bool {
    match set.entry(pair) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(at);
            true
        }
    }
}

fn affected(changed: bool) -> u64 {
    u64::from(changed)
}

fn newest_first(records: &mut [TrackingRecord]) {
    records.sort_by(|a, b| {
        b.recorded_at
            .cmp(&a.recorded_at)
            .then(a.series_id.cmp(&b.series_id))
    });
}

/// Process-local [`TrackedSeriesRepository`] for tests and database-less
/// setups.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTrackedSeriesRepository {
    tables: Arc<Mutex<TrackingTables>>,
}

impl InMemoryTrackedSeriesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// States currently holding the pair. More than one entry means a
    /// transition was interrupted between its write and its cleanup.
    pub async fn memberships(
        &self,
        user_id: UserId,
        series_id: SeriesId,
    ) -> Vec<TrackedSeriesState> {
        let tables = self.tables.lock().await;
        let pair = (user_id, series_id);
        let mut states = Vec::new();
        if tables.watchlist.contains_key(&pair) {
            states.push(TrackedSeriesState::Watchlist);
        }
        if let Some(row) = tables.watching.get(&pair) {
            states.push(if row.is_stopped {
                TrackedSeriesState::Stopped
            } else {
                TrackedSeriesState::Watching
            });
        }
        if tables.completed.contains_key(&pair) {
            states.push(TrackedSeriesState::Completed);
        }
        states
    }
}

#[async_trait]
impl TrackedSeriesRepository for InMemoryTrackedSeriesRepository {
    async fn add(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        state: TrackedSeriesState,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let pair = (user_id, series_id);
        let inserted = match state {
            TrackedSeriesState::Watchlist => {
                insert_once(&mut tables.watchlist, pair, at)
            }
            TrackedSeriesState::Completed => {
                insert_once(&mut tables.completed, pair, at)
            }
            TrackedSeriesState::Watching => {
                let fresh = !tables.watching.contains_key(&pair);
                if fresh {
                    tables.watching.insert(
                        pair,
                        WatchingRow {
                            started_at: at,
                            is_stopped: false,
                            updated_at: at,
                        },
                    );
                }
                fresh
            }
            TrackedSeriesState::Stopped => {
                return Err(TransitionError::InvalidTarget { state }.into());
            }
        };
        Ok(affected(inserted))
    }

    async fn remove(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        state: TrackedSeriesState,
    ) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let pair = (user_id, series_id);
        let removed = match state {
            TrackedSeriesState::Watchlist => {
                tables.watchlist.remove(&pair).is_some()
            }
            TrackedSeriesState::Completed => {
                tables.completed.remove(&pair).is_some()
            }
            TrackedSeriesState::Watching => {
                tables.watching.remove(&pair).is_some()
            }
            TrackedSeriesState::Stopped => {
                let stopped = tables
                    .watching
                    .get(&pair)
                    .is_some_and(|row| row.is_stopped);
                if stopped {
                    tables.watching.remove(&pair);
                }
                stopped
            }
        };
        Ok(affected(removed))
    }

    async fn stop_watching(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let changed = match tables.watching.get_mut(&(user_id, series_id)) {
            Some(row) => {
                row.is_stopped = true;
                row.updated_at = at;
                true
            }
            None => false,
        };
        Ok(affected(changed))
    }

    async fn resume_watching(
        &self,
        user_id: UserId,
        series_id: SeriesId,
        at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let changed = match tables.watching.get_mut(&(user_id, series_id)) {
            Some(row) if row.is_stopped => {
                row.is_stopped = false;
                row.updated_at = at;
                true
            }
            _ => false,
        };
        Ok(affected(changed))
    }

    async fn records(
        &self,
        user_id: UserId,
        state: TrackedSeriesState,
    ) -> Result<Vec<TrackingRecord>> {
        let tables = self.tables.lock().await;
        let record = |series_id: SeriesId, recorded_at: DateTime<Utc>| {
            TrackingRecord {
                user_id,
                series_id,
                state,
                recorded_at,
            }
        };

        let mut records: Vec<TrackingRecord> = match state {
            TrackedSeriesState::Watchlist => tables
                .watchlist
                .iter()
                .filter(|((user, _), _)| *user == user_id)
                .map(|((_, series), at)| record(*series, *at))
                .collect(),
            TrackedSeriesState::Completed => tables
                .completed
                .iter()
                .filter(|((user, _), _)| *user == user_id)
                .map(|((_, series), at)| record(*series, *at))
                .collect(),
            TrackedSeriesState::Watching => tables
                .watching
                .iter()
                .filter(|((user, _), row)| *user == user_id && !row.is_stopped)
                .map(|((_, series), row)| record(*series, row.started_at))
                .collect(),
            TrackedSeriesState::Stopped => tables
                .watching
                .iter()
                .filter(|((user, _), row)| *user == user_id && row.is_stopped)
                .map(|((_, series), row)| record(*series, row.updated_at))
                .collect(),
        };
        newest_first(&mut records);
        Ok(records)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryCompletedEpisodeRepository {
    completed: Arc<Mutex<HashMap<(UserId, EpisodeKey), DateTime<Utc>>>>,
}

impl InMemoryCompletedEpisodeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletedEpisodeRepository for InMemoryCompletedEpisodeRepository {
    async fn add_to_completed(
        &self,
        user_id: UserId,
        key: EpisodeKey,
        completed_at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut guard = self.completed.lock().await;
        let inserted = match guard.entry((user_id, key)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(completed_at);
                true
            }
        };
        Ok(affected(inserted))
    }

    async fn remove_from_completed(
        &self,
        user_id: UserId,
        key: EpisodeKey,
    ) -> Result<u64> {
        let mut guard = self.completed.lock().await;
        Ok(affected(guard.remove(&(user_id, key)).is_some()))
    }

    async fn get_completed(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CompletedEpisodeRecord>> {
        let guard = self.completed.lock().await;
        let mut records: Vec<CompletedEpisodeRecord> = guard
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|((_, key), at)| CompletedEpisodeRecord {
                user_id,
                key: *key,
                completed_at: *at,
            })
            .collect();
        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(records)
    }
}

/// Process-local [`UserRepository`]. Enforces the same unique username and
/// email constraints as the `users` table.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_by<'a>(
    users: &'a HashMap<UserId, User>,
    matches: impl Fn(&User) -> bool,
) -> Option<&'a User> {
    users.values().find(|user| matches(*user))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.lock().await;
        Ok(find_by(&users, |user| user.username == username).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.lock().await;
        Ok(find_by(&users, |user| user.email == email).cloned())
    }

    async fn create(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().await;
        let clash = find_by(&users, |existing| {
            existing.username == user.username || existing.email == user.email
        })
        .is_some();
        if clash {
            return Err(PopcornError::Internal(format!(
                "user {} violates a unique constraint",
                user.id
            )));
        }
        match users.entry(user.id) {
            Entry::Occupied(_) => Err(PopcornError::Internal(format!(
                "user {} already exists",
                user.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn update(
        &self,
        id: UserId,
        username: &str,
        email: &str,
    ) -> Result<u64> {
        let mut users = self.users.lock().await;
        let clash = find_by(&users, |other| {
            other.id != id
                && (other.username == username || other.email == email)
        })
        .is_some();
        if clash {
            return Err(PopcornError::Internal(format!(
                "update of user {id} violates a unique constraint"
            )));
        }
        let changed = match users.get_mut(&id) {
            Some(user) => {
                user.username = username.to_owned();
                user.email = email.to_owned();
                true
            }
            None => false,
        };
        Ok(affected(changed))
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<u64> {
        let mut users = self.users.lock().await;
        let changed = match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_owned();
                true
            }
            None => false,
        };
        Ok(affected(changed))
    }

    async fn delete(&self, id: UserId) -> Result<u64> {
        Ok(affected(self.users.lock().await.remove(&id).is_some()))
    }
}
