mod memory;
mod postgres;

pub use memory::MemoryEntryRepository;
pub use postgres::PgEntryRepository;

use async_trait::async_trait;

use super::models::{EntrySearch, EntryUpdate, NewEntry, SleepDiaryEntry};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("entry {0} not found")]
    NotFound(i64),

    #[error("version conflict on entry {id}: expected {expected}, current {current}")]
    Conflict { id: i64, expected: i64, current: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for sleep diary entries.
///
/// `update` is the optimistic-concurrency write: the stored version is bumped
/// as part of the write and, when the caller supplied an expected version, the
/// write is rolled back unless `expected + 1` equals the new version.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<SleepDiaryEntry, RepositoryError>;

    /// Returns the total number of matches and the requested page, ordered by
    /// `tried_to_sleep_at`.
    async fn search(
        &self,
        search: &EntrySearch,
    ) -> Result<(i64, Vec<SleepDiaryEntry>), RepositoryError>;

    async fn insert(&self, entry: NewEntry) -> Result<SleepDiaryEntry, RepositoryError>;

    async fn update(&self, update: EntryUpdate) -> Result<SleepDiaryEntry, RepositoryError>;
}
