use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{EntryRepository, RepositoryError};
use crate::diary::models::{EntrySearch, EntryUpdate, NewEntry, SleepDiaryEntry};

/// In-process store with the same semantics as the PostgreSQL repository.
/// Backs the HTTP and service tests.
#[derive(Debug, Default)]
pub struct MemoryEntryRepository {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    entries: BTreeMap<i64, SleepDiaryEntry>,
}

impl MemoryEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_search(entry: &SleepDiaryEntry, search: &EntrySearch) -> bool {
    search.account_uuids.contains(&entry.account_uuid)
        && search
            .from_date
            .map_or(true, |from| entry.tried_to_sleep_at >= from)
        && search.to_date.map_or(true, |to| entry.tried_to_sleep_at < to)
}

#[async_trait]
impl EntryRepository for MemoryEntryRepository {
    async fn get_by_id(&self, id: i64) -> Result<SleepDiaryEntry, RepositoryError> {
        let state = self.state.read().await;
        state
            .entries
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn search(
        &self,
        search: &EntrySearch,
    ) -> Result<(i64, Vec<SleepDiaryEntry>), RepositoryError> {
        let state = self.state.read().await;
        let mut found: Vec<&SleepDiaryEntry> = state
            .entries
            .values()
            .filter(|entry| matches_search(entry, search))
            .collect();
        found.sort_by_key(|entry| (entry.tried_to_sleep_at, entry.id));

        let total_count = found.len() as i64;
        let offset = usize::try_from(search.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(search.limit()).unwrap_or(0);
        let items = found
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok((total_count, items))
    }

    async fn insert(&self, entry: NewEntry) -> Result<SleepDiaryEntry, RepositoryError> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let fields = entry.fields;
        let created = SleepDiaryEntry {
            id: state.last_id,
            account_uuid: entry.account_uuid,
            timezone: fields.timezone,
            in_bed_at: fields.in_bed_at,
            tried_to_sleep_at: fields.tried_to_sleep_at,
            sleep_delay_in_min: fields.sleep_delay_in_min,
            awakenings_count: fields.awakenings_count,
            awakenings_total_duration_in_min: fields.awakenings_total_duration_in_min,
            final_wake_up_at: fields.final_wake_up_at,
            out_of_bed_at: fields.out_of_bed_at,
            sleep_quality: fields.sleep_quality,
            comments: fields.comments,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            version: entry.version,
        };
        state.entries.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, update: EntryUpdate) -> Result<SleepDiaryEntry, RepositoryError> {
        let mut state = self.state.write().await;
        let current = state
            .entries
            .get(&update.id)
            .ok_or(RepositoryError::NotFound(update.id))?;

        let new_version = current.version + 1;
        if let Some(expected) = update.expected_version {
            if expected.checked_add(1) != Some(new_version) {
                return Err(RepositoryError::Conflict {
                    id: update.id,
                    expected,
                    current: current.version,
                });
            }
        }

        let fields = update.fields;
        let updated = SleepDiaryEntry {
            timezone: fields.timezone,
            in_bed_at: fields.in_bed_at,
            tried_to_sleep_at: fields.tried_to_sleep_at,
            sleep_delay_in_min: fields.sleep_delay_in_min,
            awakenings_count: fields.awakenings_count,
            awakenings_total_duration_in_min: fields.awakenings_total_duration_in_min,
            final_wake_up_at: fields.final_wake_up_at,
            out_of_bed_at: fields.out_of_bed_at,
            sleep_quality: fields.sleep_quality,
            comments: fields.comments,
            updated_at: update.updated_at,
            version: new_version,
            ..current.clone()
        };
        state.entries.insert(updated.id, updated.clone());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::models::{EntryFields, SleepQuality};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn fields(tried_to_sleep_at: DateTime<Utc>) -> EntryFields {
        EntryFields {
            timezone: "UTC".into(),
            in_bed_at: None,
            tried_to_sleep_at,
            sleep_delay_in_min: None,
            awakenings_count: None,
            awakenings_total_duration_in_min: None,
            final_wake_up_at: tried_to_sleep_at + Duration::hours(8),
            out_of_bed_at: None,
            sleep_quality: SleepQuality::Average,
            comments: None,
        }
    }

    fn new_entry(account_uuid: Uuid, tried_to_sleep_at: DateTime<Utc>) -> NewEntry {
        let now = Utc::now();
        NewEntry {
            account_uuid,
            fields: fields(tried_to_sleep_at),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let repo = MemoryEntryRepository::new();
        let account = Uuid::new_v4();
        let first = repo.insert(new_entry(account, base())).await.unwrap();
        let second = repo.insert(new_entry(account, base())).await.unwrap();
        assert_eq!(first.id + 1, second.id);
        assert_eq!(repo.get_by_id(second.id).await.unwrap(), second);
    }

    #[tokio::test]
    async fn missing_entry_is_not_found() {
        let repo = MemoryEntryRepository::new();
        assert!(matches!(
            repo.get_by_id(42).await,
            Err(RepositoryError::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn update_with_stale_version_changes_nothing() {
        let repo = MemoryEntryRepository::new();
        let created = repo.insert(new_entry(Uuid::new_v4(), base())).await.unwrap();

        let result = repo
            .update(EntryUpdate {
                id: created.id,
                expected_version: Some(created.version + 1),
                fields: fields(base() + Duration::hours(1)),
                updated_at: Utc::now(),
            })
            .await;

        assert!(matches!(
            result,
            Err(RepositoryError::Conflict { expected: 2, current: 1, .. })
        ));
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_without_version_always_wins() {
        let repo = MemoryEntryRepository::new();
        let created = repo.insert(new_entry(Uuid::new_v4(), base())).await.unwrap();

        for expected_version in [None, None, Some(3)] {
            repo.update(EntryUpdate {
                id: created.id,
                expected_version,
                fields: fields(base()),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        let stored = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(stored.version, 4);
        assert_eq!(stored.account_uuid, created.account_uuid);
        assert_eq!(stored.created_at, created.created_at);
    }

    #[tokio::test]
    async fn search_pages_in_sleep_order() {
        let repo = MemoryEntryRepository::new();
        let account = Uuid::new_v4();
        for day in [3, 1, 0, 2] {
            repo.insert(new_entry(account, base() + Duration::days(day)))
                .await
                .unwrap();
        }
        repo.insert(new_entry(Uuid::new_v4(), base())).await.unwrap();

        let search = EntrySearch {
            account_uuids: vec![account],
            from_date: None,
            to_date: None,
            page_size: 2,
            page_number: 2,
        };
        let (total, items) = repo.search(&search).await.unwrap();
        assert_eq!(total, 4);
        let days: Vec<_> = items
            .iter()
            .map(|e| (e.tried_to_sleep_at - base()).num_days())
            .collect();
        assert_eq!(days, vec![2, 3]);

        let beyond = EntrySearch {
            page_number: 50,
            ..search
        };
        let (total, items) = repo.search(&beyond).await.unwrap();
        assert_eq!(total, 4);
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn search_range_is_half_open() {
        let repo = MemoryEntryRepository::new();
        let account = Uuid::new_v4();
        for day in 0..4 {
            repo.insert(new_entry(account, base() + Duration::days(day)))
                .await
                .unwrap();
        }

        let search = EntrySearch {
            account_uuids: vec![account],
            from_date: Some(base() + Duration::days(1)),
            to_date: Some(base() + Duration::days(3)),
            page_size: 10,
            page_number: 1,
        };
        let (total, items) = repo.search(&search).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(items[0].tried_to_sleep_at, base() + Duration::days(1));
        assert_eq!(items[1].tried_to_sleep_at, base() + Duration::days(2));
    }
}
