use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{EntryRepository, RepositoryError};
use crate::diary::models::{EntrySearch, EntryUpdate, NewEntry, SleepDiaryEntry};

#[derive(Debug, Clone)]
pub struct PgEntryRepository {
    pool: PgPool,
}

impl PgEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_search_conditions(builder: &mut QueryBuilder<'_, Postgres>, search: &EntrySearch) {
    builder
        .push(" WHERE account_uuid = ANY(")
        .push_bind(search.account_uuids.clone())
        .push(")");

    if let Some(from_date) = search.from_date {
        builder
            .push(" AND tried_to_sleep_at >= ")
            .push_bind(from_date);
    }
    if let Some(to_date) = search.to_date {
        builder.push(" AND tried_to_sleep_at < ").push_bind(to_date);
    }
}

#[async_trait]
impl EntryRepository for PgEntryRepository {
    async fn get_by_id(&self, id: i64) -> Result<SleepDiaryEntry, RepositoryError> {
        sqlx::query_as::<_, SleepDiaryEntry>("SELECT * FROM sleep_diary_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn search(
        &self,
        search: &EntrySearch,
    ) -> Result<(i64, Vec<SleepDiaryEntry>), RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM sleep_diary_entries");
        push_search_conditions(&mut count, search);
        let total_count = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut page = QueryBuilder::<Postgres>::new("SELECT * FROM sleep_diary_entries");
        push_search_conditions(&mut page, search);
        page.push(" ORDER BY tried_to_sleep_at ASC, id ASC LIMIT ")
            .push_bind(search.limit())
            .push(" OFFSET ")
            .push_bind(search.offset());
        let items = page
            .build_query_as::<SleepDiaryEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok((total_count, items))
    }

    async fn insert(&self, entry: NewEntry) -> Result<SleepDiaryEntry, RepositoryError> {
        let fields = entry.fields;
        let created = sqlx::query_as::<_, SleepDiaryEntry>(
            r#"
            INSERT INTO sleep_diary_entries (
                account_uuid,
                timezone,
                in_bed_at,
                tried_to_sleep_at,
                sleep_delay_in_min,
                awakenings_count,
                awakenings_total_duration_in_min,
                final_wake_up_at,
                out_of_bed_at,
                sleep_quality,
                comments,
                created_at,
                updated_at,
                version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(entry.account_uuid)
        .bind(&fields.timezone)
        .bind(fields.in_bed_at)
        .bind(fields.tried_to_sleep_at)
        .bind(fields.sleep_delay_in_min)
        .bind(fields.awakenings_count)
        .bind(fields.awakenings_total_duration_in_min)
        .bind(fields.final_wake_up_at)
        .bind(fields.out_of_bed_at)
        .bind(fields.sleep_quality)
        .bind(&fields.comments)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .bind(entry.version)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, update: EntryUpdate) -> Result<SleepDiaryEntry, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let fields = &update.fields;

        let updated = sqlx::query_as::<_, SleepDiaryEntry>(
            r#"
            UPDATE sleep_diary_entries
            SET timezone = $1,
                in_bed_at = $2,
                tried_to_sleep_at = $3,
                sleep_delay_in_min = $4,
                awakenings_count = $5,
                awakenings_total_duration_in_min = $6,
                final_wake_up_at = $7,
                out_of_bed_at = $8,
                sleep_quality = $9,
                comments = $10,
                updated_at = $11,
                version = version + 1
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(&fields.timezone)
        .bind(fields.in_bed_at)
        .bind(fields.tried_to_sleep_at)
        .bind(fields.sleep_delay_in_min)
        .bind(fields.awakenings_count)
        .bind(fields.awakenings_total_duration_in_min)
        .bind(fields.final_wake_up_at)
        .bind(fields.out_of_bed_at)
        .bind(fields.sleep_quality)
        .bind(&fields.comments)
        .bind(update.updated_at)
        .bind(update.id)
        .fetch_optional(&mut *tx)
        .await?;

        // Every early return drops `tx`, which rolls the bump back.
        let Some(updated) = updated else {
            return Err(RepositoryError::NotFound(update.id));
        };

        if let Some(expected) = update.expected_version {
            if expected.checked_add(1) != Some(updated.version) {
                return Err(RepositoryError::Conflict {
                    id: update.id,
                    expected,
                    current: updated.version - 1,
                });
            }
        }

        tx.commit().await?;
        Ok(updated)
    }
}
