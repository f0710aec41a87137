use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::models::{
    CreateEntryRequest, EntryData, EntryFields, EntryResponse, EntrySearch, EntryUpdate,
    NewEntry, Page, SleepDiaryEntry, SleepDiaryFilter, SleepQuality, UpdateEntryRequest,
};
use super::repository::{EntryRepository, RepositoryError};
use super::{timezone, validation};
use crate::error::{AppError, AppResult};
use crate::trace::RequestContext;

/// Orchestrates validation, timestamp normalization and persistence, and is the
/// only place repository outcomes are turned into `AppError`s.
#[derive(Clone)]
pub struct DiaryService {
    repository: Arc<dyn EntryRepository>,
}

impl DiaryService {
    pub fn new(repository: Arc<dyn EntryRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_entry(&self, ctx: &RequestContext, id: i64) -> AppResult<EntryResponse> {
        let entry = self.repository.get_by_id(id).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => AppError::NotFound("entry not found".into()),
            other => {
                tracing::error!(
                    trace_id = %ctx.trace_id,
                    entry_id = id,
                    error    = %other,
                    "Reading entry by id failed"
                );
                AppError::Unknown("read failed".into())
            }
        })?;

        present(ctx, entry)
    }

    pub async fn search_entries(
        &self,
        ctx: &RequestContext,
        filter: SleepDiaryFilter,
    ) -> AppResult<Page<EntryResponse>> {
        let errors = validation::validate_filter(&filter);
        if !errors.is_empty() {
            return Err(AppError::invalid("invalid filter data", errors));
        }

        let search = EntrySearch {
            account_uuids: filter
                .account_uuids
                .iter()
                .filter_map(|id| Uuid::parse_str(id).ok())
                .collect(),
            from_date: filter.from_date.as_ref().map(timezone::to_instant),
            to_date: filter.to_date.as_ref().map(timezone::to_instant),
            page_size: filter.page_size,
            page_number: filter.page_number,
        };

        let (total_count, entries) = self.repository.search(&search).await.map_err(|e| {
            tracing::error!(
                trace_id = %ctx.trace_id,
                filter   = ?search,
                error    = %e,
                "Searching entries failed"
            );
            AppError::Unknown("read failed".into())
        })?;

        let items = entries
            .into_iter()
            .map(|entry| present(ctx, entry))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page {
            total_count,
            page_size: search.page_size,
            page_number: search.page_number,
            items,
        })
    }

    pub async fn create_entry(
        &self,
        ctx: &RequestContext,
        request: CreateEntryRequest,
    ) -> AppResult<EntryResponse> {
        let errors = validation::validate_create(&request);
        if !errors.is_empty() {
            return Err(AppError::invalid("invalid create data", errors));
        }
        let account_uuid = Uuid::parse_str(&request.account_uuid).map_err(|e| {
            AppError::invalid("invalid create data", vec![e.to_string()])
        })?;

        let now = Utc::now().trunc_subsecs(3);
        let new_entry = NewEntry {
            account_uuid,
            fields: normalize(request.data, "invalid create data")?,
            created_at: now,
            updated_at: now,
            version: 1,
        };

        let created = self.repository.insert(new_entry).await.map_err(|e| {
            tracing::error!(
                trace_id     = %ctx.trace_id,
                account_uuid = %account_uuid,
                error        = %e,
                "Inserting entry failed"
            );
            AppError::Unknown("insert failed".into())
        })?;

        tracing::info!(
            trace_id      = %ctx.trace_id,
            entry_id      = created.id,
            account_uuid  = %created.account_uuid,
            sleep_quality = %created.sleep_quality,
            "Sleep diary entry created"
        );

        present(ctx, created)
    }

    pub async fn update_entry(
        &self,
        ctx: &RequestContext,
        id: i64,
        request: UpdateEntryRequest,
    ) -> AppResult<EntryResponse> {
        let errors = validation::validate_update(&request);
        if !errors.is_empty() {
            return Err(AppError::invalid("invalid update data", errors));
        }

        let update = EntryUpdate {
            id,
            expected_version: request.version,
            fields: normalize(request.data, "invalid update data")?,
            updated_at: Utc::now().trunc_subsecs(3),
        };

        let updated = self.repository.update(update).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => AppError::NotFound("entry not found".into()),
            RepositoryError::Conflict {
                expected, current, ..
            } => {
                tracing::info!(
                    trace_id         = %ctx.trace_id,
                    entry_id         = id,
                    expected_version = expected,
                    current_version  = current,
                    "Rejected stale update"
                );
                AppError::Conflict("version conflict".into())
            }
            other => {
                tracing::error!(
                    trace_id = %ctx.trace_id,
                    entry_id = id,
                    error    = %other,
                    "Updating entry failed"
                );
                AppError::Unknown("update failed".into())
            }
        })?;

        tracing::info!(
            trace_id = %ctx.trace_id,
            entry_id = updated.id,
            version  = updated.version,
            "Sleep diary entry updated"
        );

        present(ctx, updated)
    }
}

/// Converts a validated payload into storage fields.
fn normalize(data: EntryData, message: &str) -> AppResult<EntryFields> {
    let missing = |field: &str| AppError::invalid(message, vec![format!("{field} is required")]);

    let tried_to_sleep_at = data
        .tried_to_sleep_at
        .as_ref()
        .map(timezone::to_instant)
        .ok_or_else(|| missing("tried_to_sleep_at"))?;
    let final_wake_up_at = data
        .final_wake_up_at
        .as_ref()
        .map(timezone::to_instant)
        .ok_or_else(|| missing("final_wake_up_at"))?;
    let sleep_quality = SleepQuality::try_from(data.sleep_quality).map_err(|value| {
        AppError::invalid(message, vec![format!("invalid sleep_quality {value}")])
    })?;

    Ok(EntryFields {
        timezone: data.timezone,
        in_bed_at: data.in_bed_at.as_ref().map(timezone::to_instant),
        tried_to_sleep_at,
        sleep_delay_in_min: data.sleep_delay_in_min,
        awakenings_count: data.awakenings_count,
        awakenings_total_duration_in_min: data.awakenings_total_duration_in_min,
        final_wake_up_at,
        out_of_bed_at: data.out_of_bed_at.as_ref().map(timezone::to_instant),
        sleep_quality,
        comments: data.comments,
    })
}

fn present(ctx: &RequestContext, entry: SleepDiaryEntry) -> AppResult<EntryResponse> {
    let id = entry.id;
    timezone::project_entry(entry).map_err(|e| {
        tracing::error!(
            trace_id = %ctx.trace_id,
            entry_id = id,
            error    = %e,
            "Converting entry to its timezone failed"
        );
        AppError::Unknown("conversion failed".into())
    })
}
