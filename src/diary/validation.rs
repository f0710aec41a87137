// Payload validation.
//
// Every rule is evaluated and every failure is reported, in a fixed order, so a
// client sees the complete list of problems in one round trip.

use uuid::Uuid;

use super::models::{
    CreateEntryRequest, EntryData, SleepDiaryFilter, SleepQuality, UpdateEntryRequest,
    MAX_COMMENT_LENGTH, MAX_PAGE_SIZE,
};
use super::timezone;

pub fn validate_entry_data(data: &EntryData) -> Vec<String> {
    let mut errors = validate_time_order(&[
        ("in_bed_at", data.in_bed_at.as_ref()),
        ("tried_to_sleep_at", data.tried_to_sleep_at.as_ref()),
        ("final_wake_up_at", data.final_wake_up_at.as_ref()),
        ("out_of_bed_at", data.out_of_bed_at.as_ref()),
    ]);

    if data.tried_to_sleep_at.is_none() {
        errors.push("tried_to_sleep_at is required".to_string());
    }
    if data.final_wake_up_at.is_none() {
        errors.push("final_wake_up_at is required".to_string());
    }

    if SleepQuality::try_from(data.sleep_quality).is_err() {
        errors.push(format!(
            "sleep_quality should be between {} ({}) and {} ({})",
            SleepQuality::MIN.ordinal(),
            SleepQuality::MIN,
            SleepQuality::MAX.ordinal(),
            SleepQuality::MAX,
        ));
    }

    for (label, value) in [
        ("sleep_delay_in_min", data.sleep_delay_in_min),
        ("awakenings_count", data.awakenings_count),
        (
            "awakenings_total_duration_in_min",
            data.awakenings_total_duration_in_min,
        ),
    ] {
        if matches!(value, Some(v) if v < 0) {
            errors.push(format!("{label} should be non-negative"));
        }
    }

    if let Some(comments) = &data.comments {
        if comments.chars().count() > MAX_COMMENT_LENGTH {
            errors.push(format!(
                "comments should not exceed {MAX_COMMENT_LENGTH} characters"
            ));
        }
    }

    if data.timezone.is_empty() {
        errors.push("timezone is required".to_string());
    } else if let Err(e) = timezone::resolve(&data.timezone) {
        errors.push(e.to_string());
    }

    errors
}

pub fn validate_create(request: &CreateEntryRequest) -> Vec<String> {
    let mut errors = validate_entry_data(&request.data);
    if request.account_uuid.is_empty() {
        errors.push("account_uuid is required".to_string());
    } else if Uuid::parse_str(&request.account_uuid).is_err() {
        errors.push(format!("invalid UUID '{}'", request.account_uuid));
    }
    errors
}

pub fn validate_update(request: &UpdateEntryRequest) -> Vec<String> {
    validate_entry_data(&request.data)
}

pub fn validate_filter(filter: &SleepDiaryFilter) -> Vec<String> {
    let mut errors = validate_time_order(&[
        ("from_date", filter.from_date.as_ref()),
        ("to_date", filter.to_date.as_ref()),
    ]);

    if filter.account_uuids.is_empty() {
        errors.push("account_uuid is required".to_string());
    }
    for id in &filter.account_uuids {
        if Uuid::parse_str(id).is_err() {
            errors.push(format!("invalid UUID '{id}'"));
        }
    }

    if filter.page_size < 1 {
        errors.push("page_size should be greater than 0".to_string());
    }
    if filter.page_size > MAX_PAGE_SIZE {
        errors.push(format!("page_size should not exceed {MAX_PAGE_SIZE}"));
    }
    if filter.page_number < 1 {
        errors.push("page_number should be greater than 0".to_string());
    }

    errors
}

/// Present values must be non-decreasing; absent ones are skipped.
fn validate_time_order<T: PartialOrd>(items: &[(&str, Option<&T>)]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut previous: Option<(&str, &T)> = None;

    for &(label, value) in items {
        let Some(value) = value else {
            continue;
        };
        if let Some((previous_label, previous_value)) = previous {
            if value < previous_value {
                errors.push(format!("{previous_label} should not be after {label}"));
            }
        }
        previous = Some((label, value));
    }

    errors
}
