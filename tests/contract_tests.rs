use serde_json::json;
use sleep_diary::{
    diary::models::{CreateEntryRequest, EntryResponse, Page, UpdateEntryRequest},
    error::{AppError, ErrorCode, ErrorResponse},
};
use uuid::Uuid;

#[test]
fn test_create_request_contract() {
    // 1. Simulate a client payload with only the required fields
    let json_data = json!({
        "account_uuid": "6f1c2a4e-1a0b-4c8e-9a55-2f0d7c9b8e11",
        "timezone": "Europe/Warsaw",
        "tried_to_sleep_at": "2024-03-10T23:00:00+01:00",
        "final_wake_up_at": "2024-03-11T06:30:00+01:00",
        "sleep_quality": 4,
        "unexpected": true // Extra field shouldn't panic
    });

    // 2. Deserialize into the request struct
    let request: CreateEntryRequest =
        serde_json::from_value(json_data).expect("Failed to deserialize CreateEntryRequest");

    // 3. Verify mappings
    assert_eq!(request.account_uuid, "6f1c2a4e-1a0b-4c8e-9a55-2f0d7c9b8e11");
    assert_eq!(request.data.timezone, "Europe/Warsaw");
    assert_eq!(request.data.sleep_quality, 4);
    assert_eq!(request.data.in_bed_at, None);
    assert_eq!(request.data.comments, None);
    assert_eq!(
        request.data.tried_to_sleep_at.unwrap().to_rfc3339(),
        "2024-03-10T23:00:00+01:00"
    );
}

#[test]
fn test_update_request_version_is_optional() {
    let with_version: UpdateEntryRequest = serde_json::from_value(json!({
        "version": 3,
        "timezone": "UTC",
        "sleep_quality": 2
    }))
    .unwrap();
    assert_eq!(with_version.version, Some(3));
    assert_eq!(with_version.data.timezone, "UTC");

    let without_version: UpdateEntryRequest =
        serde_json::from_value(json!({ "timezone": "UTC" })).unwrap();
    assert_eq!(without_version.version, None);
    assert_eq!(without_version.data.sleep_quality, 0);
}

#[test]
fn test_entry_response_serialization() {
    let response: EntryResponse = serde_json::from_value(json!({
        "id": 7,
        "account_uuid": Uuid::nil(),
        "version": 2,
        "timezone": "Asia/Tokyo",
        "tried_to_sleep_at": "2024-03-11T07:00:00+09:00",
        "final_wake_up_at": "2024-03-11T14:30:00+09:00",
        "sleep_quality": 5
    }))
    .unwrap();

    let json_val = serde_json::to_value(&response).expect("Failed to serialize");

    // Flattened payload next to identity fields, absent optionals omitted.
    assert_eq!(json_val["id"], 7);
    assert_eq!(json_val["version"], 2);
    assert_eq!(json_val["account_uuid"], "00000000-0000-0000-0000-000000000000");
    assert_eq!(json_val["tried_to_sleep_at"], "2024-03-11T07:00:00+09:00");
    let object = json_val.as_object().unwrap();
    for absent in [
        "in_bed_at",
        "out_of_bed_at",
        "sleep_delay_in_min",
        "awakenings_count",
        "awakenings_total_duration_in_min",
        "comments",
    ] {
        assert!(!object.contains_key(absent), "{absent} should be omitted");
    }
}

#[test]
fn test_page_contract() {
    let page = Page::<EntryResponse> {
        total_count: 0,
        page_size: 100,
        page_number: 1,
        items: vec![],
    };

    assert_eq!(
        serde_json::to_value(&page).unwrap(),
        json!({"total_count": 0, "page_size": 100, "page_number": 1, "items": []})
    );
}

#[test]
fn test_error_body_contract() {
    let error = AppError::invalid(
        "invalid create data",
        vec!["timezone is required".to_string()],
    );
    assert_eq!(error.code(), ErrorCode::Invalid);

    let body = ErrorResponse {
        message: error.to_string(),
        code: error.code(),
        details: vec!["timezone is required".to_string()],
    };
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({
            "message": "invalid create data",
            "code": "ERR_INVALID",
            "details": ["timezone is required"]
        })
    );

    let conflict: ErrorResponse =
        serde_json::from_value(json!({"message": "version conflict", "code": "ERR_CONFLICT"}))
            .unwrap();
    assert_eq!(conflict.code, ErrorCode::Conflict);
    assert!(conflict.details.is_empty());
}
