use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 1000;
pub const MAX_COMMENT_LENGTH: usize = 2048;

/// Subjective sleep rating, stored as its ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[repr(i32)]
pub enum SleepQuality {
    VeryPoor = 1,
    Poor = 2,
    Average = 3,
    Good = 4,
    Excellent = 5,
}

impl SleepQuality {
    pub const MIN: SleepQuality = SleepQuality::VeryPoor;
    pub const MAX: SleepQuality = SleepQuality::Excellent;

    pub fn ordinal(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            SleepQuality::VeryPoor => "Very Poor",
            SleepQuality::Poor => "Poor",
            SleepQuality::Average => "Average",
            SleepQuality::Good => "Good",
            SleepQuality::Excellent => "Excellent",
        }
    }
}

impl TryFrom<i32> for SleepQuality {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SleepQuality::VeryPoor),
            2 => Ok(SleepQuality::Poor),
            3 => Ok(SleepQuality::Average),
            4 => Ok(SleepQuality::Good),
            5 => Ok(SleepQuality::Excellent),
            other => Err(other),
        }
    }
}

impl fmt::Display for SleepQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Storage representation (UTC instants + zone name)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SleepDiaryEntry {
    pub id: i64,
    pub account_uuid: Uuid,
    pub timezone: String,
    pub in_bed_at: Option<DateTime<Utc>>,
    pub tried_to_sleep_at: DateTime<Utc>,
    pub sleep_delay_in_min: Option<i32>,
    pub awakenings_count: Option<i32>,
    pub awakenings_total_duration_in_min: Option<i32>,
    pub final_wake_up_at: DateTime<Utc>,
    pub out_of_bed_at: Option<DateTime<Utc>>,
    pub sleep_quality: SleepQuality,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// The fields a caller may replace on update.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFields {
    pub timezone: String,
    pub in_bed_at: Option<DateTime<Utc>>,
    pub tried_to_sleep_at: DateTime<Utc>,
    pub sleep_delay_in_min: Option<i32>,
    pub awakenings_count: Option<i32>,
    pub awakenings_total_duration_in_min: Option<i32>,
    pub final_wake_up_at: DateTime<Utc>,
    pub out_of_bed_at: Option<DateTime<Utc>>,
    pub sleep_quality: SleepQuality,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub account_uuid: Uuid,
    pub fields: EntryFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryUpdate {
    pub id: i64,
    /// `None` means last-writer-wins.
    pub expected_version: Option<i64>,
    pub fields: EntryFields,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntrySearch {
    pub account_uuids: Vec<Uuid>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub page_size: i64,
    pub page_number: i64,
}

impl EntrySearch {
    pub fn offset(&self) -> i64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

/// Entry payload as sent by clients. Required values are still optional here so
/// that a missing or out-of-range value is reported by validation instead of
/// failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryData {
    #[serde(default)]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_bed_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub tried_to_sleep_at: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_delay_in_min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awakenings_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awakenings_total_duration_in_min: Option<i32>,
    #[serde(default)]
    pub final_wake_up_at: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_of_bed_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub sleep_quality: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    #[serde(default)]
    pub account_uuid: String,
    #[serde(flatten)]
    pub data: EntryData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(flatten)]
    pub data: EntryData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryResponse {
    pub id: i64,
    pub account_uuid: Uuid,
    pub version: i64,
    #[serde(flatten)]
    pub data: EntryData,
}

/// Search criteria after query decoding and defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepDiaryFilter {
    pub account_uuids: Vec<String>,
    pub from_date: Option<DateTime<FixedOffset>>,
    pub to_date: Option<DateTime<FixedOffset>>,
    pub page_size: i64,
    pub page_number: i64,
}

/// Raw query string of `GET /sleep_diary/entries`. `account_uuid` may repeat.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryQuery {
    #[serde(default)]
    pub account_uuid: Vec<String>,
    pub from_date: Option<DateTime<FixedOffset>>,
    pub to_date: Option<DateTime<FixedOffset>>,
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
}

impl From<EntryQuery> for SleepDiaryFilter {
    fn from(query: EntryQuery) -> Self {
        SleepDiaryFilter {
            account_uuids: query.account_uuid,
            from_date: query.from_date,
            to_date: query.to_date,
            page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            page_number: query.page_number.unwrap_or(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub total_count: i64,
    pub page_size: i64,
    pub page_number: i64,
    pub items: Vec<T>,
}
