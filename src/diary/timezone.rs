// Conversion between caller wall-clock timestamps and stored UTC instants.
//
// Writes keep whatever offset the caller sent only long enough to turn it into
// a UTC instant (millisecond precision). Reads project the instant back into
// the entry's IANA zone, so the offset reflects DST at that instant.

use chrono::{DateTime, FixedOffset, SubsecRound, Utc};
use chrono_tz::Tz;

use super::models::{EntryData, EntryResponse, SleepDiaryEntry};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimezoneError {
    #[error("unknown timezone '{0}'")]
    UnknownZone(String),
}

pub fn resolve(name: &str) -> Result<Tz, TimezoneError> {
    name.parse::<Tz>()
        .map_err(|_| TimezoneError::UnknownZone(name.to_string()))
}

pub fn to_instant(timestamp: &DateTime<FixedOffset>) -> DateTime<Utc> {
    timestamp.with_timezone(&Utc).trunc_subsecs(3)
}

pub fn project(instant: DateTime<Utc>, zone: Tz) -> DateTime<FixedOffset> {
    instant.with_timezone(&zone).fixed_offset()
}

/// Renders a stored entry in its own timezone.
pub fn project_entry(entry: SleepDiaryEntry) -> Result<EntryResponse, TimezoneError> {
    let zone = resolve(&entry.timezone)?;
    let at = |instant: DateTime<Utc>| project(instant, zone);

    Ok(EntryResponse {
        id: entry.id,
        account_uuid: entry.account_uuid,
        version: entry.version,
        data: EntryData {
            in_bed_at: entry.in_bed_at.map(at),
            tried_to_sleep_at: Some(at(entry.tried_to_sleep_at)),
            sleep_delay_in_min: entry.sleep_delay_in_min,
            awakenings_count: entry.awakenings_count,
            awakenings_total_duration_in_min: entry.awakenings_total_duration_in_min,
            final_wake_up_at: Some(at(entry.final_wake_up_at)),
            out_of_bed_at: entry.out_of_bed_at.map(at),
            sleep_quality: entry.sleep_quality.ordinal(),
            comments: entry.comments,
            timezone: entry.timezone,
        },
    })
}
