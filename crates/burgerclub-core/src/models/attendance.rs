use serde::{Deserialize, Serialize};

use super::null_as_default;

/// "This person was at the tasting" (`attendees` table).
///
/// Rows are admin-entered, inferred from a rating (`source_rating` set), or
/// `"Unknown N"` placeholders written by the historical backfill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    #[serde(rename = "burger_id")]
    pub item_id: i64,
    #[serde(rename = "name", default, deserialize_with = "null_as_default")]
    pub person_name: String,
    #[serde(rename = "rating_id", default)]
    pub source_rating: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAttendance {
    pub burger_id: i64,
    pub name: String,
    pub rating_id: Option<i64>,
}

/// A known rater/attendee name (`members` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub name: String,
}
