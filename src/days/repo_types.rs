use serde_json::{Map, Value};
use sqlx::FromRow;

/// Day row as stored; `payload` holds serialized JSON object text.
#[derive(Debug, Clone, FromRow)]
pub struct DayRow {
    pub id: i64,
    pub user_id: i64,
    pub date: String,
    pub payload: String,
    pub created_at: i64,
}

impl DayRow {
    /// Parses the stored payload back into an object. Empty text means `{}`.
    pub fn payload_object(&self) -> Result<Map<String, Value>, serde_json::Error> {
        if self.payload.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&self.payload)
    }
}
