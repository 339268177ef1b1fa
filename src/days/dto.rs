use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::repo_types::DayRow;
use crate::error::FieldError;
use crate::validation::Validate;

#[derive(Debug, Deserialize)]
pub struct CreateDayRequest {
    pub date: String,
    pub payload: Map<String, Value>,
}

// `date` is an opaque key: presence is checked by deserialization alone.
impl Validate for CreateDayRequest {
    fn validate(&mut self) -> Result<(), Vec<FieldError>> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub id: i64,
    pub date: String,
    pub payload: Map<String, Value>,
    pub created_at: i64,
}

impl TryFrom<DayRow> for DayResponse {
    type Error = serde_json::Error;

    fn try_from(row: DayRow) -> Result<Self, Self::Error> {
        let payload = row.payload_object()?;
        Ok(Self {
            id: row.id,
            date: row.date,
            payload,
            created_at: row.created_at,
        })
    }
}
