//! Raw dataset records.
//!
//! The explore v2.1 API returns `{"results": [{...}]}` with flat records. The
//! legacy records API returns `{"records": [{"fields": {...}}]}`. Both are
//! accepted; anything else is a [`FetchError::Schema`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FetchError, FetchResult};

/// The first record of a query, fields kept as the API sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub location: String,
    pub zones: String,
    pub annee_scolaire: String,
}

impl RawRecord {
    /// Extracts the first record from a response body.
    pub fn from_body(body: &[u8]) -> FetchResult<Self> {
        let payload: Value =
            serde_json::from_slice(body).map_err(|_| FetchError::schema("body"))?;
        Self::from_payload(&payload)
    }

    /// Extracts the first record from a parsed response payload.
    pub fn from_payload(payload: &Value) -> FetchResult<Self> {
        let list = payload
            .get("results")
            .or_else(|| payload.get("records"))
            .ok_or_else(|| FetchError::schema("results"))?
            .as_array()
            .ok_or_else(|| FetchError::schema("results"))?;

        let first = list.first().ok_or(FetchError::NoData)?;
        let record = first
            .get("fields")
            .unwrap_or(first)
            .as_object()
            .ok_or_else(|| FetchError::schema("results[0]"))?;

        Ok(Self {
            start_date: text_field(record, "start_date")?,
            end_date: text_field(record, "end_date")?,
            description: text_field(record, "description")?,
            location: text_field(record, "location")?,
            zones: text_field(record, "zones")?,
            annee_scolaire: text_field(record, "annee_scolaire")?,
        })
    }
}

fn text_field(record: &Map<String, Value>, name: &str) -> FetchResult<String> {
    record
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| FetchError::schema(name))
}
