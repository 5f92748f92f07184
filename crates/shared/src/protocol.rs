//! OMDb search wire format.
//!
//! Bodies are decoded into these transport DTOs first and mapped into domain
//! records in one pass. Individual entries that fail to decode are dropped;
//! only an unrecognizable envelope fails the whole response.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    domain::{RecordId, ResultRecord, ResultSet},
    error::ErrorInfo,
};

pub const RESPONSE_TRUE: &str = "True";
pub const RESPONSE_FALSE: &str = "False";
pub const POSTER_UNAVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
pub struct SearchResponseDto {
    #[serde(rename = "Response")]
    pub response: Option<String>,
    #[serde(rename = "Search")]
    pub search: Option<Vec<Value>>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchEntryDto {
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
}

impl SearchResponseDto {
    pub fn from_slice(body: &[u8]) -> Result<Self, ErrorInfo> {
        serde_json::from_slice(body)
            .map_err(|err| ErrorInfo::malformed(format!("invalid search JSON payload: {err}")))
    }

    pub fn into_result_set(self) -> Result<ResultSet, ErrorInfo> {
        match self.response.as_deref() {
            Some(RESPONSE_TRUE) => {
                let entries = self.search.ok_or_else(|| {
                    ErrorInfo::malformed("successful response is missing the Search array")
                })?;
                Ok(entries
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, raw)| decode_entry(index, raw))
                    .collect())
            }
            Some(RESPONSE_FALSE) => Err(ErrorInfo::no_results(self.error.unwrap_or_default())),
            Some(other) => Err(ErrorInfo::malformed(format!(
                "unrecognized Response value '{other}'"
            ))),
            None => Err(ErrorInfo::malformed("response is missing the Response field")),
        }
    }
}

fn decode_entry(index: usize, raw: Value) -> Option<ResultRecord> {
    let entry = match serde_json::from_value::<SearchEntryDto>(raw) {
        Ok(entry) => entry,
        Err(err) => {
            debug!(index, error = %err, "dropping undecodable search entry");
            return None;
        }
    };

    match entry.into_record() {
        Ok(record) => Some(record),
        Err(reason) => {
            debug!(index, reason, "dropping incomplete search entry");
            None
        }
    }
}

impl SearchEntryDto {
    pub fn into_record(self) -> Result<ResultRecord, &'static str> {
        let id = non_blank(self.imdb_id).ok_or("missing imdbID")?;
        let title = non_blank(self.title).ok_or("missing Title")?;
        let year = non_blank(self.year).ok_or("missing Year")?;
        let poster = self.poster.ok_or("missing Poster")?;

        let poster = poster.trim();
        let poster_url = if poster.is_empty() || poster == POSTER_UNAVAILABLE {
            None
        } else {
            Some(poster.to_string())
        };

        Ok(ResultRecord {
            id: RecordId(id),
            title,
            year,
            poster_url,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
