use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::InvalidQuery;

/// Catalog identifier of a single search result (the OMDb `imdbID`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One catalog entry. Two records are equal when their identifiers are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: RecordId,
    pub title: String,
    pub year: String,
    pub poster_url: Option<String>,
}

impl PartialEq for ResultRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResultRecord {}

impl Hash for ResultRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Records in the order the server returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<ResultRecord>,
}

impl ResultSet {
    pub fn new(records: Vec<ResultRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &RecordId) -> Option<&ResultRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }
}

impl FromIterator<ResultRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ResultRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ResultRecord;
    type IntoIter = std::slice::Iter<'a, ResultRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Immutable search request: endpoint, credential and term.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchQuery {
    base_url: Url,
    api_key: String,
    term: String,
}

impl SearchQuery {
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        term: impl AsRef<str>,
    ) -> Result<Self, InvalidQuery> {
        if base_url.cannot_be_a_base() {
            return Err(InvalidQuery::BaseUrl {
                url: base_url.to_string(),
                reason: "url cannot carry query parameters".to_string(),
            });
        }

        let term = term.as_ref().trim();
        if term.is_empty() {
            return Err(InvalidQuery::EmptyTerm);
        }

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            term: term.to_string(),
        })
    }

    pub fn parse(
        base_url: &str,
        api_key: impl Into<String>,
        term: impl AsRef<str>,
    ) -> Result<Self, InvalidQuery> {
        let url = Url::parse(base_url.trim()).map_err(|err| InvalidQuery::BaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        Self::new(url, api_key, term)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Full request URL with `apikey` and `s` appended as encoded query pairs.
    pub fn request_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair("s", &self.term);
        url
    }
}

impl fmt::Debug for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchQuery")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("term", &self.term)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
