//! Request and response types of the search contract.

use serde::{Deserialize, Serialize};

use crate::gateway::error::GatewayError;

/// Raw query-string parameters accepted by the search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "search-term")]
    pub search_term: Option<String>,
    #[serde(rename = "entity-number")]
    pub entity_number: Option<String>,
}

/// A validated lookup: exactly one of a free-text term or an entity number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Term(String),
    EntityNumber(String),
}

impl SearchQuery {
    /// Validate raw parameters. Blank values count as absent.
    pub fn from_params(params: SearchParams) -> Result<Self, GatewayError> {
        let term = non_blank(params.search_term);
        let entity = non_blank(params.entity_number);

        match (term, entity) {
            (Some(term), None) => Ok(SearchQuery::Term(term)),
            (None, Some(number)) => Ok(SearchQuery::EntityNumber(number)),
            (None, None) => Err(GatewayError::InvalidRequest(
                "Either search-term or entity-number is required".to_string(),
            )),
            (Some(_), Some(_)) => Err(GatewayError::InvalidRequest(
                "Provide either search-term or entity-number, not both".to_string(),
            )),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchQuery::Term(_) => "keyword",
            SearchQuery::EntityNumber(_) => "entity",
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A normalized registry record. Missing upstream fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub entity_number: String,
    pub entity_name: String,
    pub entity_status: String,
    pub entity_type: String,
    pub jurisdiction: String,
    pub registration_date: String,
}

/// Normalized search payload.
///
/// `total_results` is the count the upstream reported and may exceed
/// `results.len()` when the upstream truncates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total_results: u64,
}
