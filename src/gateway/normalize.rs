//! Translation of upstream payloads into the stable search contract.
//!
//! Keyword searches return `{results: [...], totalResults: n}`; entity
//! lookups return a single record object. Both become a [`SearchResponse`].
//! Absent, `null`, or structured field values become empty strings so every
//! key is always present.

use serde_json::{Map, Value};

use crate::gateway::error::GatewayError;
use crate::gateway::types::{SearchResponse, SearchResult};

/// Render a scalar upstream field as a string.
fn string_field(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub fn normalize_record(record: &Map<String, Value>) -> SearchResult {
    SearchResult {
        entity_number: string_field(record, "entityNumber"),
        entity_name: string_field(record, "entityName"),
        entity_status: string_field(record, "entityStatus"),
        entity_type: string_field(record, "entityType"),
        jurisdiction: string_field(record, "jurisdiction"),
        registration_date: string_field(record, "registrationDate"),
    }
}

fn malformed(message: impl std::fmt::Display) -> GatewayError {
    GatewayError::UpstreamError(format!("Malformed registry response: {}", message))
}

fn reported_total(value: Option<&Value>, fallback: usize) -> Result<u64, GatewayError> {
    match value {
        None | Some(Value::Null) => Ok(fallback as u64),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| malformed(format!("totalResults is not a count: {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| malformed(format!("totalResults is not a count: {:?}", s))),
        Some(other) => Err(malformed(format!("totalResults has type {}", type_name(other)))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize a keyword-search payload.
pub fn normalize_search(payload: &Value) -> Result<SearchResponse, GatewayError> {
    let body = payload
        .as_object()
        .ok_or_else(|| malformed(format!("expected object, got {}", type_name(payload))))?;

    let results = match body.get("results") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_object()
                    .map(normalize_record)
                    .ok_or_else(|| malformed(format!("result entry is {}", type_name(item))))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(malformed(format!("results has type {}", type_name(other)))),
    };

    let total_results = reported_total(body.get("totalResults"), results.len())?;

    Ok(SearchResponse {
        results,
        total_results,
    })
}

/// Normalize an entity-detail payload into a single-result response.
pub fn normalize_entity(payload: &Value) -> Result<SearchResponse, GatewayError> {
    let record = payload
        .as_object()
        .ok_or_else(|| malformed(format!("expected entity object, got {}", type_name(payload))))?;

    Ok(SearchResponse {
        results: vec![normalize_record(record)],
        total_results: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_become_empty_strings() {
        let payload = json!({
            "results": [{"entityNumber": "123", "entityName": "Acme"}],
            "totalResults": 1
        });

        let response = normalize_search(&payload).unwrap();
        assert_eq!(response.total_results, 1);
        assert_eq!(
            response.results,
            vec![SearchResult {
                entity_number: "123".into(),
                entity_name: "Acme".into(),
                ..Default::default()
            }]
        );

        let json = serde_json::to_value(&response).unwrap();
        let record = json["results"][0].as_object().unwrap();
        for key in [
            "entityNumber",
            "entityName",
            "entityStatus",
            "entityType",
            "jurisdiction",
            "registrationDate",
        ] {
            assert!(record[key].is_string(), "{} must be a string", key);
        }
    }

    #[test]
    fn test_total_is_upstream_count_not_length() {
        let payload = json!({
            "results": [{"entityNumber": "1"}, {"entityNumber": "2"}],
            "totalResults": 250
        });
        let response = normalize_search(&payload).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.total_results, 250);
    }

    #[test]
    fn test_scalar_and_null_fields() {
        let payload = json!({
            "results": [{
                "entityNumber": 4455,
                "entityName": null,
                "entityStatus": true,
                "jurisdiction": {"state": "CA"}
            }],
            "totalResults": "1"
        });
        let response = normalize_search(&payload).unwrap();
        let record = &response.results[0];
        assert_eq!(record.entity_number, "4455");
        assert_eq!(record.entity_name, "");
        assert_eq!(record.entity_status, "true");
        assert_eq!(record.jurisdiction, "");
        assert_eq!(response.total_results, 1);
    }

    #[test]
    fn test_empty_payload_is_empty_result() {
        let response = normalize_search(&json!({})).unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.total_results, 0);
    }

    #[test]
    fn test_malformed_search_payloads() {
        for payload in [
            json!([]),
            json!({"results": "nope"}),
            json!({"results": [1, 2]}),
            json!({"results": [], "totalResults": -3}),
            json!({"results": [], "totalResults": [1]}),
        ] {
            assert!(
                matches!(normalize_search(&payload), Err(GatewayError::UpstreamError(_))),
                "payload {} should be rejected",
                payload
            );
        }
    }

    #[test]
    fn test_entity_detail_becomes_single_result() {
        let payload = json!({
            "entityNumber": "C0806592",
            "entityName": "ACME CORPORATION",
            "entityStatus": "Active",
            "entityType": "Stock Corporation",
            "jurisdiction": "California",
            "registrationDate": "1977-03-01"
        });
        let response = normalize_entity(&payload).unwrap();
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].entity_name, "ACME CORPORATION");
        assert_eq!(response.results[0].registration_date, "1977-03-01");
    }

    #[test]
    fn test_entity_detail_must_be_object() {
        assert!(matches!(
            normalize_entity(&Value::Null),
            Err(GatewayError::UpstreamError(_))
        ));
    }
}
