//! Request field normalization
//!
//! Callers send identifiers in snake_case or camelCase, in the JSON body or
//! the query string, as strings or numbers. Each field is resolved by trying
//! candidate keys against each source in order and taking the first
//! non-empty trimmed value.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::{directory::CarrierFilter, response_log::ResponseDraft};

pub const MC_NUMBER: &[&str] = &["mc_number", "mcNumber"];
pub const DOT_NUMBER: &[&str] = &["dot_number", "dotNumber"];

/// One place a field value can come from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Json(&'a Map<String, Value>),
    Query(&'a HashMap<String, String>),
}

impl Source<'_> {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Json(object) => object.get(key).and_then(scalar_text),
            Self::Query(query) => query.get(key).cloned(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub fn first_non_empty(sources: &[Source<'_>], keys: &[&str]) -> Option<String> {
    sources.iter().find_map(|source| {
        keys.iter().find_map(|key| {
            source
                .get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
    })
}

/// Parses a request body as a JSON object. Empty, malformed, or non-object
/// bodies yield an empty object so query fallbacks still apply.
pub fn body_object(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => object,
        _ => Map::new(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckParams {
    pub mc_number: Option<String>,
    pub dot_number: Option<String>,
}

impl CheckParams {
    pub fn resolve(body: &Map<String, Value>, query: &HashMap<String, String>) -> Self {
        let sources = [Source::Json(body), Source::Query(query)];
        Self {
            mc_number: first_non_empty(&sources, MC_NUMBER),
            dot_number: first_non_empty(&sources, DOT_NUMBER),
        }
    }
}

pub fn carrier_filter(query: &HashMap<String, String>) -> CarrierFilter {
    let sources = [Source::Query(query)];
    CarrierFilter {
        status: first_non_empty(&sources, &["status"]),
        city: first_non_empty(&sources, &["city"]),
        zip: first_non_empty(&sources, &["zip"]),
        name: first_non_empty(&sources, &["name"]),
        mc_number: first_non_empty(&sources, MC_NUMBER),
        dot_number: first_non_empty(&sources, DOT_NUMBER),
        limit: first_non_empty(&sources, &["limit"])
            .and_then(|limit| limit.parse::<usize>().ok())
            .filter(|limit| *limit > 0),
    }
}

/// Extracts the `response` object of a store request, or `None` when it is
/// missing or not an object.
pub fn response_payload(body: &Map<String, Value>) -> Option<&Map<String, Value>> {
    body.get("response").and_then(Value::as_object)
}

pub fn response_draft(payload: &Map<String, Value>) -> ResponseDraft {
    let sources = [Source::Json(payload)];
    ResponseDraft {
        carrier_mc: first_non_empty(&sources, &["carrier_mc", "carrierMc"]),
        carrier_name: first_non_empty(&sources, &["carrier_name", "carrierName"]),
        phone_number: first_non_empty(&sources, &["phone_number", "phoneNumber"]),
        dispatcher_name: first_non_empty(&sources, &["dispatcher_name", "dispatcherName"]),
        ..ResponseDraft::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn check_params_prefer_body_snake_case() {
        let body = object(json!({"mc_number": " 111 ", "mcNumber": "222"}));
        let params = CheckParams::resolve(&body, &query(&[("mc_number", "333")]));
        assert_eq!(params.mc_number.as_deref(), Some("111"));
        assert_eq!(params.dot_number, None);
    }

    #[test]
    fn check_params_fall_back_to_camel_case_then_query() {
        let body = object(json!({"mc_number": "  ", "dotNumber": 999}));
        let params = CheckParams::resolve(&body, &query(&[("mcNumber", "444")]));
        assert_eq!(params.mc_number.as_deref(), Some("444"));
        assert_eq!(params.dot_number.as_deref(), Some("999"));
    }

    #[test]
    fn non_scalar_values_count_as_absent() {
        let body = object(json!({"mc_number": null, "dot_number": ["1"]}));
        let params = CheckParams::resolve(&body, &HashMap::new());
        assert_eq!(params, CheckParams::default());
    }

    #[test]
    fn body_object_tolerates_garbage() {
        assert!(body_object(b"").is_empty());
        assert!(body_object(b"{").is_empty());
        assert!(body_object(b"[1,2]").is_empty());
        assert_eq!(body_object(br#"{"a":1}"#).len(), 1);
    }

    #[test]
    fn carrier_filter_parses_limit_and_ignores_blanks() {
        let filter = carrier_filter(&query(&[
            ("status", " active "),
            ("city", ""),
            ("dotNumber", "999"),
            ("limit", "5"),
        ]));
        assert_eq!(filter.status.as_deref(), Some("active"));
        assert_eq!(filter.city, None);
        assert_eq!(filter.dot_number.as_deref(), Some("999"));
        assert_eq!(filter.limit, Some(5));
    }

    #[test]
    fn carrier_filter_ignores_invalid_limit() {
        assert_eq!(carrier_filter(&query(&[("limit", "abc")])).limit, None);
        assert_eq!(carrier_filter(&query(&[("limit", "0")])).limit, None);
        assert_eq!(carrier_filter(&query(&[("limit", "-3")])).limit, None);
    }

    #[test]
    fn response_payload_requires_object() {
        assert!(response_payload(&object(json!({}))).is_none());
        assert!(response_payload(&object(json!({"response": null}))).is_none());
        assert!(response_payload(&object(json!({"response": "text"}))).is_none());
        assert!(response_payload(&object(json!({"response": {}}))).is_some());
    }

    #[test]
    fn response_draft_trims_and_nulls_empty_fields() {
        let payload = object(json!({
            "carrier_mc": 111,
            "carrierName": "  Acme ",
            "phone_number": "   ",
            "dispatcherName": "Dana"
        }));
        let draft = response_draft(&payload);

        assert_eq!(draft.carrier_mc.as_deref(), Some("111"));
        assert_eq!(draft.carrier_name.as_deref(), Some("Acme"));
        assert_eq!(draft.phone_number, None);
        assert_eq!(draft.dispatcher_name.as_deref(), Some("Dana"));
        assert_eq!(draft.carrier_status, None);
    }
}
