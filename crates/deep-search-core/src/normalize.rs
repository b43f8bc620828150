//! Canonicalizes whatever the engine returned into `{answer?, results}`.
//!
//! Observed engine payloads drift between versions: a bare result array, an
//! `{answer, results}` object, an `Error:`-prefixed string, or plain prose. Every
//! consumer downstream of this module sees one shape.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Literal prefix the engine uses to signal a failure in-band.
pub const ENGINE_ERROR_PREFIX: &str = "Error:";

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NormalizedResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub results: Vec<ResultItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultItem {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Provider-specific fields we carry along without interpreting.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The decoded forms a raw engine payload can take.
#[derive(Debug, Clone, PartialEq)]
pub enum RawShape {
    Error(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
    /// Not JSON, or JSON that is neither an array nor an object.
    Text(String),
}

impl RawShape {
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with(ENGINE_ERROR_PREFIX) {
            return Self::Error(raw.to_string());
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => Self::Array(items),
            Ok(Value::Object(obj)) => Self::Object(obj),
            Ok(_) | Err(_) => Self::Text(raw.to_string()),
        }
    }
}

pub fn normalize(raw: &str) -> Result<NormalizedResult> {
    match RawShape::classify(raw) {
        RawShape::Error(msg) => Err(Error::Engine(msg)),
        RawShape::Array(items) => Ok(NormalizedResult {
            answer: None,
            results: items.into_iter().map(ResultItem::from_value).collect(),
        }),
        RawShape::Object(mut obj) => {
            let answer = obj.remove("answer").and_then(text_of);
            let results = match obj.remove("results") {
                Some(Value::Array(items)) => {
                    items.into_iter().map(ResultItem::from_value).collect()
                }
                _ => Vec::new(),
            };
            Ok(NormalizedResult { answer, results })
        }
        RawShape::Text(text) => Ok(NormalizedResult {
            answer: Some(text),
            results: Vec::new(),
        }),
    }
}

impl ResultItem {
    pub fn from_value(v: Value) -> Self {
        let Value::Object(mut obj) = v else {
            return Self {
                title: text_of(v).unwrap_or_default(),
                ..Self::default()
            };
        };
        let title = obj.remove("title").and_then(text_of).unwrap_or_default();
        let url = obj.remove("url").and_then(text_of).filter(|s| !s.is_empty());
        let link = obj.remove("link").and_then(text_of).filter(|s| !s.is_empty());
        let snippet = obj.remove("snippet").and_then(text_of);
        Self {
            title,
            url: url.or(link).unwrap_or_default(),
            snippet,
            extra: obj,
        }
    }
}

fn text_of(v: Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn array_with_link_and_url_items() {
        let raw = r#"[{"title":"A","link":"http://a"},{"title":"B","url":"http://b","snippet":"s"}]"#;
        let n = normalize(raw).unwrap();
        assert_eq!(n.answer, None);
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({"results": [
                {"title": "A", "url": "http://a"},
                {"title": "B", "url": "http://b", "snippet": "s"}
            ]})
        );
    }

    #[test]
    fn object_answer_and_empty_results() {
        let n = normalize(r#"{"answer":"42","results":[]}"#).unwrap();
        assert_eq!(n.answer.as_deref(), Some("42"));
        assert!(n.results.is_empty());
    }

    #[test]
    fn object_missing_fields_map_to_absent_and_empty() {
        let n = normalize(r#"{"provider":"brave"}"#).unwrap();
        assert_eq!(n, NormalizedResult::default());
    }

    #[test]
    fn plain_text_becomes_answer() {
        let n = normalize("not json").unwrap();
        assert_eq!(n.answer.as_deref(), Some("not json"));
        assert!(n.results.is_empty());
    }

    #[test]
    fn json_scalars_are_treated_as_text() {
        assert_eq!(RawShape::classify("42"), RawShape::Text("42".into()));
        let n = normalize(r#""quoted""#).unwrap();
        assert_eq!(n.answer.as_deref(), Some(r#""quoted""#));
    }

    #[test]
    fn error_prefix_fails_verbatim() {
        let e = normalize("Error: quota exceeded").unwrap_err();
        assert_eq!(e, Error::Engine("Error: quota exceeded".into()));
    }

    #[test]
    fn error_prefix_is_case_sensitive() {
        let n = normalize("error: lowercase is prose").unwrap();
        assert_eq!(n.answer.as_deref(), Some("error: lowercase is prose"));
    }

    #[test]
    fn url_wins_over_link_and_extras_pass_through() {
        let item = ResultItem::from_value(json!({
            "title": "T",
            "url": "http://u",
            "link": "http://l",
            "rank": 3,
            "source": "brave"
        }));
        assert_eq!(item.url, "http://u");
        assert_eq!(item.extra.get("rank"), Some(&json!(3)));
        assert_eq!(item.extra.get("source"), Some(&json!("brave")));
        assert!(!item.extra.contains_key("link"));
    }

    #[test]
    fn empty_url_falls_back_to_link() {
        let item = ResultItem::from_value(json!({"title": "T", "url": "", "link": "http://l"}));
        assert_eq!(item.url, "http://l");
    }

    #[test]
    fn object_results_keep_source_order() {
        let raw = json!({
            "answer": "a",
            "results": [{"title": "3", "url": "u3"}, {"title": "1", "url": "u1"}, {"title": "2", "url": "u2"}]
        })
        .to_string();
        let n = normalize(&raw).unwrap();
        let titles: Vec<_> = n.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["3", "1", "2"]);
    }

    #[test]
    fn empty_snippet_passes_through() {
        let n = normalize(r#"{"results":[{"title":"T","url":"u","snippet":""}]}"#).unwrap();
        assert_eq!(n.results[0].snippet.as_deref(), Some(""));
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({"results": [{"title": "T", "url": "u", "snippet": ""}]})
        );
    }

    #[test]
    fn non_object_items_become_title_only() {
        let n = normalize(r#"["just a string", 7]"#).unwrap();
        assert_eq!(n.results[0].title, "just a string");
        assert_eq!(n.results[1].title, "7");
        assert!(n.results.iter().all(|r| r.url.is_empty()));
    }

    proptest! {
        #[test]
        fn error_prefixed_inputs_always_fail_with_same_message(tail in ".*") {
            let raw = format!("Error:{tail}");
            prop_assert_eq!(normalize(&raw), Err(Error::Engine(raw.clone())));
        }

        #[test]
        fn non_json_inputs_become_answer(raw in "[a-zA-Z ]{1,40}[.!?]") {
            prop_assume!(!raw.starts_with(ENGINE_ERROR_PREFIX));
            prop_assume!(serde_json::from_str::<Value>(&raw).is_err());
            let n = normalize(&raw).unwrap();
            prop_assert_eq!(n.answer.as_deref(), Some(raw.as_str()));
            prop_assert!(n.results.is_empty());
        }

        #[test]
        fn arrays_preserve_length_and_order(titles in proptest::collection::vec("[a-z]{1,8}", 0..12)) {
            let items: Vec<Value> = titles
                .iter()
                .map(|t| json!({"title": t, "link": format!("http://{t}")}))
                .collect();
            let n = normalize(&Value::Array(items).to_string()).unwrap();
            prop_assert!(n.answer.is_none());
            let got: Vec<String> = n.results.iter().map(|r| r.title.clone()).collect();
            prop_assert_eq!(got, titles);
        }

        #[test]
        fn normalization_is_deterministic(raw in ".{0,64}") {
            prop_assert_eq!(normalize(&raw), normalize(&raw));
        }
    }
}
