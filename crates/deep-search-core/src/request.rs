//! Typed requests parsed out of a loosely-typed argument bag.
//!
//! Both front ends hand the dispatcher the same camelCase JSON object. The MCP
//! surface sends real JSON types; the CLI sends everything as strings, so scalar
//! fields accept either form.

use crate::{Error, ModelClass, Provider, Result};
use serde::Serialize;
use serde_json::Value;

pub type ArgumentBag = serde_json::Map<String, Value>;

pub const DEFAULT_MAX_RESULTS: usize = 10;
/// Upper bound for `maxResults`; larger requests are clamped.
pub const MAX_RESULTS_CAP: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub provider: Provider,
    pub max_results: usize,
    pub include_answer: bool,
    /// Original `maxResults` when it was above the cap.
    #[serde(skip)]
    pub clamped_from: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchRequest {
    pub query: String,
    pub model_class: ModelClass,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            provider: Provider::default(),
            max_results: DEFAULT_MAX_RESULTS,
            include_answer: false,
            clamped_from: None,
        }
    }

    pub fn from_args(args: &ArgumentBag) -> Result<Self> {
        let query = required_query(args)?;
        let provider = match opt_str(args, "provider")? {
            Some(s) => s.parse()?,
            None => Provider::default(),
        };
        let (max_results, clamped_from) = max_results(args)?;
        let include_answer = opt_bool(args, "includeAnswer")?.unwrap_or(false);
        Ok(Self {
            query,
            provider,
            max_results,
            include_answer,
            clamped_from,
        })
    }
}

impl ResearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            model_class: ModelClass::default(),
        }
    }

    pub fn from_args(args: &ArgumentBag) -> Result<Self> {
        let query = required_query(args)?;
        let model_class = match opt_str(args, "modelClass")? {
            Some(s) => s.parse()?,
            None => ModelClass::default(),
        };
        Ok(Self { query, model_class })
    }
}

/// JSON `null` and a missing key mean the same thing.
fn field<'a>(args: &'a ArgumentBag, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|v| !v.is_null())
}

fn required_query(args: &ArgumentBag) -> Result<String> {
    match field(args, "query") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(Error::InvalidArgument("query must not be empty".into())),
        Some(other) => Err(Error::InvalidArgument(format!(
            "query must be a string (got {})",
            json_kind(other)
        ))),
        None => Err(Error::InvalidArgument("query is required".into())),
    }
}

fn opt_str<'a>(args: &'a ArgumentBag, key: &str) -> Result<Option<&'a str>> {
    match field(args, key) {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(Error::InvalidArgument(format!(
            "{key} must be a string (got {})",
            json_kind(other)
        ))),
    }
}

fn opt_bool(args: &ArgumentBag, key: &str) -> Result<Option<bool>> {
    match field(args, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" | "" => Ok(Some(false)),
            _ => Err(Error::InvalidArgument(format!(
                "{key} must be a boolean (got {s:?})"
            ))),
        },
        Some(other) => Err(Error::InvalidArgument(format!(
            "{key} must be a boolean (got {})",
            json_kind(other)
        ))),
    }
}

/// The effective count, plus the requested one when it had to be clamped.
fn max_results(args: &ArgumentBag) -> Result<(usize, Option<u64>)> {
    let n: i128 = match field(args, "maxResults") {
        None => return Ok((DEFAULT_MAX_RESULTS, None)),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i as i128
            } else if let Some(u) = n.as_u64() {
                u as i128
            } else {
                // Accept 10.0, reject 10.5.
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() != 0.0 || !f.is_finite() {
                    return Err(Error::InvalidArgument(format!(
                        "maxResults must be a whole number (got {n})"
                    )));
                }
                f as i128
            }
        }
        Some(Value::String(s)) => s.trim().parse::<i128>().map_err(|_| {
            Error::InvalidArgument(format!("maxResults must be a positive integer (got {s:?})"))
        })?,
        Some(other) => {
            return Err(Error::InvalidArgument(format!(
                "maxResults must be a number (got {})",
                json_kind(other)
            )))
        }
    };
    if n < 1 {
        return Err(Error::InvalidArgument(format!(
            "maxResults must be at least 1 (got {n})"
        )));
    }
    if n > MAX_RESULTS_CAP as i128 {
        let requested = u64::try_from(n).unwrap_or(u64::MAX);
        return Ok((MAX_RESULTS_CAP, Some(requested)));
    }
    Ok((n as usize, None))
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
