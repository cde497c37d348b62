//! Decoded Tumblr API responses.
//!
//! Every Tumblr v2 endpoint wraps its payload in an envelope:
//! `{"meta": {"status": 200, "msg": "OK"}, "response": {...}}`. Error bodies
//! frequently add an `errors` array next to `meta`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::http::{find_header, HttpResponse};

/// The `meta` block of a Tumblr envelope.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Meta {
    pub status: u16,
    pub msg: String,
}

/// One entry of the `errors` array on failed requests.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ResponseError {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub detail: String,
}

#[derive(Deserialize)]
struct Envelope {
    meta: Option<Meta>,
    response: Option<Value>,
    #[serde(default)]
    errors: Vec<ResponseError>,
}

/// A response with its raw body and the decoded envelope.
///
/// Decoding is lenient: a body that is not a JSON envelope (an empty redirect
/// body, an HTML error page) leaves `meta` and `result` as `None`.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub meta: Option<Meta>,
    pub result: Option<Value>,
    pub errors: Vec<ResponseError>,
}

impl Response {
    pub fn new(raw: HttpResponse) -> Self {
        let (meta, result, errors) = match serde_json::from_str::<Envelope>(&raw.body) {
            Ok(env) => (env.meta, env.response, env.errors),
            Err(_) => (None, None, Vec::new()),
        };
        Self {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            meta,
            result,
            errors,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Deserialize the envelope's `response` payload into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| ApiError::Deserialization("response payload missing".to_string()))?;
        T::deserialize(result).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}
