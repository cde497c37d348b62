//! Error types for the Tumblr API client.
//!
//! # Design
//! Non-success statuses keep the decoded `Response` inside the error, so a
//! caller can still read the API's `meta.msg` or `errors` payload after a
//! failed call. Transport and body-read failures wrap the underlying `ureq`
//! error untouched.

use thiserror::Error;

use crate::response::Response;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A request was attempted before `set_consumer` was ever called.
    #[error("consumer credentials are not set")]
    MissingConsumerCredentials,

    /// The request could not be sent or no response arrived.
    #[error("transport error: {0}")]
    Transport(#[source] ureq::Error),

    /// A response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] ureq::Error),

    /// The server answered with a status outside `[200, 400)`.
    #[error("{status_line}")]
    Status {
        status_line: String,
        response: Box<Response>,
    },

    /// The response payload did not match the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// The decoded response attached to a `Status` error.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ApiError::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }
}
