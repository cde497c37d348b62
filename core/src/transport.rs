//! Signed, blocking HTTP transport backed by a `ureq` agent.
//!
//! The agent never follows redirects and never turns 4xx/5xx statuses into
//! errors; both are left for the client to interpret. Only failures to send
//! the request or read the body surface as `ApiError`.

use std::fmt;

use ureq::{Agent, RequestBuilder};

use crate::auth::OAuthSigner;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A `ureq` agent paired with the signer for one credential set.
#[derive(Clone)]
pub struct Transport {
    agent: Agent,
    signer: OAuthSigner,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport").field("signer", &self.signer).finish_non_exhaustive()
    }
}

impl Transport {
    pub fn new(signer: OAuthSigner) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent();
        Self { agent, signer }
    }

    pub fn signer(&self) -> &OAuthSigner {
        &self.signer
    }

    /// Sign `request`, send it and read the full response.
    pub fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        let authorization = self.signer.authorization(&request);
        request.headers.push(("Authorization".to_string(), authorization));

        let sent = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&request.url), &request.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&request.url), &request.headers).call(),
            HttpMethod::Put => with_headers(self.agent.put(&request.url), &request.headers).send_empty(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(&request.url), &request.headers);
                match request.body.as_deref() {
                    Some(body) => builder.send(body),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = sent.map_err(ApiError::Transport)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        // No size cap; invalid UTF-8 is replaced rather than rejected.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(ApiError::BodyRead)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
