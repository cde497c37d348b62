//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! The signer turns an `HttpRequest` into an `Authorization: OAuth ...`
//! header. Query parameters and form bodies are parsed back out of the
//! request, so it signs whatever the client built.

use std::fmt;

use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use uuid::Uuid;

use crate::http::{HttpMethod, HttpRequest};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A key/secret pair, used for both consumer and user token credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Signs requests for one consumer/token combination.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    consumer: Credentials,
    token: Credentials,
}

impl OAuthSigner {
    pub fn new(consumer: Credentials, token: Credentials) -> Self {
        Self { consumer, token }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer.key
    }

    pub fn token(&self) -> &str {
        &self.token.key
    }

    /// Authorization header value with a fresh nonce and the current time.
    pub fn authorization(&self, request: &HttpRequest) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        self.authorization_with(request, &nonce, timestamp)
    }

    pub(crate) fn authorization_with(&self, request: &HttpRequest, nonce: &str, timestamp: i64) -> String {
        let mut oauth = self.protocol_params(nonce, timestamp);
        let signature = self.signature(request, &oauth);
        oauth.push(("oauth_signature".to_string(), signature));
        oauth.sort();

        let parts: Vec<String> = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect();
        format!("OAuth {}", parts.join(", "))
    }

    fn protocol_params(&self, nonce: &str, timestamp: i64) -> Vec<(String, String)> {
        vec![
            ("oauth_consumer_key".to_string(), self.consumer.key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.token.key.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    fn signature(&self, request: &HttpRequest, oauth: &[(String, String)]) -> String {
        let base = signature_base_string(request, oauth);
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer.secret),
            percent_encode(&self.token.secret)
        );
        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC can take any size");
        mac.update(base.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// `METHOD&enc(base-uri)&enc(normalized-params)` per RFC 5849 section 3.4.1.
pub(crate) fn signature_base_string(request: &HttpRequest, oauth: &[(String, String)]) -> String {
    let (base_uri, mut params) = match url::Url::parse(&request.url) {
        Ok(url) => {
            let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
            let base = format!(
                "{}://{}{}{}",
                url.scheme(),
                url.host_str().unwrap_or_default().to_ascii_lowercase(),
                port,
                url.path()
            );
            let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            (base, query)
        }
        Err(_) => (request.url.clone(), Vec::new()),
    };

    if request.method == HttpMethod::Post && is_form(request) {
        if let Some(body) = &request.body {
            params.extend(url::form_urlencoded::parse(body.as_bytes()).into_owned());
        }
    }
    params.extend(oauth.iter().cloned());

    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        request.method.as_str(),
        percent_encode(&base_uri),
        percent_encode(&normalized)
    )
}

fn is_form(request: &HttpRequest) -> bool {
    request
        .header("content-type")
        .map(|ct| ct.starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

/// RFC 3986 encoding: everything except `A-Z a-z 0-9 - . _ ~` is escaped.
fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}
