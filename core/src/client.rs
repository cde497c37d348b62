//! Blocking Tumblr API client with a lazily built, cached signed transport.
//!
//! # Design
//! `TumblrClient` keeps consumer and user credentials plus a
//! `OnceLock<Transport>`. The transport is built on the first request and
//! reused until a credential setter clears it. Setters take `&mut self`, so
//! credentials can't change while a borrowed request is in flight.
//!
//! Each verb goes through the same two steps: `build_request` (pure URL and
//! body construction) and `Transport::execute`, followed by status
//! translation in `into_result`.

use std::sync::OnceLock;

use crate::auth::{Credentials, OAuthSigner, FORM_CONTENT_TYPE};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{append_path, request_uri, with_trailing_slash, HttpMethod, HttpRequest, HttpResponse, Params};
use crate::provider::TransportProvider;
use crate::resources::{self, BlogRef, PostRef};
use crate::response::Response;
use crate::transport::Transport;
use crate::types::{Likes, MiniPost, Post, SearchResults, User};

pub const API_BASE: &str = "https://api.tumblr.com/v2/";

#[derive(Debug, Default)]
pub struct TumblrClient {
    base_url: String,
    consumer: Option<Credentials>,
    token: Option<Credentials>,
    transport: OnceLock<Transport>,
}

impl TumblrClient {
    /// Client with consumer credentials only (app-only signing).
    pub fn new(consumer_key: &str, consumer_secret: &str) -> Self {
        let mut client = Self::unauthenticated();
        client.set_consumer(consumer_key, consumer_secret);
        client
    }

    pub fn with_token(consumer_key: &str, consumer_secret: &str, token: &str, token_secret: &str) -> Self {
        let mut client = Self::new(consumer_key, consumer_secret);
        client.set_token(token, token_secret);
        client
    }

    /// Client without any credentials; every request fails until
    /// `set_consumer` is called.
    pub fn unauthenticated() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            ..Self::default()
        }
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            base_url: with_trailing_slash(&config.base_url),
            consumer: Some(config.consumer),
            token: config.token,
            transport: OnceLock::new(),
        }
    }

    /// Point the client at another API root, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = with_trailing_slash(base_url);
        self
    }

    pub fn base_url(&self) -> &str {
        if self.base_url.is_empty() {
            API_BASE
        } else {
            &self.base_url
        }
    }

    pub fn set_consumer(&mut self, key: &str, secret: &str) {
        self.consumer = Some(Credentials::new(key, secret));
        self.transport.take();
    }

    pub fn set_token(&mut self, token: &str, secret: &str) {
        self.token = Some(Credentials::new(token, secret));
        self.transport.take();
    }

    /// The signed transport, built from the current credentials on first use.
    ///
    /// Without user credentials the transport signs with an empty token and
    /// secret.
    pub fn transport(&self) -> Result<&Transport> {
        let consumer = self.consumer.as_ref().ok_or(ApiError::MissingConsumerCredentials)?;
        Ok(self.transport.get_or_init(|| {
            let token = self.token.clone().unwrap_or_default();
            tracing::debug!(
                consumer_key = %consumer.key,
                app_only = self.token.is_none(),
                "tumblr.transport.build"
            );
            Transport::new(OAuthSigner::new(consumer.clone(), token))
        }))
    }

    /// Build the unsigned request for `endpoint`.
    ///
    /// POST carries `params` as a form body; the other verbs put them in the
    /// query string.
    pub fn build_request(&self, method: HttpMethod, endpoint: &str, params: &Params) -> HttpRequest {
        let url = append_path(self.base_url(), endpoint);
        match method {
            HttpMethod::Post => HttpRequest {
                method,
                url,
                headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
                body: Some(params.encode()),
            },
            _ => HttpRequest {
                method,
                url: request_uri(&url, params),
                headers: Vec::new(),
                body: None,
            },
        }
    }

    fn send(&self, method: HttpMethod, endpoint: &str, params: &Params) -> Result<Response> {
        let transport = self.transport()?;
        let request = self.build_request(method, endpoint, params);
        tracing::debug!(
            method = method.as_str(),
            endpoint,
            params = ?params.keys().collect::<Vec<_>>(),
            "tumblr.request.start"
        );
        into_result(transport.execute(request)?)
    }

    pub fn get_post(&self, id: u64, blog_name: &str) -> PostRef<'_, Self> {
        PostRef::new(
            self,
            MiniPost {
                id,
                blog_name: blog_name.to_string(),
                reblog_key: String::new(),
            },
        )
    }

    pub fn get_blog(&self, name: &str) -> BlogRef<'_, Self> {
        BlogRef::new(self, name)
    }

    pub fn get_user(&self) -> Result<User> {
        resources::get_user_info(self)
    }

    pub fn get_dashboard(&self) -> Result<Vec<Post>> {
        self.get_dashboard_with_params(&Params::new())
    }

    pub fn get_dashboard_with_params(&self, params: &Params) -> Result<Vec<Post>> {
        resources::get_dashboard(self, params)
    }

    pub fn get_likes(&self) -> Result<Likes> {
        self.get_likes_with_params(&Params::new())
    }

    pub fn get_likes_with_params(&self, params: &Params) -> Result<Likes> {
        resources::get_likes(self, params)
    }

    pub fn tagged_search(&self, tag: &str) -> Result<SearchResults> {
        self.tagged_search_with_params(tag, &Params::new())
    }

    pub fn tagged_search_with_params(&self, tag: &str, params: &Params) -> Result<SearchResults> {
        resources::tagged_search(self, tag, params)
    }
}

impl TransportProvider for TumblrClient {
    fn get_with_params(&self, endpoint: &str, params: &Params) -> Result<Response> {
        self.send(HttpMethod::Get, endpoint, params)
    }

    fn post_with_params(&self, endpoint: &str, params: &Params) -> Result<Response> {
        self.send(HttpMethod::Post, endpoint, params)
    }

    fn put_with_params(&self, endpoint: &str, params: &Params) -> Result<Response> {
        self.send(HttpMethod::Put, endpoint, params)
    }

    fn delete_with_params(&self, endpoint: &str, params: &Params) -> Result<Response> {
        self.send(HttpMethod::Delete, endpoint, params)
    }
}

/// Decode the raw response and fail on statuses outside `[200, 400)`.
///
/// The decoded `Response` travels inside the error so the body of a failed
/// call stays inspectable.
pub fn into_result(raw: HttpResponse) -> Result<Response> {
    let status_line = raw.status_line();
    let success = raw.is_success();
    let response = Response::new(raw);
    tracing::debug!(status = response.status, body_len = response.body.len(), "tumblr.response");
    if success {
        return Ok(response);
    }
    tracing::warn!(status = %status_line, "tumblr.response.error");
    Err(ApiError::Status {
        status_line,
        response: Box::new(response),
    })
}
