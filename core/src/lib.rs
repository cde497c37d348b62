//! Blocking client for the Tumblr v2 API.
//!
//! # Overview
//! `TumblrClient` signs every request with OAuth 1.0a (consumer credentials,
//! plus an optional user token) and maps HTTP outcomes onto `Response` or
//! `ApiError`. Resource helpers (`BlogRef`, `PostRef`, dashboard, likes, tag
//! search) sit on top of the `TransportProvider` trait instead of the concrete
//! client.
//!
//! ```no_run
//! use tumblr_client::{Params, TransportProvider, TumblrClient};
//!
//! let client = TumblrClient::new("consumer-key", "consumer-secret");
//! let info = client.get_with_params("blog/staff.tumblr.com/info", &Params::from([("api_key", "consumer-key")]))?;
//! println!("{}", info.body);
//! # Ok::<(), tumblr_client::ApiError>(())
//! ```
//!
//! # Design
//! - Requests are plain `HttpRequest` data until the `Transport` signs and
//!   sends them, so URL and body construction are testable without I/O.
//! - Redirects are never followed; a 3xx comes back as a normal `Response`.
//! - Statuses outside `[200, 400)` become `ApiError::Status`, which still
//!   carries the decoded response.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod resources;
pub mod response;
pub mod transport;
pub mod types;

pub use auth::{Credentials, OAuthSigner};
pub use client::{TumblrClient, API_BASE};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Params};
pub use provider::TransportProvider;
pub use resources::{BlogRef, PostRef};
pub use response::{Meta, Response, ResponseError};
pub use transport::Transport;
pub use types::{Blog, BlogPosts, Follower, Followers, Likes, MiniPost, Post, SearchResults, User, UserBlog};
