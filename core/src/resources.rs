//! Resource handles and fetch helpers layered on `TransportProvider`.
//!
//! Each helper is a single request: build the endpoint, pick the verb, decode
//! the envelope payload. No pagination or caching happens here.

use serde::Deserialize;

use crate::error::Result;
use crate::http::Params;
use crate::provider::TransportProvider;
use crate::response::Response;
use crate::types::{Blog, BlogPosts, Followers, Likes, MiniPost, Post, SearchResults, User};

/// Bare blog names get the `.tumblr.com` suffix; hostnames pass through.
pub fn normalize_blog_name(name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("{name}.tumblr.com")
    }
}

pub fn get_user_info<P: TransportProvider + ?Sized>(provider: &P) -> Result<User> {
    #[derive(Deserialize)]
    struct Payload {
        user: User,
    }
    let payload: Payload = provider.get("user/info")?.decode()?;
    Ok(payload.user)
}

pub fn get_dashboard<P: TransportProvider + ?Sized>(provider: &P, params: &Params) -> Result<Vec<Post>> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(default)]
        posts: Vec<Post>,
    }
    let payload: Payload = provider.get_with_params("user/dashboard", params)?.decode()?;
    Ok(payload.posts)
}

pub fn get_likes<P: TransportProvider + ?Sized>(provider: &P, params: &Params) -> Result<Likes> {
    provider.get_with_params("user/likes", params)?.decode()
}

pub fn tagged_search<P: TransportProvider + ?Sized>(
    provider: &P,
    tag: &str,
    params: &Params,
) -> Result<SearchResults> {
    let mut params = params.clone();
    params.set("tag", tag);
    provider.get_with_params("tagged", &params)?.decode()
}

/// A handle to one blog, issuing requests through `provider`.
pub struct BlogRef<'a, P: ?Sized> {
    provider: &'a P,
    pub name: String,
}

impl<'a, P: TransportProvider + ?Sized> BlogRef<'a, P> {
    pub fn new(provider: &'a P, name: &str) -> Self {
        Self {
            provider,
            name: normalize_blog_name(name),
        }
    }

    fn endpoint(&self, tail: &str) -> String {
        format!("blog/{}/{tail}", self.name)
    }

    pub fn info(&self) -> Result<Blog> {
        #[derive(Deserialize)]
        struct Payload {
            blog: Blog,
        }
        let payload: Payload = self.provider.get(&self.endpoint("info"))?.decode()?;
        Ok(payload.blog)
    }

    pub fn posts(&self, params: &Params) -> Result<BlogPosts> {
        self.provider.get_with_params(&self.endpoint("posts"), params)?.decode()
    }

    pub fn followers(&self, params: &Params) -> Result<Followers> {
        self.provider.get_with_params(&self.endpoint("followers"), params)?.decode()
    }

    pub fn follow(&self) -> Result<Response> {
        self.provider.post_with_params("user/follow", &Params::from([("url", self.name.as_str())]))
    }

    pub fn unfollow(&self) -> Result<Response> {
        self.provider.post_with_params("user/unfollow", &Params::from([("url", self.name.as_str())]))
    }

    /// Avatar image URL for `size` pixels square.
    ///
    /// The endpoint answers with a redirect; the target is read from the
    /// `Location` header, falling back to `avatar_url` in the payload.
    pub fn avatar_url(&self, size: u32) -> Result<Option<String>> {
        let response = self.provider.get(&self.endpoint(&format!("avatar/{size}")))?;
        if let Some(location) = response.header("location") {
            return Ok(Some(location.to_string()));
        }
        Ok(response
            .result
            .as_ref()
            .and_then(|r| r.get("avatar_url"))
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    pub fn post(&self, id: u64) -> PostRef<'a, P> {
        PostRef::new(
            self.provider,
            MiniPost {
                id,
                blog_name: self.name.clone(),
                reblog_key: String::new(),
            },
        )
    }
}

/// A handle to one post, issuing requests through `provider`.
pub struct PostRef<'a, P: ?Sized> {
    provider: &'a P,
    pub post: MiniPost,
}

impl<'a, P: TransportProvider + ?Sized> PostRef<'a, P> {
    pub fn new(provider: &'a P, post: MiniPost) -> Self {
        Self { provider, post }
    }

    fn blog(&self) -> String {
        normalize_blog_name(&self.post.blog_name)
    }

    fn key_params(&self, reblog_key: &str) -> Params {
        Params::from([
            ("id", self.post.id.to_string()),
            ("reblog_key", reblog_key.to_string()),
        ])
    }

    pub fn like(&self, reblog_key: &str) -> Result<Response> {
        self.provider.post_with_params("user/like", &self.key_params(reblog_key))
    }

    pub fn unlike(&self, reblog_key: &str) -> Result<Response> {
        self.provider.post_with_params("user/unlike", &self.key_params(reblog_key))
    }

    /// Reblog onto the post's blog; `params` carries extras such as `comment`.
    pub fn reblog(&self, reblog_key: &str, params: &Params) -> Result<Response> {
        let mut merged = params.clone();
        for (k, v) in self.key_params(reblog_key).pairs() {
            merged.set(k, v);
        }
        self.provider
            .post_with_params(&format!("blog/{}/post/reblog", self.blog()), &merged)
    }

    pub fn delete(&self) -> Result<Response> {
        self.provider.post_with_params(
            &format!("blog/{}/post/delete", self.blog()),
            &Params::from([("id", self.post.id.to_string())]),
        )
    }
}
