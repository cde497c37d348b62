//! Resource payloads returned inside the `response` field of the envelope.
//!
//! Only the fields the client reasons about are typed; everything else a post
//! carries (bodies, photos, trails) is kept in `extra` untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The identifying bits of a post, enough to act on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MiniPost {
    pub id: u64,
    pub blog_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reblog_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: u64,
    pub blog_name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub post_url: String,
    #[serde(default)]
    pub reblog_key: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub note_count: u64,
    #[serde(default)]
    pub summary: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    pub fn mini(&self) -> MiniPost {
        MiniPost {
            id: self.id,
            blog_name: self.blog_name.clone(),
            reblog_key: self.reblog_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blog {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posts: u64,
    #[serde(default)]
    pub updated: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A blog as listed under the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserBlog {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub followers: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub default_post_format: String,
    #[serde(default)]
    pub blogs: Vec<UserBlog>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Likes {
    #[serde(default)]
    pub liked_posts: Vec<Post>,
    #[serde(default)]
    pub liked_count: u64,
}

/// Posts matching a tag; the API returns a bare array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SearchResults {
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPosts {
    pub blog: Blog,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total_posts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Follower {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub updated: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Followers {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub users: Vec<Follower>,
}
