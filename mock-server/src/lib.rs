use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use axum::{
    extract::{OriginalUri, Path, Query, RawQuery, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const AVATAR_HOST: &str = "https://64.media.tumblr.com";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: u64,
    pub blog_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub reblog_key: String,
    pub tags: Vec<String>,
    pub note_count: u64,
}

/// Consumer key and token pulled out of an `Authorization: OAuth ...` header.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OAuthIdentity {
    pub consumer_key: String,
    pub token: String,
    pub signature_method: String,
    pub has_signature: bool,
}

#[derive(Default)]
pub struct Store {
    pub posts: Vec<Post>,
    pub liked: BTreeSet<u64>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn seed_posts() -> Vec<Post> {
    let post = |id: u64, kind: &str, tags: &[&str]| Post {
        id,
        blog_name: "staff".to_string(),
        kind: kind.to_string(),
        reblog_key: format!("rk{id}"),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        note_count: id % 100,
    };
    vec![
        post(1001, "text", &["news"]),
        post(1002, "photo", &["cats", "news"]),
        post(1003, "photo", &["cats"]),
    ]
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        posts: seed_posts(),
        liked: BTreeSet::new(),
    }));
    let api = Router::new()
        .route("/echo/{*rest}", any(echo))
        .route("/user/info", get(user_info))
        .route("/user/dashboard", get(dashboard))
        .route("/user/likes", get(likes))
        .route("/user/like", post(like))
        .route("/user/unlike", post(unlike))
        .route("/tagged", get(tagged))
        .route("/blog/{blog}/info", get(blog_info))
        .route("/blog/{blog}/avatar/{size}", get(avatar))
        .fallback(not_found)
        .layer(middleware::from_fn(require_oauth))
        .with_state(db);
    Router::new().nest("/v2", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Success or failure envelope in the Tumblr `{meta, response}` shape.
pub fn envelope(status: StatusCode, response: Value) -> Response {
    let body = json!({
        "meta": {"status": status.as_u16(), "msg": status.canonical_reason().unwrap_or("")},
        "response": response,
    });
    (status, Json(body)).into_response()
}

fn error_envelope(status: StatusCode, detail: &str) -> Response {
    let reason = status.canonical_reason().unwrap_or("");
    let body = json!({
        "meta": {"status": status.as_u16(), "msg": reason},
        "response": [],
        "errors": [{"title": reason, "code": 0, "detail": detail}],
    });
    (status, Json(body)).into_response()
}

/// Parse `OAuth k="v", ...`, returning `None` if the scheme is missing.
pub fn parse_oauth(headers: &HeaderMap) -> Option<OAuthIdentity> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let params = value.strip_prefix("OAuth ")?;
    let mut fields = BTreeMap::new();
    for part in params.split(',') {
        let (k, v) = part.trim().split_once('=')?;
        fields.insert(k.to_string(), v.trim_matches('"').to_string());
    }
    let consumer_key = fields.get("oauth_consumer_key")?.clone();
    Some(OAuthIdentity {
        consumer_key,
        token: fields.get("oauth_token").cloned().unwrap_or_default(),
        signature_method: fields.get("oauth_signature_method").cloned().unwrap_or_default(),
        has_signature: fields.get("oauth_signature").is_some_and(|s| !s.is_empty()),
    })
}

async fn require_oauth(req: Request, next: Next) -> Response {
    if parse_oauth(req.headers()).is_none() {
        return error_envelope(StatusCode::UNAUTHORIZED, "Missing OAuth authorization");
    }
    next.run(req).await
}

async fn not_found() -> Response {
    error_envelope(StatusCode::NOT_FOUND, "Resource not found")
}

/// Reflect the request so clients can check exactly what they sent.
async fn echo(
    method: Method,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Response {
    let oauth = parse_oauth(&headers).unwrap_or_default();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    envelope(
        StatusCode::OK,
        json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": query.unwrap_or_default(),
            "content_type": content_type,
            "body": body,
            "oauth": oauth,
        }),
    )
}

async fn user_info(headers: HeaderMap) -> Response {
    let oauth = parse_oauth(&headers).unwrap_or_default();
    if oauth.token.is_empty() {
        return error_envelope(StatusCode::UNAUTHORIZED, "User token required");
    }
    envelope(
        StatusCode::OK,
        json!({"user": {
            "name": oauth.token,
            "likes": 2,
            "following": 5,
            "default_post_format": "html",
            "blogs": [{"name": "staff", "title": "Tumblr Staff", "url": "https://staff.tumblr.com/", "primary": true, "followers": 100}],
        }}),
    )
}

#[derive(Deserialize)]
struct Paging {
    limit: Option<usize>,
}

async fn dashboard(State(db): State<Db>, Query(paging): Query<Paging>) -> Response {
    let store = db.read().await;
    let limit = paging.limit.unwrap_or(20);
    let posts: Vec<&Post> = store.posts.iter().take(limit).collect();
    envelope(StatusCode::OK, json!({"posts": posts}))
}

async fn likes(State(db): State<Db>) -> Response {
    let store = db.read().await;
    let liked: Vec<&Post> = store.posts.iter().filter(|p| store.liked.contains(&p.id)).collect();
    let count = liked.len();
    envelope(StatusCode::OK, json!({"liked_posts": liked, "liked_count": count}))
}

#[derive(Deserialize)]
struct LikeForm {
    id: u64,
    reblog_key: String,
}

async fn like(State(db): State<Db>, Form(form): Form<LikeForm>) -> Response {
    let mut store = db.write().await;
    let known = store
        .posts
        .iter()
        .any(|p| p.id == form.id && p.reblog_key == form.reblog_key);
    if !known {
        return error_envelope(StatusCode::NOT_FOUND, "Post not found");
    }
    store.liked.insert(form.id);
    envelope(StatusCode::OK, json!([]))
}

async fn unlike(State(db): State<Db>, Form(form): Form<LikeForm>) -> Response {
    db.write().await.liked.remove(&form.id);
    envelope(StatusCode::OK, json!([]))
}

#[derive(Deserialize)]
struct TagQuery {
    tag: Option<String>,
}

async fn tagged(State(db): State<Db>, Query(q): Query<TagQuery>) -> Response {
    let Some(tag) = q.tag.filter(|t| !t.is_empty()) else {
        return error_envelope(StatusCode::BAD_REQUEST, "tag parameter required");
    };
    let store = db.read().await;
    let posts: Vec<&Post> = store.posts.iter().filter(|p| p.tags.contains(&tag)).collect();
    envelope(StatusCode::OK, json!(posts))
}

async fn blog_info(State(db): State<Db>, Path(blog): Path<String>) -> Response {
    if blog != "staff.tumblr.com" {
        return error_envelope(StatusCode::NOT_FOUND, "Blog not found");
    }
    let store = db.read().await;
    envelope(
        StatusCode::OK,
        json!({"blog": {
            "name": "staff",
            "title": "Tumblr Staff",
            "url": "https://staff.tumblr.com/",
            "description": "",
            "posts": store.posts.len(),
            "updated": 1700000000,
        }}),
    )
}

async fn avatar(Path((blog, size)): Path<(String, u32)>) -> Response {
    let location = format!("{AVATAR_HOST}/{blog}/avatar_{size}.png");
    let mut response = envelope(StatusCode::MOVED_PERMANENTLY, json!({"avatar_url": location}));
    if let Ok(value) = location.parse::<HeaderValue>() {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}
