//! End-to-end tests of the blocking client against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in a background tokio runtime,
//! then drives `TumblrClient` over real HTTP. The server echoes the OAuth
//! identity it saw, which makes credential rotation observable from outside.

use std::io::{Read, Write};
use std::net::SocketAddr;

use tumblr_client::{ApiError, Params, TransportProvider, TumblrClient};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// One-shot server that reads a request head, writes `reply` verbatim and
/// closes the connection.
fn start_raw_server(reply: Vec<u8>) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                return;
            }
            head.extend_from_slice(&buf[..n]);
        }
        stream.write_all(&reply).unwrap();
        stream.flush().unwrap();
    });

    addr
}

fn raw_ok(body: &[u8]) -> Vec<u8> {
    let mut reply = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    reply.extend_from_slice(body);
    reply
}

fn base(addr: SocketAddr) -> String {
    format!("http://{addr}/v2/")
}

#[test]
fn verbs_reach_server_signed() {
    let addr = start_server();
    let client = TumblrClient::with_token("ck", "cs", "tok", "ts").with_base_url(&base(addr));

    // GET with params lands in the query string.
    let resp = client
        .get_with_params("/echo/blog/example.tumblr.com/info", &Params::from([("api_key", "x")]))
        .unwrap();
    assert_eq!(resp.status, 200);
    assert!(resp.header("content-type").unwrap().starts_with("application/json"));
    let echoed = resp.result.unwrap();
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["path"], "/v2/echo/blog/example.tumblr.com/info");
    assert_eq!(echoed["query"], "api_key=x");
    assert_eq!(echoed["oauth"]["consumer_key"], "ck");
    assert_eq!(echoed["oauth"]["token"], "tok");
    assert_eq!(echoed["oauth"]["signature_method"], "HMAC-SHA1");
    assert_eq!(echoed["oauth"]["has_signature"], true);

    // POST form-encodes params into the body.
    let resp = client
        .post_with_params("echo/user/like", &Params::from([("id", "1"), ("reblog_key", "a b")]))
        .unwrap();
    let echoed = resp.result.unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["query"], "");
    assert_eq!(echoed["body"], "id=1&reblog_key=a+b");
    assert_eq!(echoed["content_type"], "application/x-www-form-urlencoded");

    // PUT and DELETE keep params in the query and send no body.
    let params = Params::from([("state", "draft")]);
    for (resp, method) in [
        (client.put_with_params("echo/post", &params).unwrap(), "PUT"),
        (client.delete_with_params("echo/post", &params).unwrap(), "DELETE"),
    ] {
        let echoed = resp.result.unwrap();
        assert_eq!(echoed["method"], method);
        assert_eq!(echoed["query"], "state=draft");
        assert_eq!(echoed["body"], "");
    }

    // No params, no `?`.
    let echoed = client.get("echo/plain").unwrap().result.unwrap();
    assert_eq!(echoed["query"], "");
}

#[test]
fn app_only_signing_sends_empty_token() {
    let addr = start_server();
    let client = TumblrClient::new("ck", "cs").with_base_url(&base(addr));

    let echoed = client.get("echo/anything").unwrap().result.unwrap();
    assert_eq!(echoed["oauth"]["consumer_key"], "ck");
    assert_eq!(echoed["oauth"]["token"], "");
}

#[test]
fn credential_change_rebuilds_transport() {
    let addr = start_server();
    let mut client = TumblrClient::new("first", "cs").with_base_url(&base(addr));

    let echoed = client.get("echo/id").unwrap().result.unwrap();
    assert_eq!(echoed["oauth"]["consumer_key"], "first");

    client.set_consumer("second", "cs");
    let echoed = client.get("echo/id").unwrap().result.unwrap();
    assert_eq!(echoed["oauth"]["consumer_key"], "second");
    assert_eq!(echoed["oauth"]["token"], "");

    client.set_token("user", "us");
    let echoed = client.get("echo/id").unwrap().result.unwrap();
    assert_eq!(echoed["oauth"]["token"], "user");
}

#[test]
fn not_found_error_keeps_body() {
    let addr = start_server();
    let client = TumblrClient::new("ck", "cs").with_base_url(&base(addr));

    let err = client.get("blog/missing.tumblr.com/info").unwrap_err();
    assert!(err.to_string().contains("404 Not Found"), "got: {err}");
    let response = err.response().expect("response attached");
    assert_eq!(response.status, 404);
    assert_eq!(response.meta.as_ref().unwrap().msg, "Not Found");
    assert_eq!(response.errors[0].detail, "Blog not found");
}

#[test]
fn redirect_is_returned_as_is() {
    let addr = start_server();
    let client = TumblrClient::new("ck", "cs").with_base_url(&base(addr));

    let resp = client.get("blog/staff.tumblr.com/avatar/64").unwrap();
    assert_eq!(resp.status, 301);
    assert_eq!(
        resp.header("location"),
        Some(format!("{}/staff.tumblr.com/avatar_64.png", mock_server::AVATAR_HOST).as_str())
    );

    let url = client.get_blog("staff").avatar_url(64).unwrap();
    assert_eq!(url, Some(format!("{}/staff.tumblr.com/avatar_64.png", mock_server::AVATAR_HOST)));
}

#[test]
fn missing_consumer_fails_before_any_io() {
    let client = TumblrClient::unauthenticated().with_base_url("http://127.0.0.1:9/v2/");
    assert!(matches!(client.get("user/info"), Err(ApiError::MissingConsumerCredentials)));
}

#[test]
fn connection_failure_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let client = TumblrClient::new("ck", "cs").with_base_url(&format!("http://127.0.0.1:{port}/v2/"));
    assert!(matches!(client.get("user/info"), Err(ApiError::Transport(_))));
}

#[test]
fn resource_helpers_round_trip() {
    let addr = start_server();
    let client = TumblrClient::with_token("ck", "cs", "staff-user", "ts").with_base_url(&base(addr));

    let user = client.get_user().unwrap();
    assert_eq!(user.name, "staff-user");
    assert_eq!(user.blogs[0].name, "staff");

    let dashboard = client.get_dashboard_with_params(&Params::from([("limit", "2")])).unwrap();
    assert_eq!(dashboard.len(), 2);
    assert_eq!(client.get_dashboard().unwrap().len(), 3);

    let cats = client.tagged_search("cats").unwrap();
    assert_eq!(cats.posts.len(), 2);
    assert!(cats.posts.iter().all(|p| p.tags.contains(&"cats".to_string())));

    let blog = client.get_blog("staff").info().unwrap();
    assert_eq!(blog.name, "staff");
    assert_eq!(blog.posts, 3);

    assert_eq!(client.get_likes().unwrap().liked_count, 0);
    let post = client.get_post(1003, "staff");
    post.like("rk1003").unwrap();
    let likes = client.get_likes().unwrap();
    assert_eq!(likes.liked_count, 1);
    assert_eq!(likes.liked_posts[0].id, 1003);
    assert_eq!(likes.liked_posts[0].kind, "photo");

    let err = post.like("wrong").unwrap_err();
    assert_eq!(err.status(), Some(404));

    post.unlike("rk1003").unwrap();
    assert_eq!(client.get_likes().unwrap().liked_count, 0);
}

#[test]
fn app_only_user_info_is_unauthorized() {
    let addr = start_server();
    let client = TumblrClient::new("ck", "cs").with_base_url(&base(addr));

    let err = client.get_user().unwrap_err();
    assert!(matches!(err, ApiError::Status { .. }));
    assert!(err.to_string().contains("401"));
}

#[test]
fn truncated_body_is_body_read_error() {
    let addr = start_raw_server(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nabc".to_vec());
    let client = TumblrClient::new("ck", "cs").with_base_url(&base(addr));
    assert!(matches!(client.get("user/info"), Err(ApiError::BodyRead(_))));
}

#[test]
fn non_utf8_body_is_still_a_response() {
    let addr = start_raw_server(raw_ok(&[0xff, 0xfe, b'a']));
    let client = TumblrClient::new("ck", "cs").with_base_url(&base(addr));

    let resp = client.get("user/info").unwrap();
    assert_eq!(resp.status, 200);
    assert!(resp.body.ends_with('a'));
    assert!(resp.meta.is_none());
}

#[test]
fn large_body_is_read_in_full() {
    let padding = "x".repeat(11 * 1024 * 1024);
    let body = format!(r#"{{"meta":{{"status":200,"msg":"OK"}},"response":{{"padding":"{padding}"}}}}"#);
    let addr = start_raw_server(raw_ok(body.as_bytes()));
    let client = TumblrClient::new("ck", "cs").with_base_url(&base(addr));

    let resp = client.get("user/info").unwrap();
    assert_eq!(resp.body.len(), body.len());
    assert_eq!(resp.meta.unwrap().status, 200);
    assert_eq!(resp.result.unwrap()["padding"].as_str().unwrap().len(), padding.len());
}

#[test]
fn base_without_trailing_slash_reaches_server() {
    let addr = start_server();
    let client = TumblrClient::new("ck", "cs").with_base_url(&format!("http://{addr}/v2"));

    let echoed = client.get("echo/joined").unwrap().result.unwrap();
    assert_eq!(echoed["path"], "/v2/echo/joined");
}
