//! Integration tests for the gateway operations: request shaping, error
//! mapping, token management, and the published-post wrapper calls.

use std::time::Duration;

use serde_json::{json, Value};
use threads_client::{SearchKind, ThreadsClient, ThreadsError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ThreadsClient {
    ThreadsClient::with_config("test-token", "42", server.uri(), Duration::from_secs(10))
        .expect("client builds")
}

#[tokio::test]
async fn fetches_profile_with_joined_field_selector() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1234"))
        .and(query_param("fields", "id,username,followers_count"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1234",
            "username": "crab",
            "followers_count": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let profile = client
        .get_user_profile("1234", &["id", "username", "followers_count"])
        .await
        .expect("profile fetch succeeds");

    assert_eq!(profile.id, "1234");
    assert_eq!(profile.username, "crab");
    assert_eq!(profile.followers_count, 7);
}

#[tokio::test]
async fn server_error_payload_surfaces_in_request_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/9"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "bad token" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_post("9", &[])
        .await
        .expect_err("request must fail");

    match err {
        ThreadsError::RequestFailed {
            method,
            status,
            message,
            ..
        } => {
            assert_eq!(method, "GET");
            assert_eq!(status, 400);
            assert_eq!(message.as_deref(), Some("bad token"));
        }
        other => panic!("expected RequestFailed, got {other}"),
    }
}

#[tokio::test]
async fn structured_error_objects_are_stringified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/9"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "message": "permission denied", "code": 10 }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_post("9", &[])
        .await
        .expect_err("request must fail");

    match err {
        ThreadsError::RequestFailed { message, .. } => {
            let message = message.expect("error payload captured");
            assert!(message.contains("permission denied"));
        }
        other => panic!("expected RequestFailed, got {other}"),
    }
}

#[tokio::test]
async fn unreachable_host_maps_to_transport_error() {
    // Bind and drop a listener so the port is very likely closed.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    };

    let client = ThreadsClient::with_config(
        "test-token",
        "42",
        format!("http://{addr}"),
        Duration::from_secs(2),
    )
    .expect("client builds");

    let err = client
        .get_post("1", &[])
        .await
        .expect_err("request must fail");
    assert!(matches!(err, ThreadsError::Transport(_)), "got {err}");
}

#[tokio::test]
async fn invalid_body_maps_to_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_post("1", &[])
        .await
        .expect_err("request must fail");
    assert!(matches!(err, ThreadsError::Decode { .. }), "got {err}");
}

#[tokio::test]
async fn refresh_replaces_token_for_subsequent_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/refresh_access_token"))
        .and(query_param("grant_type", "th_refresh_token"))
        .and(query_param("access_token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok2" })))
        .expect(1)
        .mount(&server)
        .await;
    // Only a request carrying the refreshed token may match.
    Mock::given(method("GET"))
        .and(path("/42"))
        .and(header("authorization", "Bearer tok2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "42", "username": "crab" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let new_token = client
        .refresh_access_token(None)
        .await
        .expect("refresh succeeds");

    assert_eq!(new_token, "tok2");
    assert_eq!(client.access_token(), "tok2");

    client
        .get_user_profile("42", &[])
        .await
        .expect("profile fetch uses refreshed token");
}

#[tokio::test]
async fn refresh_is_shared_across_client_clones() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/refresh_access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok3" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let clone = client.clone();
    client
        .refresh_access_token(None)
        .await
        .expect("refresh succeeds");

    assert_eq!(clone.access_token(), "tok3");
}

#[tokio::test]
async fn extend_returns_long_lived_token_without_mutating_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/access_token"))
        .and(query_param("grant_type", "th_extend_token"))
        .and(query_param("client_secret", "s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "long-lived" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = client
        .get_long_lived_access_token(None, "s3cret")
        .await
        .expect("extend succeeds");

    assert_eq!(token, "long-lived");
    assert_eq!(client.access_token(), "test-token");
}

#[tokio::test]
async fn lists_posts_with_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/42/threads"))
        .and(query_param("limit", "2"))
        .and(query_param("cursor", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "p1", "text": "first" },
                { "id": "p2", "text": "second" }
            ],
            "paging": { "next": "n2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .list_user_posts(None, 2, Some("abc"))
        .await
        .expect("list succeeds");

    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.posts[0].id(), "p1");
    assert_eq!(page.posts[1].data().text.as_deref(), Some("second"));
    assert_eq!(page.paging.next.as_deref(), Some("n2"));
    assert!(page.paging.previous.is_none());
}

#[tokio::test]
async fn searches_users_with_typed_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("type", "users"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "u1", "type": "user", "username": "crab" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .search("rust", SearchKind::Users, 10, None)
        .await
        .expect("search succeeds");

    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].username.as_deref(), Some("crab"));
    assert_eq!(page.results[0].kind.as_deref(), Some("user"));
}

#[tokio::test]
async fn webhook_subscription_joins_event_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub1",
            "callback_url": "https://example.com/hook",
            "verify_token": "v1",
            "status": "active"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sub = client
        .subscribe_webhook("https://example.com/hook", "v1", &["posts", "replies"])
        .await
        .expect("subscription succeeds");

    assert_eq!(sub.id, "sub1");
    assert_eq!(sub.status.as_deref(), Some("active"));

    let requests = server.received_requests().await.expect("recording enabled");
    let body: Value = requests[0].body_json().expect("json body");
    assert_eq!(
        body,
        json!({
            "callback_url": "https://example.com/hook",
            "verify_token": "v1",
            "fields": "posts,replies"
        })
    );
}

#[tokio::test]
async fn follow_and_unfollow_hit_the_relationship_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/77/follow"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "user_id": "77", "following": true })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/77/follow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "user_id": "77", "following": false })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let followed = client.follow_user("77").await.expect("follow succeeds");
    assert!(followed.following);

    let unfollowed = client.unfollow_user("77").await.expect("unfollow succeeds");
    assert!(!unfollowed.following);
}

#[tokio::test]
async fn wrapper_interactions_delegate_to_post_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "123" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/123/likes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "123", "success": true })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/threads/123/likes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "123", "success": true })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/123/reposts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "r1", "success": true })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/threads/123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "123", "success": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let post = client.get_post("123", &[]).await.expect("fetch post");

    assert!(post.like().await.expect("like succeeds").success);
    assert!(post.unlike().await.expect("unlike succeeds").success);

    let repost = post
        .repost(Some("nice one"))
        .await
        .expect("repost succeeds");
    assert_eq!(repost.id, "r1");

    assert!(post.delete().await.expect("delete succeeds").success);

    let requests = server.received_requests().await.expect("recording enabled");
    let repost_req = requests
        .iter()
        .find(|r| r.url.path() == "/threads/123/reposts")
        .expect("repost call recorded");
    let body: Value = repost_req.body_json().expect("json body");
    assert_eq!(body, json!({ "post_id": "123", "comment": "nice one" }));
}

#[tokio::test]
async fn edit_sends_only_supplied_fields_and_replaces_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "123", "text": "old" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/threads/123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "123", "text": "new" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut post = client.get_post("123", &[]).await.expect("fetch post");
    assert_eq!(post.data().text.as_deref(), Some("old"));

    post.edit(Some("new"), None).await.expect("edit succeeds");
    assert_eq!(post.data().text.as_deref(), Some("new"));

    let requests = server.received_requests().await.expect("recording enabled");
    let edit_req = requests
        .iter()
        .find(|r| r.url.path() == "/threads/123")
        .expect("edit call recorded");
    let body: Value = edit_req.body_json().expect("json body");
    assert_eq!(body, json!({ "text": "new" }));
}

#[tokio::test]
async fn refresh_replaces_the_whole_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123", "text": "old", "like_count": 1
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "123", "text": "old", "like_count": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut post = client.get_post("123", &[]).await.expect("fetch post");
    assert_eq!(post.data().like_count, 1);

    post.refresh().await.expect("refresh succeeds");
    assert_eq!(post.data().like_count, 5);
}
