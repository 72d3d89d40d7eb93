use std::time::Duration;

use petsignal_core::{
    AlertApi, AlertQuery, AlertStatus, AlertType, ApiError, NewAlert, NewPost, NewUser,
    ObjectStorage, PhotoApi, PhotoKey,
};
use serde_json::json;

use super::stub_server::StubServer;
use crate::credentials::Credentials;
use crate::web_client::{ObjectStoreClient, RestClient};

fn client(server: &StubServer) -> RestClient {
    let credentials = Credentials {
        username: "ana".to_string(),
        password: "secret".to_string(),
    };
    RestClient::new(&server.base_url, Duration::from_secs(5), Some(credentials)).unwrap()
}

fn alert_json(id: i64, username: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": "LOST",
        "status": "ACTIVE",
        "title": format!("Alert {}", id),
        "breed": "Mixed",
        "username": username,
    })
}

fn new_alert() -> NewAlert {
    NewAlert {
        title: "Lost beagle".to_string(),
        breed: "Beagle".to_string(),
        description: "Ran off near the park".to_string(),
        username: "ana".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_list_sends_filters_and_basic_auth() {
    let server = StubServer::start();
    server.respond(
        "GET /alerts",
        200,
        json!({ "content": [alert_json(1, "ana"), alert_json(2, "bo")] }),
    );

    let query = AlertQuery {
        page: 0,
        size: 20,
        alert_type: Some(AlertType::Lost),
        status: Some(AlertStatus::Active),
    };
    let alerts = client(&server).list_alerts(&query).await.unwrap();

    assert_eq!(alerts.len(), 2);
    let requests = server.requests_to("GET", "/alerts");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].query.as_deref(),
        Some("page=0&size=20&type=LOST&status=ACTIVE")
    );
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Basic YW5hOnNlY3JldA==")
    );
}

#[tokio::test]
async fn test_error_statuses_are_mapped() {
    let server = StubServer::start();
    server.respond(
        "POST /alerts",
        422,
        json!({ "message": "title is required" }),
    );
    server.respond("GET /alerts/5", 503, serde_json::Value::Null);

    let client = client(&server);

    let rejected = client.create_alert(&new_alert()).await.unwrap_err();
    assert_eq!(rejected.user_message(), "title is required");
    assert_eq!(rejected.status(), Some(422));

    let unavailable = client.get_alert(5).await.unwrap_err();
    assert_eq!(unavailable, ApiError::Server { status: 503 });

    let missing = client.get_alert(6).await.unwrap_err();
    assert_eq!(missing, ApiError::NotFound);
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let client = RestClient::new("http://127.0.0.1:1", Duration::from_secs(2), None).unwrap();

    let err = client.get_alert(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = StubServer::start();
    server.respond_slowly("GET /alerts/1", Duration::from_secs(3));

    let client = RestClient::new(&server.base_url, Duration::from_millis(200), None).unwrap();

    assert_eq!(client.get_alert(1).await.unwrap_err(), ApiError::Timeout);
}

#[tokio::test]
async fn test_register_is_anonymous() {
    let server = StubServer::start();
    server.respond(
        "POST /users",
        201,
        json!({ "id": 9, "username": "new_user", "email": "new@example.com" }),
    );

    let user = NewUser {
        username: "new_user".to_string(),
        email: "new@example.com".to_string(),
        password: "hunter22".to_string(),
        ..Default::default()
    };
    let created = client(&server).register(&user).await.unwrap();

    assert_eq!(created.id, Some(9));
    let request = &server.requests_to("POST", "/users")[0];
    assert!(request.authorization.is_none());
    assert_eq!(request.json()["username"], "new_user");
}

#[tokio::test]
async fn test_invalid_registration_is_not_sent() {
    let server = StubServer::start();

    let user = NewUser {
        username: "x".to_string(),
        email: "new@example.com".to_string(),
        password: "hunter22".to_string(),
        ..Default::default()
    };
    let err = client(&server).register(&user).await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_photo_routes() {
    let server = StubServer::start();
    server.respond(
        "POST /alerts/3/photos",
        200,
        json!([{ "s3ObjectKey": "alerts/3/a.jpg", "presignedUrl": "http://bucket/a" }]),
    );
    server.respond("DELETE /alerts/3/photos/alerts%2F3%2Fa.jpg", 204, serde_json::Value::Null);
    server.respond(
        "GET /photos/alert/3",
        200,
        json!([{ "id": 8, "url": "http://bucket/a", "description": "Front" }]),
    );

    let client = client(&server);

    let slots = client
        .request_upload_slots(3, &["a.jpg".to_string()])
        .await
        .unwrap();
    assert_eq!(slots[0].s3_object_key, "alerts/3/a.jpg");
    assert_eq!(
        server.requests_to("POST", "/alerts/3/photos")[0].json(),
        json!({ "photoFilenames": ["a.jpg"] })
    );

    client
        .delete_photo(3, &PhotoKey::ObjectKey("alerts/3/a.jpg".to_string()))
        .await
        .unwrap();
    assert_eq!(
        server
            .requests_to("DELETE", "/alerts/3/photos/alerts%2F3%2Fa.jpg")
            .len(),
        1
    );

    let photos = client.list_photos(3).await.unwrap();
    assert_eq!(photos[0].id, 8);
    assert_eq!(photos[0].presigned_url.as_deref(), Some("http://bucket/a"));
}

#[tokio::test]
async fn test_comment_content_is_trimmed() {
    let server = StubServer::start();
    server.respond(
        "POST /alerts/4/posts",
        201,
        json!({ "id": 1, "username": "ana", "content": "Seen at the bakery" }),
    );

    let post = NewPost {
        username: "ana".to_string(),
        content: "  Seen at the bakery \n".to_string(),
    };
    client(&server).create_post(4, &post).await.unwrap();

    let body = server.requests_to("POST", "/alerts/4/posts")[0].json();
    assert_eq!(body["content"], "Seen at the bakery");
}

#[tokio::test]
async fn test_object_store_put() {
    let server = StubServer::start();
    server.respond("PUT /bucket/a.jpg", 200, serde_json::Value::Null);
    server.respond("PUT /bucket/denied.jpg", 403, serde_json::Value::Null);

    let storage = ObjectStoreClient::new(Duration::from_secs(5)).unwrap();

    storage
        .put_object(&server.url("/bucket/a.jpg"), vec![1, 2, 3], "image/jpeg")
        .await
        .unwrap();
    let put = &server.requests_to("PUT", "/bucket/a.jpg")[0];
    assert_eq!(put.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(put.body, vec![1, 2, 3]);
    assert!(put.authorization.is_none());

    let err = storage
        .put_object(&server.url("/bucket/denied.jpg"), vec![0], "image/jpeg")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
}
