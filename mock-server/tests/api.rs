use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::records::{Artwork, Contact, DashboardStats, Image, LoginResponse};
use mock_server::{app, app_with, MockConfig};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn get(uri: &str, token: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(String::new())
        .unwrap()
}

async fn login(app: &Router) -> LoginResponse {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"username":"admin","password":"admin123"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

fn multipart_upload(token: &str, payload: &[u8]) -> Request<Body> {
    let boundary = "test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"altText\"\r\n\r\nSunset\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"sunset.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri("/api/images/upload")
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn login_issues_tokens() {
    let app = app();
    let session = login(&app).await;
    assert_eq!(session.username, "admin");
    assert!(!session.access_token.is_empty());
    assert_ne!(session.access_token, session.refresh_token);
    assert!(session.expires_at > chrono::Utc::now());
}

#[tokio::test]
async fn wrong_password_is_401_with_message() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"username":"admin","password":"nope"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn configured_credentials_are_used() {
    let app = app_with(MockConfig {
        admin_user: "owner".to_string(),
        admin_password: "s3cret".to_string(),
        ..MockConfig::default()
    });
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"username":"owner","password":"s3cret"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_route_requires_bearer() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/artworks")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn refresh_rotates_and_logout_revokes() {
    let app = app();
    let first = login(&app).await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            None,
            &format!(r#"{{"refreshToken":"{}"}}"#, first.refresh_token),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let second: LoginResponse = body_json(resp).await;

    // The old access token is gone with its refresh token.
    let resp = app
        .clone()
        .oneshot(get("/api/artworks", &first.access_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/logout",
            Some(&second.access_token),
            &format!(r#"{{"refreshToken":"{}"}}"#, second.refresh_token),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get("/api/artworks", &second.access_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- collections ---

#[tokio::test]
async fn artwork_crud_lifecycle() {
    let app = app();
    let token = login(&app).await.access_token;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/artworks",
            Some(&token),
            r#"{"title":"Dawn","typeName":"painting","year":2021}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let ack: Value = body_json(resp).await;
    let id = ack["id"].as_i64().unwrap();

    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/artworks/{id}"),
            Some(&token),
            r#"{"title":"Dusk","typeName":"painting","published":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(get(&format!("/api/artworks/{id}"), &token))
        .await
        .unwrap();
    let artwork: Artwork = body_json(resp).await;
    assert_eq!(artwork.title, "Dusk");
    assert!(artwork.published);
    assert_eq!(artwork.year, None);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/artworks/{id}"))
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = app
        .oneshot(get(&format!("/api/artworks/{id}"), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "artwork not found");
}

#[tokio::test]
async fn blank_title_is_400() {
    let app = app();
    let token = login(&app).await.access_token;
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/writings",
            Some(&token),
            r#"{"title":" ","typeName":"essay"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "title is required");
}

#[tokio::test]
async fn malformed_json_keeps_message_body() {
    let app = app();
    let token = login(&app).await.access_token;
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/navigation/items",
            Some(&token),
            r#"{"label":1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn bad_id_returns_400() {
    let app = app();
    let token = login(&app).await.access_token;
    let resp = app
        .oneshot(get("/api/site/sections/not-a-number", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn type_lists_are_seeded() {
    let app = app();
    let token = login(&app).await.access_token;
    let resp = app
        .oneshot(get("/api/writings/types", &token))
        .await
        .unwrap();
    let types: Value = body_json(resp).await;
    assert_eq!(types[0]["name"], "essay");
}

// --- contacts ---

#[tokio::test]
async fn mark_read_updates_dashboard() {
    let app = app();
    let token = login(&app).await.access_token;

    let resp = app
        .clone()
        .oneshot(get("/api/contacts", &token))
        .await
        .unwrap();
    let contacts: Vec<Contact> = body_json(resp).await;
    let unread = contacts.iter().find(|c| !c.is_read).unwrap().id;

    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/contacts/{unread}/read"),
            Some(&token),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get("/api/dashboard/stats", &token))
        .await
        .unwrap();
    let stats: DashboardStats = body_json(resp).await;
    assert_eq!(stats.contact_count, 2);
    assert_eq!(stats.unread_contact_count, 0);
}

// --- images ---

#[tokio::test]
async fn upload_then_batch_delete() {
    let app = app();
    let token = login(&app).await.access_token;

    let resp = app
        .clone()
        .oneshot(multipart_upload(&token, &[0xFF, 0xD8, 0xFF, 0xE0]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let image: Image = body_json(resp).await;
    assert_eq!(image.filename, "sunset.jpg");
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.size_bytes, 4);
    assert_eq!(image.alt_text.as_deref(), Some("Sunset"));

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/images/batch-delete",
            Some(&token),
            &format!(r#"{{"ids":[{},999]}}"#, image.id),
        ))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "1 images deleted");

    let resp = app.oneshot(get("/api/images", &token)).await.unwrap();
    let images: Vec<Image> = body_json(resp).await;
    assert!(images.is_empty());
}

#[tokio::test]
async fn empty_batch_is_400() {
    let app = app();
    let token = login(&app).await.access_token;
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/images/batch-delete",
            Some(&token),
            r#"{"ids":[]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let app = app_with(MockConfig {
        upload_limit: 1024,
        ..MockConfig::default()
    });
    let token = login(&app).await.access_token;
    let resp = app
        .oneshot(multipart_upload(&token, &vec![0u8; 4096]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Payload Too Large");
}

// --- site ---

#[tokio::test]
async fn setting_update_is_visible_in_list() {
    let app = app();
    let token = login(&app).await.access_token;
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/site/settings/3",
            Some(&token),
            r#"{"value":"true"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get("/api/site/settings", &token))
        .await
        .unwrap();
    let settings: Value = body_json(resp).await;
    assert_eq!(settings[2]["key"], "maintenance_mode");
    assert_eq!(settings[2]["value"], "true");
}
