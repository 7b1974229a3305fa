//! API integration tests
//!
//! Drive the full router against an in-memory database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bibliotheca_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

const ADMIN_PASSWORD: &str = "correct-horse";

async fn test_app() -> Router {
    let repository = Repository::in_memory()
        .await
        .expect("Failed to open in-memory database");
    repository.migrate().await.expect("Failed to run migrations");

    let config = AppConfig::default();
    let services = Services::new(repository, config.auth.clone());
    api::router(AppState::new(config, services))
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            panic!(
                "Failed to parse response: {} - Body: {:?}",
                e,
                String::from_utf8_lossy(&body)
            )
        })
    };
    (status, value)
}

/// Register the first administrator and log in
async fn login(app: &Router) -> String {
    let (status, _) = send(
        app,
        request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "librarian",
                "email": "librarian@example.org",
                "password": ADMIN_PASSWORD,
                "password_confirm": ADMIN_PASSWORD
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": " Librarian ", "password": ADMIN_PASSWORD })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["admin"].get("password_hash").is_none());
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create(app: &Router, token: &str, uri: &str, body: Value) -> Value {
    let (status, body) = send(app, request(Method::POST, uri, Some(token), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED, "POST {} failed: {}", uri, body);
    body
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;

    let (status, body) = send(&app, request(Method::GET, "/api/v1/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, request(Method::GET, "/api/v1/ready", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app().await;
    let (status, body) = send(&app, request(Method::GET, "/api-docs/openapi.json", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books"].is_object());
}

#[tokio::test]
async fn test_records_require_a_session() {
    let app = test_app().await;

    for uri in ["/api/v1/books", "/api/v1/members/search?q=a", "/api/v1/dashboard", "/api/v1/auth/me"] {
        let (status, body) = send(&app, request(Method::GET, uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "GET {}", uri);
        assert_eq!(body["error"], "NotAuthorized");
    }

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/authors",
            Some("not-a-token"),
            Some(json!({ "name": "Nobody" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing was written by the rejected request
    let token = login(&app).await;
    let (_, body) = send(&app, request(Method::GET, "/api/v1/authors", Some(&token), None)).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = test_app().await;
    login(&app).await;

    for (username, password) in [("librarian", "wrong-password"), ("nobody", ADMIN_PASSWORD)] {
        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid username or password");
    }
}

#[tokio::test]
async fn test_second_registration_needs_a_session() {
    let app = test_app().await;
    let token = login(&app).await;
    let registration = json!({
        "username": "assistant",
        "password": "another-pass",
        "password_confirm": "another-pass"
    });

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/v1/auth/register", None, Some(registration.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/v1/auth/register", Some(&token), Some(registration)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "assistant");
}

#[tokio::test]
async fn test_session_cookie_and_logout() {
    let app = test_app().await;
    login(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "librarian", "password": ADMIN_PASSWORD })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Session cookie not set")
        .to_string();
    assert!(set_cookie.starts_with("bibliotheca_session="));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let with_cookie = |method: Method, uri: &str| {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie.clone())
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = send(&app, with_cookie(Method::GET, "/api/v1/auth/me")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "librarian");

    let (status, _) = send(&app, with_cookie(Method::POST, "/api/v1/auth/logout")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, with_cookie(Method::GET, "/api/v1/auth/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_bearer_token() {
    let app = test_app().await;
    let token = login(&app).await;

    let (status, _) = send(&app, request(Method::GET, "/api/v1/dashboard", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, request(Method::POST, "/api/v1/auth/logout", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, request(Method::GET, "/api/v1/dashboard", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_crud_flow() {
    let app = test_app().await;
    let token = login(&app).await;

    let author = create(
        &app,
        &token,
        "/api/v1/authors",
        json!({ "name": "Ursula K. Le Guin", "biography": "Earthsea and beyond" }),
    )
    .await;
    let category = create(
        &app,
        &token,
        "/api/v1/categories",
        json!({ "name": "Fantasy" }),
    )
    .await;

    // Unknown author is a validation error
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/books",
            Some(&token),
            Some(json!({ "title": "Ghost", "author_id": 999, "category_id": category["id"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let book = create(
        &app,
        &token,
        "/api/v1/books",
        json!({
            "title": "A Wizard of Earthsea",
            "author_id": author["id"],
            "category_id": category["id"],
            "publication_year": 1968,
            "isbn": "978-0-547-72202-3"
        }),
    )
    .await;
    assert_eq!(book["copies"], 1);
    let book_uri = format!("/api/v1/books/{}", book["id"]);

    let (status, fetched) = send(&app, request(Method::GET, &book_uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, book);

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/v1/books/search?q=wizard&filter=title", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["author_name"], "Ursula K. Le Guin");

    let (_, body) = send(
        &app,
        request(Method::GET, "/api/v1/books/search?q=dragonlance&page=", Some(&token), None),
    )
    .await;
    assert_eq!(body["items"], json!([]));

    let (status, updated) = send(
        &app,
        request(Method::PUT, &book_uri, Some(&token), Some(json!({ "copies": 4 }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["copies"], 4);
    assert_eq!(updated["title"], "A Wizard of Earthsea");

    // Referenced author and category stay put
    let author_uri = format!("/api/v1/authors/{}", author["id"]);
    let (status, body) = send(&app, request(Method::DELETE, &author_uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ConstraintViolation");
    let category_uri = format!("/api/v1/categories/{}", category["id"]);
    let (status, _) = send(&app, request(Method::DELETE, &category_uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, request(Method::DELETE, &book_uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request(Method::GET, &book_uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request(Method::DELETE, &author_uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_duplicate_names_conflict() {
    let app = test_app().await;
    let token = login(&app).await;

    create(&app, &token, "/api/v1/categories", json!({ "name": "Poetry" })).await;
    let (status, _) = send(
        &app,
        request(Method::POST, "/api/v1/categories", Some(&token), Some(json!({ "name": "POETRY" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    create(&app, &token, "/api/v1/members", json!({ "username": "reader" })).await;
    let (status, _) = send(
        &app,
        request(Method::POST, "/api/v1/members", Some(&token), Some(json!({ "username": "Reader" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_global_search_and_dashboard() {
    let app = test_app().await;
    let token = login(&app).await;

    create(
        &app,
        &token,
        "/api/v1/members",
        json!({ "username": "tolkien_reader", "email": "reader@example.org" }),
    )
    .await;
    create(&app, &token, "/api/v1/authors", json!({ "name": "J. R. R. Tolkien" })).await;

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/v1/search?q=tolkien&type=members", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search_type"], "members");
    assert_eq!(body["members"].as_array().map(Vec::len), Some(1));
    assert!(body["authors"].is_null());

    let (_, body) = send(&app, request(Method::GET, "/api/v1/search?q=tolkien", Some(&token), None)).await;
    assert_eq!(body["authors"].as_array().map(Vec::len), Some(1));

    let (status, body) = send(&app, request(Method::GET, "/api/v1/dashboard", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_members"], 1);
    assert_eq!(body["total_authors"], 1);
    assert_eq!(body["recent_members"][0]["username"], "tolkien_reader");
}

#[tokio::test]
async fn test_malformed_input_is_a_json_bad_value() {
    let app = test_app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/v1/books", Some(&token), Some(json!({ "title": "Dune" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["code"], 5);

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/v1/books", None, Some(json!({ "title": "Dune" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, body) = send(&app, request(Method::GET, "/api/v1/books?page=abc", Some(&token), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, _) = send(&app, request(Method::GET, "/api/v1/books?page=abc", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, request(Method::GET, "/api/v1/authors/abc", Some(&token), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/v1/auth/login", None, Some(json!({ "username": "librarian" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_bearer_token_wins_over_stale_cookie() {
    let app = test_app().await;
    let token = login(&app).await;

    // A second session, then revoke it so its cookie goes stale
    let (_, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "librarian", "password": ADMIN_PASSWORD })),
        ),
    )
    .await;
    let stale = body["token"].as_str().unwrap().to_string();
    let (status, _) = send(&app, request(Method::POST, "/api/v1/auth/logout", Some(&stale), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let cookie = format!("bibliotheca_session={}", stale);
    let with_cookie = |bearer: Option<&str>| {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri("/api/v1/auth/me")
            .header(header::COOKIE, cookie.clone());
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
        }
        builder.body(Body::empty()).unwrap()
    };

    let (status, body) = send(&app, with_cookie(Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "librarian");

    let (status, _) = send(&app, with_cookie(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A bad bearer still falls back to a live cookie
    let live = format!("bibliotheca_session={}", token);
    let (status, _) = send(
        &app,
        Request::builder()
            .method(Method::GET)
            .uri("/api/v1/auth/me")
            .header(header::COOKIE, live)
            .header(header::AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_blank_global_search_returns_null_sections() {
    let app = test_app().await;
    let token = login(&app).await;
    create(&app, &token, "/api/v1/authors", json!({ "name": "Ödön von Horváth" })).await;

    let (status, body) = send(&app, request(Method::GET, "/api/v1/search?q=%20%20", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "");
    for section in ["books", "members", "authors", "categories"] {
        assert!(body[section].is_null(), "{} should be null: {}", section, body);
    }

    let (_, body) = send(
        &app,
        request(Method::GET, "/api/v1/search?q=%C3%B6d%C3%B6n&type=authors", Some(&token), None),
    )
    .await;
    assert_eq!(body["authors"].as_array().map(Vec::len), Some(1));
}
