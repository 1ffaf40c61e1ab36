use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use bepviet::api::handlers::AppState;
use bepviet::api::routes::create_router;
use bepviet::cli::seed::seed_from_file;
use bepviet::config::{DatabaseConfig, PaginationConfig, PantryConfig, ServerConfig, Settings};
use bepviet::db;
use serde_json::Value;
use std::io::Write;
use std::time::Duration;
use tower::ServiceExt;

fn settings() -> Settings {
    Settings {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connection_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            external_url: None,
            api_rate_limit: 100,
        },
        pagination: PaginationConfig {
            api_max_limit: 100,
            default_page_size: 20,
            max_request_body_size: 1048576,
        },
        pantry: PantryConfig::default(),
    }
}

async fn seeded_state() -> AppState {
    let pool = db::init_pool("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        r#"[
            {
                "title": "Bò kho",
                "thumbnail_url": "https://cdn.example.com/bo-kho-thumb.jpg",
                "image_url": "https://cdn.example.com/bo-kho.jpg",
                "servings": 4,
                "ingredients": [
                    {"name": "Bò"}, {"name": "Hành"}, {"name": "Cà chua"}, {"name": "Muối"}
                ]
            },
            {
                "title": "Trứng luộc",
                "image_url": "https://cdn.example.com/trung.jpg",
                "ingredients": [{"name": "Trứng"}]
            }
        ]"#
        .as_bytes(),
    )
    .unwrap();

    let inserted = seed_from_file(&pool, file.path()).await.unwrap();
    assert_eq!(inserted, 2);

    AppState {
        pool,
        settings: settings(),
    }
}

async fn post_pantry(state: &AppState, body: &str) -> (StatusCode, Value) {
    let app = create_router(state.clone(), &state.settings).unwrap();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/ai/pantry-search-simple")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_pantry_endpoint_end_to_end() {
    let state = seeded_state().await;

    let (status, body) = post_pantry(&state, r#"{"ingredients": ["thịt bò", "cà chua"]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_recipes_checked"], 2);

    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["title"], "Bò kho");
    assert_eq!(matches[0]["match_percentage"], 50);
    assert_eq!(
        matches[0]["thumbnail"],
        "https://cdn.example.com/bo-kho-thumb.jpg"
    );
    assert_eq!(matches[0]["servings"], 4);
    assert_eq!(
        matches[0]["explanation"],
        "Công thức có 2/4 nguyên liệu bạn có"
    );
}

#[tokio::test]
async fn test_thumbnail_falls_back_to_image() {
    let state = seeded_state().await;

    let (status, body) = post_pantry(&state, r#"{"ingredients": ["trứng"]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"][0]["title"], "Trứng luộc");
    assert_eq!(body["matches"][0]["match_percentage"], 100);
    assert_eq!(
        body["matches"][0]["thumbnail"],
        "https://cdn.example.com/trung.jpg"
    );
}

#[tokio::test]
async fn test_empty_pantry_is_bad_request() {
    let state = seeded_state().await;

    let (status, body) = post_pantry(&state, r#"{"ingredients": []}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Vui lòng cung cấp danh sách nguyên liệu");
}

#[tokio::test]
async fn test_numeric_limit_forms() {
    let state = seeded_state().await;

    for body in [
        r#"{"ingredients": ["trứng", "bò"], "limit": 1.0}"#,
        r#"{"ingredients": ["trứng", "bò"], "limit": "1"}"#,
    ] {
        let (status, response) = post_pantry(&state, body).await;
        assert_eq!(status, StatusCode::OK, "body: {body}");
        assert_eq!(response["matches"].as_array().unwrap().len(), 1);
    }

    let (status, response) =
        post_pantry(&state, r#"{"ingredients": ["trứng"], "limit": "một"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Số lượng kết quả phải là số nguyên dương");
}

#[tokio::test]
async fn test_rate_limit_refills_over_time() {
    let state = seeded_state().await;
    let mut limited = settings();
    // burst of 8, one more request every 250ms
    limited.server.api_rate_limit = 4;
    let app = create_router(state, &limited).unwrap();

    let get = |app: axum::Router| async move {
        app.oneshot(
            Request::builder()
                .uri("/api/categories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    };

    for _ in 0..8 {
        assert_eq!(get(app.clone()).await, StatusCode::OK);
    }
    assert_eq!(get(app.clone()).await, StatusCode::TOO_MANY_REQUESTS);

    // health checks are outside the limited routes
    let health = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_secs(1)).await;

    for _ in 0..3 {
        assert_eq!(get(app.clone()).await, StatusCode::OK);
    }
}
