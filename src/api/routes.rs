use axum::http::{header, HeaderValue, Method};
use axum::{
    extract::ConnectInfo,
    routing::{get, post},
    Router,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorError, GovernorLayer,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::api::handlers::{self as api_handlers, AppState};
use crate::config::Settings;
use crate::{Error, Result};

/// Keys requests by peer IP, falling back to localhost when the server was
/// not started with connect info (e.g. in-process requests)
#[derive(Clone, Copy, Debug)]
struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<B>(&self, req: &axum::http::Request<B>) -> std::result::Result<Self::Key, GovernorError> {
        // Set by `into_make_service_with_connect_info`
        Ok(req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}

/// Apply a per-IP limit of `requests_per_second`, allowing bursts of twice
/// that
fn with_rate_limit(router: Router, requests_per_second: u64) -> Result<Router> {
    let rate = u32::try_from(requests_per_second)
        .ok()
        .filter(|rate| *rate > 0)
        .ok_or_else(|| {
            Error::Config(format!(
                "API rate limit must be between 1 and {}",
                u32::MAX
            ))
        })?;
    let burst = rate
        .checked_mul(2)
        .ok_or_else(|| Error::Config(format!("API rate limit {rate} is too large")))?;

    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        // one token is replenished every 1/rate seconds
        .period(Duration::from_secs(1) / rate)
        .burst_size(burst)
        .finish()
        .ok_or_else(|| Error::Config("Invalid rate limiter settings".to_string()))?;

    Ok(router.layer(GovernorLayer {
        config: Arc::new(config),
    }))
}

/// Create the router with all endpoints
pub fn create_router(state: AppState, settings: &Settings) -> Result<Router> {
    let api_routes = Router::new()
        // Pantry matching
        .route(
            "/ai/pantry-search-simple",
            post(api_handlers::pantry_search),
        )
        // Recipes
        .route("/recipes", get(api_handlers::search_recipes))
        .route("/recipes/trending", get(api_handlers::trending_recipes))
        .route("/recipes/recent", get(api_handlers::recent_recipes))
        .route("/recipes/:id", get(api_handlers::get_recipe))
        .route("/recipes/:id/scaled", get(api_handlers::scale_recipe))
        // Catalogue metadata
        .route("/categories", get(api_handlers::list_categories))
        .route("/dietary-tags", get(api_handlers::list_dietary_tags))
        .route("/stats", get(api_handlers::get_stats))
        .with_state(state.clone());

    let api_routes = with_rate_limit(api_routes, settings.server.api_rate_limit)?;

    let health_routes = Router::new()
        .route("/health", get(api_handlers::health_check))
        .route("/ready", get(api_handlers::readiness_check))
        .with_state(state);

    let router = Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(RequestBodyLimitLayer::new(
            settings.pagination.max_request_body_size,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_origin(tower_http::cors::Any)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewInstruction, RecipeDraft};
    use crate::db::recipes::{create_recipe, increment_views, sample_recipe};
    use crate::db::test_pool;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn create_test_state() -> AppState {
        AppState {
            pool: test_pool().await,
            settings: crate::config::test_settings(),
        }
    }

    async fn insert(state: &AppState, draft: RecipeDraft) -> i64 {
        create_recipe(&state.pool, &draft).await.unwrap().id
    }

    async fn seed(state: &AppState, title: &str, names: &[&str]) -> i64 {
        insert(state, sample_recipe(title, names)).await
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let app = create_router(state.clone(), &state.settings).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn pantry_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/ai/pantry-search-simple")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_pantry_search_ranks_matches() {
        let state = create_test_state().await;
        let bo = seed(&state, "Bò sốt cà", &["bò", "hành", "cà chua", "muối"]).await;
        let trung = seed(&state, "Trứng cà chua", &["Trứng", "Cà chua"]).await;
        seed(&state, "Trà đá", &[]).await;

        let (status, body) = send(
            &state,
            pantry_request(r#"{"ingredients": ["thịt bò", "cà chua", "trứng"]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total_recipes_checked"], 3);

        let matches = body["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0]["id"], trung);
        assert_eq!(matches[0]["match_percentage"], 100);
        assert_eq!(matches[1]["id"], bo);
        assert_eq!(matches[1]["match_percentage"], 50);
        assert_eq!(
            matches[1]["matched_ingredients"],
            serde_json::json!(["bò", "cà chua"])
        );
        assert_eq!(
            matches[1]["missing_ingredients"],
            serde_json::json!(["hành", "muối"])
        );
        assert_eq!(
            matches[1]["explanation"],
            "Công thức có 2/4 nguyên liệu bạn có"
        );
    }

    #[tokio::test]
    async fn test_pantry_search_respects_limit() {
        let state = create_test_state().await;
        for i in 0..5 {
            seed(&state, &format!("Cơm {i}"), &["cơm", "muối"]).await;
        }

        for body in [
            r#"{"ingredients": ["cơm"], "limit": 2}"#,
            r#"{"ingredients": ["cơm"], "limit": 2.0}"#,
            r#"{"ingredients": ["cơm"], "limit": "2"}"#,
        ] {
            let (status, response) = send(&state, pantry_request(body)).await;
            assert_eq!(status, StatusCode::OK, "body: {body}");
            assert_eq!(response["matches"].as_array().unwrap().len(), 2);
            assert_eq!(response["total_recipes_checked"], 5);
        }
    }

    #[tokio::test]
    async fn test_pantry_search_rejects_bad_input() {
        let state = create_test_state().await;

        for body in [
            r#"{"ingredients": []}"#,
            r#"{"ingredients": "bò"}"#,
            r#"{}"#,
            "not json",
        ] {
            let (status, response) = send(&state, pantry_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(response["error"], "Vui lòng cung cấp danh sách nguyên liệu");
        }

        for body in [
            r#"{"ingredients": ["bò"], "limit": 0}"#,
            r#"{"ingredients": ["bò"], "limit": "nhiều"}"#,
            r#"{"ingredients": ["bò"], "limit": [5]}"#,
        ] {
            let (status, response) = send(&state, pantry_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(
                response["error"],
                "Số lượng kết quả phải là số nguyên dương"
            );
        }
    }

    #[tokio::test]
    async fn test_recipe_search_and_detail() {
        let state = create_test_state().await;
        let mut draft = sample_recipe("Bún bò Huế", &["Bún", "Bò", "Sả"]);
        draft.categories = vec!["Soup".to_string()];
        draft.dietary_tags = vec!["Dairy-Free".to_string()];
        draft.instructions = vec![
            NewInstruction {
                instruction: "Ninh xương".to_string(),
                duration: Some(120),
            },
            NewInstruction {
                instruction: "Chan nước dùng".to_string(),
                duration: None,
            },
        ];
        let id = insert(&state, draft).await;
        let plain = seed(&state, "Bún riêu", &["Bún", "Cua"]).await;

        let (status, body) = send(&state, get_request("/api/recipes?q=b%C3%BAn%20b%C3%B2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipes"].as_array().unwrap().len(), 1);
        assert_eq!(body["recipes"][0]["id"], id);

        let (status, body) = send(&state, get_request("/api/recipes?category=Soup")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipes"].as_array().unwrap().len(), 1);

        // slugs resolve to the stored tag name
        let (status, body) = send(&state, get_request("/api/recipes?dietary=dairy-free")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipes"].as_array().unwrap().len(), 1);
        assert_eq!(body["recipes"][0]["id"], id);

        let (status, body) = send(&state, get_request("/api/recipes?q=b%C3%BAn")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipes"][0]["id"], plain);

        let (status, _) = send(&state, get_request("/api/recipes?difficulty=extreme")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&state, get_request(&format!("/api/recipes/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["views"], 1);
        assert_eq!(body["ingredients"][2]["name"], "Sả");
        assert_eq!(body["instructions"][1]["step_number"], 2);
        assert_eq!(body["instructions"][1]["instruction"], "Chan nước dùng");
        assert_eq!(body["categories"][0]["name"], "Soup");
        assert_eq!(body["dietary_tags"][0]["name"], "Dairy-Free");

        let (status, body) = send(&state, get_request("/api/recipes/9999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_scaled_ingredients() {
        let state = create_test_state().await;
        let id = seed(&state, "Cháo gà", &["Gạo", "Gà"]).await;

        let (status, body) = send(
            &state,
            get_request(&format!("/api/recipes/{id}/scaled?servings=8")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["base_servings"], 4);
        assert_eq!(body["multiplier"], 2.0);
        assert_eq!(body["ingredients"][0]["quantity"], 200.0);
        assert_eq!(body["ingredients"][0]["unit"], "g");

        let (status, body) = send(
            &state,
            get_request(&format!("/api/recipes/{id}/scaled?servings=8&to_unit=kg")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ingredients"][0]["quantity"], 0.2);
        assert_eq!(body["ingredients"][0]["unit"], "kg");

        let (status, _) = send(
            &state,
            get_request(&format!("/api/recipes/{id}/scaled?servings=8&to_unit=b%C3%A1t")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            get_request(&format!("/api/recipes/{id}/scaled?servings=21")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_trending_recent_and_stats() {
        let state = create_test_state().await;
        let quiet = seed(&state, "Bánh mì", &["Bánh mì"]).await;
        let hot = seed(&state, "Cơm tấm", &["Cơm", "Sườn"]).await;
        for _ in 0..101 {
            increment_views(&state.pool, hot).await.unwrap();
        }

        let (status, body) = send(&state, get_request("/api/recipes/trending")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipes"][0]["id"], hot);
        assert_eq!(body["recipes"][0]["badges"], serde_json::json!(["trending"]));
        assert_eq!(body["recipes"][1]["id"], quiet);
        assert_eq!(body["recipes"][1]["badges"], serde_json::json!([]));

        let (status, body) = send(&state, get_request("/api/recipes/recent")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["recipes"][0]["id"], hot);
        assert_eq!(body["recipes"][1]["id"], quiet);

        let (_, body) = send(&state, get_request("/api/recipes/recent?limit=1")).await;
        assert_eq!(body["recipes"].as_array().unwrap().len(), 1);

        let (status, body) = send(&state, get_request("/api/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_recipes"], 2);
        assert_eq!(body["total_ingredients"], 3);
        assert_eq!(body["recipes_today"], 2);
    }

    #[tokio::test]
    async fn test_dietary_tags_listed() {
        let state = create_test_state().await;

        let (status, body) = send(&state, get_request("/api/dietary-tags")).await;
        assert_eq!(status, StatusCode::OK);

        let tags = body["tags"].as_array().unwrap();
        assert!(tags
            .iter()
            .any(|t| t["name"] == "Gluten-Free" && t["type"] == "diet"));
    }

    #[tokio::test]
    async fn test_health_routes_exist() {
        let state = create_test_state().await;

        let (status, body) = send(&state, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&state, get_request("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], true);
    }

    #[test]
    fn test_rate_limit_settings_are_checked() {
        assert!(with_rate_limit(Router::new(), 100).is_ok());
        assert!(matches!(
            with_rate_limit(Router::new(), 0),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            with_rate_limit(Router::new(), u64::from(u32::MAX)),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            with_rate_limit(Router::new(), u64::MAX),
            Err(Error::Config(_))
        ));
    }
}
