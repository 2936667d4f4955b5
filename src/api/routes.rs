use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers::merge::{self, AppState};
use crate::config::Config;
use crate::services::MergeService;

/// Create router with application state
pub fn create_router_with_state(config: Config, merge_service: Arc<MergeService>) -> Router {
    let state = AppState {
        config,
        merge_service,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/merge", post(merge::merge_results))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, MergeConfig, ServerConfig};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router(max_rows: usize) -> Router {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                style: "auto".to_string(),
            },
            merge: MergeConfig {
                default_database_type: "mysql".to_string(),
                max_rows,
                decorate_single_shard: false,
            },
        };
        let service = Arc::new(MergeService::new(&config.merge).unwrap());
        create_router_with_state(config, service)
    }

    async fn post_merge(router: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/merge")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn shards() -> Value {
        json!([
            { "rows": [[1, "a"], [2, "b"]] },
            { "rows": [[3, "c"], [4, null]] }
        ])
    }

    #[tokio::test]
    async fn test_health_check() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router(10).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_merge_endpoint() {
        let (status, body) = post_merge(
            router(10),
            json!({
                "sql": "SELECT id, name FROM t_order LIMIT 1, 2",
                "shards": shards()
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["row_count"], json!(2));
        assert_eq!(body["rows"], json!([[2, "b"], [3, "c"]]));
        assert_eq!(body["decorator"], json!("limit"));
        assert_eq!(body["pagination"]["offset"], json!(1));
        assert_eq!(body["pagination"]["revised_row_count"], json!(3));
    }

    #[tokio::test]
    async fn test_merge_endpoint_rejects_empty_sql() {
        let (status, body) = post_merge(router(10), json!({ "sql": "  ", "shards": shards() })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn test_merge_endpoint_rejects_non_select() {
        let (status, body) =
            post_merge(router(10), json!({ "sql": "DELETE FROM t_order", "shards": shards() })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("INVALID_SQL"));
    }

    #[tokio::test]
    async fn test_merge_endpoint_bad_parameter() {
        let (status, body) = post_merge(
            router(10),
            json!({
                "sql": "SELECT id FROM t_order LIMIT ?",
                "parameters": ["many"],
                "shards": shards()
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], json!("MERGE_ERROR"));
    }

    #[tokio::test]
    async fn test_merge_endpoint_row_limit() {
        let (status, body) =
            post_merge(router(3), json!({ "sql": "SELECT id FROM t_order", "shards": shards() })).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], json!("RESULT_TOO_LARGE"));
    }
}
