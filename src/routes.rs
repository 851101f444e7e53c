use crate::{
    handlers, // Import handlers module
    AppState, // Use the AppState defined in main.rs
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::{path::Path, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Creates the Axum router and associates routes with handlers.
///
/// With `static_dir` set, every path the API does not claim is served from that
/// directory, falling back to its `index.html` for client-side routes.
pub fn create_router(state: Arc<AppState>, static_dir: Option<&str>) -> Router {
    let mut router = Router::new()
        .route("/api/generate-memes", post(handlers::generate_memes))
        .route("/api/history", get(handlers::list_history))
        .route(
            "/api/history/{id}",
            get(handlers::get_history_entry).delete(handlers::delete_history_entry),
        )
        .route("/api/health", get(handlers::health));

    if let Some(dir) = static_dir {
        let index = Path::new(dir).join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
        // Middleware Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state) // Pass the application state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::HistoryStore,
        errors::HistoryError,
        models::HistoryEntry,
        orchestrator::{
            MemeOrchestrator,
            tests::{ScriptedCaptions, StubRenderer},
        },
        repositories::InMemoryHistoryStore,
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tower::ServiceExt; // for `oneshot`

    fn state_with(succeeds: fn(usize) -> bool, history: Arc<dyn HistoryStore>) -> Arc<AppState> {
        Arc::new(AppState {
            orchestrator: MemeOrchestrator::new(ScriptedCaptions::new(succeeds), StubRenderer::new(true, true)),
            history,
            groq_configured: true,
        })
    }

    fn app(succeeds: fn(usize) -> bool) -> (Router, Arc<dyn HistoryStore>) {
        let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
        (create_router(state_with(succeeds, history.clone()), None), history)
    }

    /// History backend whose every call fails, as an unreachable bucket would.
    struct FailingHistoryStore;

    #[async_trait]
    impl HistoryStore for FailingHistoryStore {
        async fn append(&self, _entry: HistoryEntry) -> Result<(), HistoryError> {
            Err(HistoryError::DataCorruption("unreadable".into()))
        }

        async fn list(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
            Err(HistoryError::DataCorruption("unreadable".into()))
        }

        async fn get(&self, _id: &str) -> Result<Option<HistoryEntry>, HistoryError> {
            Err(HistoryError::DataCorruption("unreadable".into()))
        }

        async fn delete(&self, _id: &str) -> Result<bool, HistoryError> {
            Err(HistoryError::DataCorruption("unreadable".into()))
        }
    }

    fn failing_app() -> Router {
        create_router(state_with(|_| true, Arc::new(FailingHistoryStore)), None)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn generate_request(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/generate-memes")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn generates_three_memes_and_records_history() {
        let (app, history) = app(|_| true);

        let (status, body) = send(app, generate_request(json!({ "topic": "Cricket" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let memes = body["memes"].as_array().unwrap();
        assert_eq!(memes.len(), 3);
        assert!(memes.iter().all(|m| !m["imageBase64"].as_str().unwrap().is_empty()));

        let history_id = body["historyId"].as_str().unwrap();
        assert!(!history_id.is_empty());
        let stored = history.list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, history_id);
        assert_eq!(stored[0].topic, "Cricket");
    }

    #[tokio::test]
    async fn empty_or_missing_topic_is_rejected() {
        for body in [json!({ "topic": "" }), json!({})] {
            let (app, history) = app(|_| true);
            let (status, body) = send(app, generate_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "success": false, "error": "Topic is required" }));
            assert!(history.list().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (app, _) = app(|_| true);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/generate-memes")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn total_failure_returns_500_without_history() {
        let (app, history) = app(|_| false);
        let (status, body) = send(app, generate_request(json!({ "topic": "Cricket" }))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to generate any memes after multiple attempts.");
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_history_with_total() {
        let (app, history) = app(|_| true);
        history.append(HistoryEntry::new("Tea", Vec::new())).await.unwrap();

        let (status, body) = send(app, get_request("/api/history")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 1);
        assert_eq!(body["history"][0]["topic"], "Tea");
    }

    #[tokio::test]
    async fn fetches_and_deletes_history_entries() {
        let (app, history) = app(|_| true);
        let entry = HistoryEntry::new("Tea", Vec::new());
        let id = entry.id.clone();
        history.append(entry).await.unwrap();

        let (status, body) = send(app.clone(), get_request(&format!("/api/history/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entry"]["id"], id.as_str());

        let request = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/history/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "message": "Deleted" }));
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_id_is_not_found() {
        let (app, history) = app(|_| true);
        history.append(HistoryEntry::new("Tea", Vec::new())).await.unwrap();

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/history/does-not-exist")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "error": "Not found" }));
        assert_eq!(history.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn health_reports_configuration() {
        let (app, _) = app(|_| true);
        let (status, body) = send(app, get_request("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["historyCount"], 0);
        assert_eq!(body["templates"], crate::templates::MEMEGEN_TEMPLATES.len());
        assert_eq!(body["groqConfigured"], true);
    }

    #[tokio::test]
    async fn preflight_is_answered_for_any_origin() {
        let (app, _) = app(|_| true);
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/generate-memes")
            .header(header::ORIGIN, "https://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn memes_are_returned_when_history_cannot_be_written() {
        let (status, body) = send(failing_app(), generate_request(json!({ "topic": "Cricket" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["memes"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unreadable_history_lists_as_empty() {
        let (status, body) = send(failing_app(), get_request("/api/history")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "history": [], "total": 0 }));
    }

    #[tokio::test]
    async fn backend_failures_on_lookup_are_server_errors() {
        let (status, body) = send(failing_app(), get_request("/api/history/1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/history/1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(failing_app(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn health_survives_unreadable_history() {
        let (status, body) = send(failing_app(), get_request("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["historyCount"], 0);
    }
}
