//! Liveness sidecar.
//!
//! Hosting platforms probe an HTTP port to decide whether the process is
//! alive. This server answers those probes and nothing else; it shares no
//! state with the message pipeline.

use axum::{http::StatusCode, routing::get, Router};
use sigma_core::{config::HealthConfig, error::SigmaError};
use tracing::info;

/// Body returned by every liveness probe.
pub const LIVENESS_BODY: &str = "Bot is running.";

async fn liveness() -> (StatusCode, &'static str) {
    (StatusCode::OK, LIVENESS_BODY)
}

fn build_router() -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(liveness))
}

/// Serve liveness probes. Called from `Gateway::run()`.
///
/// Only returns on a bind or serve failure.
pub async fn serve(config: HealthConfig) -> Result<(), SigmaError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SigmaError::Config(format!("liveness server failed to bind to {addr}: {e}")))?;

    info!("Liveness server listening on {addr}");

    axum::serve(listener, build_router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_text(resp: axum::http::Response<Body>) -> String {
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_reports_running() {
        let req = Request::get("/").body(Body::empty()).unwrap();
        let resp = build_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "Bot is running.");
    }

    #[tokio::test]
    async fn test_health_path_reports_running() {
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let resp = build_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, LIVENESS_BODY);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let req = Request::get("/api/pair").body(Body::empty()).unwrap();
        let resp = build_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_is_rejected() {
        let req = Request::post("/").body(Body::empty()).unwrap();
        let resp = build_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_serve_reports_bind_failure() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let err = serve(HealthConfig {
            enabled: true,
            host: "127.0.0.1".into(),
            port,
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("failed to bind"));
    }
}
