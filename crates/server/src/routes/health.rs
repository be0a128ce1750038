//! Service banner and health checks.

use axum::{extract::State, http::StatusCode};

use crate::db;
use crate::state::AppState;

/// Banner at `/`, kept for uptime monitors that match on it.
pub async fn banner() -> &'static str {
    "Successfully running petBuddy server!"
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store does not answer a ping.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match db::ping(state.db()).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::routes::test_support::app;

    #[tokio::test]
    async fn test_banner_and_liveness() {
        for (uri, expected) in [
            ("/", "Successfully running petBuddy server!"),
            ("/health", "ok"),
        ] {
            let response = app()
                .await
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(bytes, expected.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_readiness_fails_without_store() {
        let response = app()
            .await
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
