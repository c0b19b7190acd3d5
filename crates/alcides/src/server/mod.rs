pub mod auth;
mod routes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{config::DEFAULT_MAX_BODY_BYTES, metrics::Metrics, rundeck::JobRunner, Result};

pub use auth::{AuthError, Credential, RELAY_USERNAME};

/// Everything a request handler needs. Built once at startup, read-only after.
pub struct Relay {
    pub credential: Credential,
    pub runner: Arc<dyn JobRunner>,
    pub metrics: Metrics,
}

pub struct Server {
    relay: Arc<Relay>,
    body_limit: usize,
}

impl Server {
    pub fn new(credential: Credential, runner: Arc<dyn JobRunner>) -> Result<Self> {
        let relay = Relay {
            credential,
            runner,
            metrics: Metrics::new()?,
        };
        Ok(Self {
            relay: Arc::new(relay),
            body_limit: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Largest request body accepted; bigger ones get 413.
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn build_router(self) -> Router {
        Router::new()
            .route(
                "/alerts",
                post(routes::receive_alerts).fallback(routes::unsupported_method),
            )
            .route("/status", get(routes::status))
            .route("/metrics", get(routes::metrics))
            .layer(DefaultBodyLimit::max(self.body_limit))
            .layer(TraceLayer::new_for_http())
            .with_state(self.relay)
    }

    pub async fn start(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);
        axum::serve(listener, self.build_router()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rundeck::{Execution, MockJobRunner},
        Error,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    const GOOD_AUTH: &str = "Basic YWxjaWRlczpzZWNyZXQ=";

    fn router(runner: MockJobRunner) -> Router {
        Server::new(Credential::new("secret"), Arc::new(runner))
            .unwrap()
            .build_router()
    }

    fn post_alerts(auth: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::post("/alerts").header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn non_post_alerts_is_bad_request() {
        let app = router(MockJobRunner::new());
        for method in ["GET", "PUT", "DELETE", "PATCH"] {
            let request = Request::builder()
                .method(method)
                .uri("/alerts")
                .body(Body::from("not json"))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method}");
            assert_eq!(body_text(response).await, "unsupported HTTP method");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request_before_auth() {
        let app = router(MockJobRunner::new());
        let response = app.oneshot(post_alerts(None, "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "invalid request body");
    }

    #[tokio::test]
    async fn body_is_decoded_without_content_type() {
        let mut runner = MockJobRunner::new();
        runner.expect_run_job().times(1).returning(|_| {
            Ok(Execution {
                id: 1,
                permalink: None,
                status: None,
            })
        });
        let request = Request::post("/alerts")
            .header(AUTHORIZATION, GOOD_AUTH)
            .body(Body::from(r#"{"alerts":[{"labels":{"rundeck_job_id":"42"}}]}"#))
            .unwrap();
        let response = router(runner).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn null_body_is_an_empty_batch() {
        let response = router(MockJobRunner::new())
            .oneshot(post_alerts(Some(GOOD_AUTH), "null"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn batches_above_two_mebibytes_are_accepted() {
        let alert = r#"{"labels":{"alertname":"NoJob"}}"#;
        let alerts = vec![alert; 100_000].join(",");
        let body = format!(r#"{{"alerts":[{alerts}]}}"#);
        assert!(body.len() > 2 * 1024 * 1024);

        let response = router(MockJobRunner::new())
            .oneshot(post_alerts(Some(GOOD_AUTH), &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn body_over_configured_limit_is_rejected() {
        let app = Server::new(Credential::new("secret"), Arc::new(MockJobRunner::new()))
            .unwrap()
            .with_body_limit(64)
            .build_router();
        let body = r#"{"alerts":[{"labels":{"alertname":"Padding","rundeck_job_id":"42"}}]}"#;
        let response = app.oneshot(post_alerts(Some(GOOD_AUTH), body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn unauthenticated_batch_is_silently_dropped() {
        let app = router(MockJobRunner::new());
        let body = r#"{"alerts":[{"labels":{"rundeck_job_id":"42"}}]}"#;
        for auth in [None, Some("Basic YWxjaWRlczp3cm9uZw=="), Some("Bearer abc")] {
            let response = app.clone().oneshot(post_alerts(auth, body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(body_text(response).await.is_empty());
        }
    }

    #[tokio::test]
    async fn status_reflects_rundeck_reachability() {
        let mut runner = MockJobRunner::new();
        runner.expect_ping().times(1).returning(|| Ok(()));
        let response = router(runner)
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Status checks OK");

        let mut runner = MockJobRunner::new();
        runner.expect_ping().times(1).returning(|| {
            Err(Error::Rundeck {
                status: 503,
                body: String::new(),
            })
        });
        let response = router(runner)
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
