pub mod energy_controller;
pub mod finance_controller;
pub mod weather_controller;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::routes::api_routes::app;
    use crate::services::upstream::{Provider, UpstreamClient, UpstreamError, UpstreamQuery};
    use crate::shared_state::AppState;

    pub type SentQueries = Arc<Mutex<Vec<Vec<(&'static str, String)>>>>;

    /// Answers every request with the same payload and keeps the query
    /// pairs it was asked for.
    pub struct StaticUpstream {
        payload: Value,
        sent: SentQueries,
    }

    impl StaticUpstream {
        pub fn new(payload: Value) -> Self {
            Self { payload, sent: SentQueries::default() }
        }

        pub fn sent(&self) -> SentQueries {
            Arc::clone(&self.sent)
        }
    }

    #[async_trait]
    impl UpstreamClient for StaticUpstream {
        async fn fetch(&self, provider: Provider, query: &UpstreamQuery) -> Result<Value, UpstreamError> {
            self.sent.lock().unwrap().push(query.to_pairs(provider));
            Ok(self.payload.clone())
        }
    }

    pub struct FailingUpstream;

    #[async_trait]
    impl UpstreamClient for FailingUpstream {
        async fn fetch(&self, _provider: Provider, _query: &UpstreamQuery) -> Result<Value, UpstreamError> {
            Err(UpstreamError::Status(503))
        }
    }

    pub fn app_with(config: Config, upstream: impl UpstreamClient + 'static) -> Router {
        app(AppState::new(config, Arc::new(upstream)))
    }

    pub fn static_app(payload: Value) -> Router {
        app_with(Config::default(), StaticUpstream::new(payload))
    }

    pub fn failing_app() -> Router {
        app_with(Config::default(), FailingUpstream)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }
}
