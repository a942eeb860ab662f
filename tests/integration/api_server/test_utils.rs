use std::sync::Arc;
use std::time::Instant;

use axum_test::TestServer;
use chrono::{Duration, Utc};
use levelwatch::config::Config;
use levelwatch::core::http::{create_router, AppState};
use levelwatch::core::scanner::Scanner;
use levelwatch::metrics::Metrics;
use levelwatch::services::notifier::{Notifier, WebhookNotifier};
use levelwatch::services::price_source::PriceSource;
use levelwatch::services::yahoo::YahooPriceSource;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper structure bundling together the HTTP server and mocked
/// collaborators.
#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub price_api: MockServer,
    pub webhook: MockServer,
    pub scanner: Arc<Scanner>,
    pub metrics: Arc<Metrics>,
}

impl TestApp {
    /// Current price above the mocked previous-session high, webhook
    /// configured.
    pub async fn new() -> Self {
        Self::build(48_100.0, true).await
    }

    pub async fn with_price(price: f64) -> Self {
        Self::build(price, true).await
    }

    pub async fn without_webhook() -> Self {
        Self::build(48_100.0, false).await
    }

    async fn build(price: f64, webhook_configured: bool) -> Self {
        let price_api = MockServer::start().await;
        mock_current_price(&price_api, price).await;
        mock_previous_session(&price_api, 48_000.0, 47_500.0).await;

        let webhook = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&webhook)
            .await;

        let price_source: Arc<dyn PriceSource> = Arc::new(YahooPriceSource::with_client(
            price_api.uri(),
            reqwest::Client::new(),
        ));
        let webhook_url = webhook_configured.then(|| webhook.uri());
        let notifier: Arc<dyn Notifier> = Arc::new(WebhookNotifier::new(webhook_url));

        let config = Config {
            symbol: "NIFTYBANK".to_string(),
            ..Config::default()
        };
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let scanner = Arc::new(
            Scanner::new(&config, price_source, notifier.clone()).with_metrics(metrics.clone()),
        );

        let state = AppState {
            scanner: scanner.clone(),
            history: scanner.history().clone(),
            notifier,
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
        };
        let server = TestServer::new(create_router(state)).expect("start test server");

        Self {
            server,
            price_api,
            webhook,
            scanner,
            metrics,
        }
    }
}

pub async fn mock_current_price(server: &MockServer, price: f64) {
    let response = serde_json::json!({
        "chart": {
            "result": [{
                "meta": {
                    "regularMarketPrice": price,
                    "regularMarketTime": Utc::now().timestamp()
                },
                "timestamp": [],
                "indicators": { "quote": [{ "high": [], "low": [] }] }
            }]
        }
    });

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NIFTYBANK"))
        .and(query_param("range", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

/// Two daily bars: yesterday's completed session carries the given
/// high/low, today's running bar must be skipped by the fetch.
pub async fn mock_previous_session(server: &MockServer, high: f64, low: f64) {
    let yesterday = Utc::now() - Duration::days(1);
    let today = Utc::now();
    let response = serde_json::json!({
        "chart": {
            "result": [{
                "meta": {},
                "timestamp": [yesterday.timestamp(), today.timestamp()],
                "indicators": {
                    "quote": [{
                        "high": [high, high - 150.0],
                        "low": [low, low + 120.0]
                    }]
                }
            }]
        }
    });

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NIFTYBANK"))
        .and(query_param("range", "5d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}
