#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use nrega_common::types::UpstreamRecord;
use nrega_server::app;
use nrega_server::config::ServerConfig;
use nrega_server::state::AppState;
use nrega_server::sync::jobs::SyncJobRegistry;
use nrega_storage::ReportStore;
use nrega_upstream::error::{self, UpstreamError};
use nrega_upstream::RecordSource;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

/// Scripted record source: each fetch pops the next queued response. An
/// exhausted queue serves empty pages.
pub struct MockSource {
    responses: Mutex<VecDeque<error::Result<Vec<UpstreamRecord>>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_records(&self, records: Vec<Value>) {
        let records = records
            .into_iter()
            .map(|v| v.as_object().expect("test record is an object").clone())
            .collect();
        self.responses
            .lock()
            .expect("mock lock")
            .push_back(Ok(records));
    }

    pub fn push_error(&self, error: UpstreamError) {
        self.responses
            .lock()
            .expect("mock lock")
            .push_back(Err(error));
    }
}

#[async_trait::async_trait]
impl RecordSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_records(
        &self,
        _state_name: &str,
        _fin_year: &str,
    ) -> error::Result<Vec<UpstreamRecord>> {
        self.responses
            .lock()
            .expect("mock lock")
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub struct TestContext {
    pub state: AppState,
    pub app: axum::Router,
    pub source: Arc<MockSource>,
}

pub async fn build_test_context() -> Result<TestContext> {
    let store = Arc::new(ReportStore::new("sqlite::memory:").await?);
    let source = Arc::new(MockSource::new());
    let config: ServerConfig = toml::from_str("")?;

    let state = AppState {
        store,
        source: source.clone(),
        jobs: Arc::new(SyncJobRegistry::new()),
        config: Arc::new(config),
        start_time: Utc::now(),
    };
    let app = app::build_http_app(state.clone());

    Ok(TestContext { state, app, source })
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(value) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

/// Poll a sync job until it leaves the running state.
pub async fn await_job(app: &axum::Router, job_id: &str) -> Value {
    for _ in 0..200 {
        let (status, body, _) =
            request_json(app, "GET", &format!("/api/data/sync/{job_id}"), None).await;
        assert_eq!(status, StatusCode::OK, "job should be known: {body}");
        if body["status"] != "running" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("sync job {job_id} did not settle in time");
}
