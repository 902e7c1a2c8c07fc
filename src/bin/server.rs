use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use weighted_index_sampler::protocol::parse_sample_request;
use weighted_index_sampler::server_utils::{parse_max_count, parse_port};
use weighted_index_sampler::service::{describe_weights, run_sample};
use weighted_index_sampler::types::ErrorResponse;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<ServerState>;

#[derive(Debug)]
struct ServerState {
    max_count: usize,
}

#[tokio::main]
async fn main() {
    let port = parse_port(std::env::var("PORT").ok().as_deref());
    let max_count = parse_max_count(std::env::var("SAMPLER_MAX_COUNT").ok().as_deref());

    let state = Arc::new(ServerState { max_count });
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/sample", post(sample_handler))
        .route("/api/weights", post(weights_handler))
        .with_state(state);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    println!("[server] listening on :{port} (max count {max_count})");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn sample_handler(State(state): State<SharedState>, body: String) -> Response {
    let request_id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
    let request = match parse_sample_request(&body) {
        Ok(request) => request,
        Err(reason) => return reject(request_id, reason),
    };
    let response = run_sample(&request, state.max_count);
    if request.count > state.max_count {
        println!(
            "[server] request {request_id}: count {} clamped to {}",
            request.count, state.max_count
        );
    }
    Json(response).into_response()
}

async fn weights_handler(body: String) -> Response {
    let request_id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
    match parse_sample_request(&body) {
        Ok(request) => Json(describe_weights(&request)).into_response(),
        Err(reason) => reject(request_id, reason),
    }
}

fn reject(request_id: u64, reason: &str) -> Response {
    eprintln!("[server] request {request_id} rejected: {reason}");
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(reason))).into_response()
}
