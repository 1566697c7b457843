use axum::{
    Json,
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use crate::errors::ApiError;
use crate::metrics::{RATE_LIMITED, RATE_LIMIT_KEYS, REQUEST_TOTAL, UPSTREAM_FAILURES, UPSTREAM_LATENCY, VALIDATION_FAILURES};
use crate::models::GenerateResponse;
use crate::state::AppState;
use crate::validation::{ValidationError, parse_body, validate};

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const UNKNOWN_CLIENT: &str = "unknown";
// A 500-character draft fits many times over
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// Rate limit key: first hop of X-Forwarded-For.
// Clients without the header share one bucket
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    // preflight short-circuits before any business logic
    if method == Method::OPTIONS {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    REQUEST_TOTAL.inc();

    let key = client_key(&headers);
    let admitted = state.limiter.admit(&key);
    RATE_LIMIT_KEYS.set(state.limiter.tracked_keys() as f64);
    if !admitted {
        RATE_LIMITED.inc();
        debug!(client = %key, "rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    // body is buffered only for admitted POSTs, under our own limit
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| ValidationError::form(format!("Request body cannot be larger than {} bytes.", MAX_BODY_BYTES)))
        .inspect_err(|_| VALIDATION_FAILURES.inc())?;

    let request = parse_body(&body)
        .and_then(|value| validate(&value, state.limits))
        .inspect_err(|_| VALIDATION_FAILURES.inc())?;

    let start_time = Instant::now();
    let result = state.upstream.enhance(&request.text).await;
    UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());

    let text = result.inspect_err(|_| UPSTREAM_FAILURES.inc())?;
    info!(
        input_chars = request.text.chars().count(),
        output_chars = text.chars().count(),
        "text enhanced"
    );

    Ok(Json(GenerateResponse { text }).into_response())
}
