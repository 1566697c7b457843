use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("board_generate_requests_total", "Total number of generate requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("board_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref VALIDATION_FAILURES: Counter =
        register_counter!("board_validation_failures_total", "Requests rejected by validation").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("board_upstream_failures_total", "Failed upstream model calls").unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "board_upstream_latency_seconds",
        "Upstream model call latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_KEYS: Gauge =
        register_gauge!("board_rate_limit_keys", "Current number of tracked rate limit keys").unwrap();
}
