use std::sync::Arc;
use crate::rate_limit::RateLimiter;
use crate::upstream::GeminiClient;
use crate::validation::TextLimits;
// app's shared state

pub struct AppState {
    pub limiter: Arc<dyn RateLimiter>, // swappable for a shared store
    pub upstream: GeminiClient,
    pub limits: TextLimits,            // accepted text length
}
