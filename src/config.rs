use anyhow::bail;
use clap::Parser;
use std::time::Duration;

use crate::validation::TextLimits;

// CLI argument structure, every flag falls back to an env var
#[derive(Parser, Debug, Clone)]
#[command(name = "board-gateway")]
#[command(about = "Rate-limited text enhancement proxy for the job board")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Credential for the generative-text provider.
    // Left optional: a missing key is reported per request, not at startup
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // Base URL of the generative-text provider
    #[arg(long, env = "UPSTREAM_URL", default_value = "https://generativelanguage.googleapis.com")]
    pub upstream_url: String,

    // Upstream request timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT", default_value_t = 60)]
    pub upstream_timeout: u64,

    // Rate limit bucket capacity (requests per window)
    #[arg(long, env = "RATE_LIMIT", default_value_t = 10)]
    pub rate_limit: u32,

    // Time for an empty bucket to refill completely, in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // Shortest accepted text after trimming
    #[arg(long, env = "MIN_TEXT_CHARS", default_value_t = 1)]
    pub min_text_chars: usize,

    // Longest accepted text after trimming
    #[arg(long, env = "MAX_TEXT_CHARS", default_value_t = 500)]
    pub max_text_chars: usize,

    // Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn text_limits(&self) -> anyhow::Result<TextLimits> {
        let min_chars = self.min_text_chars.max(1);
        if self.max_text_chars < min_chars {
            bail!(
                "--max-text-chars ({}) must not be below --min-text-chars ({})",
                self.max_text_chars,
                min_chars
            );
        }
        Ok(TextLimits {
            min_chars,
            max_chars: self.max_text_chars,
        })
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}
