// ============================================================================
// Courier Config - Centralized configuration management
// ============================================================================
//
// This crate provides centralized configuration for the courier message
// store. Supports loading from environment variables with sensible
// defaults.
//
// ============================================================================

mod constants;
mod redis;

// Re-export all public types
pub use constants::{
    OFFICIAL_BUCKET_TTL_DAYS, OFFICIAL_WINDOW_CAP, OFFICIAL_WINDOW_DAYS, SECONDS_PER_DAY,
    SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
};
pub use redis::RedisKeyPrefixes;

use anyhow::Result;
use constants::*;

/// Main configuration structure for the courier message store
#[derive(Clone, Debug)]
pub struct Config {
    pub redis_url: String,

    /// Default lifetime of a registered message in days; individual
    /// operations take an explicit TTL and may override this
    pub message_ttl_days: i64,

    /// TTL for request fingerprint marks (idempotency window) in seconds
    pub request_mark_ttl_secs: i64,

    /// How long expired entries are retained before a sweep removes
    /// them, in seconds
    pub sweep_retention_secs: i64,

    pub rust_log: String,

    pub redis_key_prefixes: RedisKeyPrefixes,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let message_ttl_days = std::env::var("MESSAGE_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MESSAGE_TTL_DAYS);

        let request_mark_ttl_secs = std::env::var("REQUEST_MARK_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_MARK_TTL_SECS);

        let sweep_retention_secs = std::env::var("SWEEP_RETENTION_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_RETENTION_SECS);

        if message_ttl_days <= 0 {
            anyhow::bail!("MESSAGE_TTL_DAYS must be positive");
        }
        if sweep_retention_secs < 0 {
            anyhow::bail!("SWEEP_RETENTION_SECS must not be negative");
        }

        Ok(Self {
            redis_url,
            message_ttl_days,
            request_mark_ttl_secs,
            sweep_retention_secs,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            redis_key_prefixes: RedisKeyPrefixes::from_env(),
        })
    }

    /// Default message TTL in seconds
    pub fn message_ttl_seconds(&self) -> i64 {
        self.message_ttl_days * SECONDS_PER_DAY
    }
}
