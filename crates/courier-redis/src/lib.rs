//! # Courier Redis
//!
//! Low-level Redis client for the courier message store.
//!
//! ## Design Principles
//!
//! - **No business logic** - Pure infrastructure layer
//! - **No dependencies** on other courier-* crates
//! - **Narrow command surface** - Only the commands the store uses
//! - **Type-safe** - Leverages Rust's type system
//!
//! ## Features
//!
//! - Connection management with automatic reconnection
//! - Key-value operations with expiry and TTL management
//! - Atomic counters (INCR)
//! - List, set, sorted-set and hash operations
//!
//! ## Example
//!
//! ```rust,no_run
//! use courier_redis::RedisClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = RedisClient::connect("redis://localhost:6379").await?;
//!
//!     // Set with expiry
//!     client.set_ex("key", "value", 3600).await?;
//!
//!     // Get
//!     let value: Option<String> = client.get("key").await?;
//!
//!     Ok(())
//! }
//! ```

mod client;

pub use client::RedisClient;

// Re-export commonly used types
pub use redis::RedisError;

/// Result type for Redis operations
pub type Result<T> = std::result::Result<T, RedisError>;
