//! Common utilities and shared types for plaza.
//!
//! This crate provides foundational components used across all plaza crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Pagination**: Page requests and page envelopes via [`Pagination`] and [`PageData`]
//! - **Cache**: An injected cache facade via [`Cache`], backed by Redis or memory
//!
//! # Example
//!
//! ```no_run
//! use plaza_common::{AppResult, Cache, Config, MemoryStore};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let cache = Cache::new(MemoryStore::new(), &config.cache);
//!     let key = cache.idempotency_key(1, "toggle_like", &[&"CONTENT", &42]);
//!     assert_eq!(key, "idempotent:1:toggle_like:CONTENT:42");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod pagination;

pub use cache::{Cache, CacheError, CacheStore, MemoryStore, RedisStore};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use pagination::{PageData, Pagination};
