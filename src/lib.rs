//! Portal Cache - dual-tier client cache for the patient portal data layer
//!
//! An in-memory tier in front of a persistent key/value tier, with
//! namespaced keys, TTL expiry, namespace-scoped clearing and a background
//! expiry sweeper. A small HTTP surface exposes statistics and clearing to
//! diagnostics tooling.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheManager, Ttl};
pub use config::Config;
pub use tasks::Sweeper;
