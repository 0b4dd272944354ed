//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the process.
//!
//! # Tasks
//! - Expiry sweeper: removes expired entries from both cache tiers at a
//!   fixed interval

mod sweeper;

pub use sweeper::{Sweeper, DEFAULT_SWEEP_INTERVAL};
