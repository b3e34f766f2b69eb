//! Rate limiting port and application service.
//!
//! Counters live in the shared key-value store when one is configured, so
//! every process sees the same windows. When the store is missing or fails,
//! the check runs against an in-process window store instead. Limits then
//! become per-process until the shared store recovers.

mod ports;
mod service;


pub use ports::RateLimitWindowStore;
pub use service::RateLimitService;
