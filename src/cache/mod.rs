//! In-memory cache for API responses
//!
//! This module provides a TTL cache that keeps decoded server responses in memory
//! for a short time, so repeated lookups do not hit the network. Expired entries
//! are evicted lazily when they are next read; `clear_expired` is available as an
//! optional maintenance hook.

mod clock;
pub mod keys;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl::{TtlCache, DEFAULT_TTL_SECS};
