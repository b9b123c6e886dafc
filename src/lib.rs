//! mapkit: insertion-ordered multi-value mapping and bounded cache primitives.
//!
//! Both components share the same arena-backed doubly-linked-cell technique;
//! see [`ds::cell_list`] for the underlying structure.

pub mod builder;
pub mod ds;
pub mod error;
pub mod metrics;
pub mod omd;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use crate::builder::{Cache, CacheBuilder, EvictionPolicy};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::metrics::CacheStats;
pub use crate::omd::OrderedMultiMap;
pub use crate::policy::lri::LriCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
pub use crate::policy::lru::LruCache;
