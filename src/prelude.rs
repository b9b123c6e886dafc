//! Convenience re-exports: `use mapkit::prelude::*;`.

pub use crate::builder::{Cache, CacheBuilder, EvictionPolicy};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::metrics::CacheStats;
pub use crate::omd::OrderedMultiMap;
pub use crate::policy::lri::LriCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
pub use crate::policy::lru::LruCache;
pub use crate::traits::{CoreCache, InsertionOrderCache, MutableCache, RecencyCache};
