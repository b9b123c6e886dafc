pub mod lri;
pub mod lru;

pub use lri::LriCache;
#[cfg(feature = "concurrency")]
pub use lru::ConcurrentLruCache;
pub use lru::LruCache;
