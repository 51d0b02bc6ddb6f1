//! View cache and tag invalidation.

mod invalidation;
mod store;

pub use invalidation::{spawn_invalidation_worker, CacheInvalidator, ChannelInvalidator};
pub use store::{cached_view, MemoryViewCache, RedisViewCache, ViewCache};

#[cfg(any(test, feature = "test-utils"))]
pub use invalidation::MockCacheInvalidator;
#[cfg(any(test, feature = "test-utils"))]
pub use store::MockViewCache;
