//! View cache for derived read models (lists and aggregates).
//!
//! Every entry belongs to one cache tag. Redis keeps a per-tag index set of
//! the keys written under it so a tag can be purged without scanning.

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use common::AppResult;
use domain::CacheTag;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cache key prefix for views
const CACHE_PREFIX_VIEW: &str = "view:";

/// Tag-scoped view storage.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ViewCache: Send + Sync {
    /// Cached JSON for `key` under `tag`
    async fn get(&self, tag: CacheTag, key: &str) -> AppResult<Option<String>>;

    /// Store JSON for `key` under `tag`
    async fn put(&self, tag: CacheTag, key: &str, json: String) -> AppResult<()>;

    /// Drop every entry under `tag`; returns the number of entries removed
    async fn purge(&self, tag: CacheTag) -> AppResult<u64>;

    /// Reachability of the backing store
    async fn ping(&self) -> AppResult<()>;
}

fn entry_key(tag: CacheTag, key: &str) -> String {
    format!("{}{}:{}", CACHE_PREFIX_VIEW, tag, key)
}

fn index_key(tag: CacheTag) -> String {
    format!("{}{}:__keys", CACHE_PREFIX_VIEW, tag)
}

/// Redis backed view cache.
pub struct RedisViewCache {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisViewCache {
    /// Connect to Redis.
    pub async fn connect(url: &str, ttl_seconds: u64) -> Result<Self, RedisError> {
        debug!("Connecting to Redis at {}", url);
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn, ttl_seconds })
    }
}

#[async_trait]
impl ViewCache for RedisViewCache {
    async fn get(&self, tag: CacheTag, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(entry_key(tag, key)).await?;
        Ok(json)
    }

    async fn put(&self, tag: CacheTag, key: &str, json: String) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let entry = entry_key(tag, key);
        let index = index_key(tag);
        conn.set_ex::<_, _, ()>(&entry, json, self.ttl_seconds).await?;
        conn.sadd::<_, _, ()>(&index, &entry).await?;
        conn.expire::<_, ()>(&index, self.ttl_seconds as i64).await?;
        Ok(())
    }

    async fn purge(&self, tag: CacheTag) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let index = index_key(tag);
        let keys: Vec<String> = conn.smembers(&index).await?;
        let removed: u64 = if keys.is_empty() {
            0
        } else {
            conn.del(&keys).await?
        };
        conn.del::<_, ()>(&index).await?;
        Ok(removed)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// In-process view cache, used when no Redis URL is configured.
#[derive(Default)]
pub struct MemoryViewCache {
    entries: Mutex<HashMap<CacheTag, HashMap<String, String>>>,
}

impl MemoryViewCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ViewCache for MemoryViewCache {
    async fn get(&self, tag: CacheTag, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(&tag).and_then(|views| views.get(key)).cloned())
    }

    async fn put(&self, tag: CacheTag, key: &str, json: String) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        entries.entry(tag).or_default().insert(key.to_string(), json);
        Ok(())
    }

    async fn purge(&self, tag: CacheTag) -> AppResult<u64> {
        let mut entries = self.entries.lock().await;
        Ok(entries.remove(&tag).map(|views| views.len() as u64).unwrap_or(0))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Read-through lookup: serve `key` from the cache or compute it with `load`.
///
/// Cache faults and undecodable entries count as a miss; only `load` errors
/// reach the caller.
pub async fn cached_view<T, F, Fut>(
    cache: &dyn ViewCache,
    tag: CacheTag,
    key: &str,
    load: F,
) -> AppResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match cache.get(tag, key).await {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => {
                debug!(tag = %tag, key, "view cache hit");
                return Ok(value);
            }
            Err(e) => warn!(tag = %tag, key, error = %e, "discarding undecodable cached view"),
        },
        Ok(None) => debug!(tag = %tag, key, "view cache miss"),
        Err(e) => warn!(tag = %tag, key, error = %e, "view cache read failed"),
    }

    let value = load().await?;
    match serde_json::to_string(&value) {
        Ok(json) => {
            if let Err(e) = cache.put(tag, key, json).await {
                warn!(tag = %tag, key, error = %e, "view cache write failed");
            }
        }
        Err(e) => warn!(tag = %tag, key, error = %e, "view not serializable"),
    }
    Ok(value)
}
