//! Tag invalidation signal from mutations to the view cache.
//!
//! Handlers enqueue tag sets after a successful mutation and return; a
//! background worker purges the tagged views. Delivery is best effort.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use domain::TagSet;

use super::ViewCache;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Marks every cached view under the given tags as stale.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, tags: TagSet);
}

/// Invalidator that hands tag sets to the purge worker.
#[derive(Clone)]
pub struct ChannelInvalidator {
    tx: mpsc::UnboundedSender<TagSet>,
}

impl CacheInvalidator for ChannelInvalidator {
    fn invalidate(&self, tags: TagSet) {
        if tags.is_empty() {
            return;
        }
        debug!(tags = ?tags, "queueing cache invalidation");
        if let Err(e) = self.tx.send(tags) {
            warn!(tags = ?e.0, "invalidation worker gone, dropping tags");
        }
    }
}

/// Start the purge worker. It runs until every sender is dropped.
pub fn spawn_invalidation_worker(cache: Arc<dyn ViewCache>) -> (ChannelInvalidator, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<TagSet>();

    let handle = tokio::spawn(async move {
        while let Some(tags) = rx.recv().await {
            for tag in tags {
                match cache.purge(tag).await {
                    Ok(removed) => info!(tag = %tag, removed, "cache tag purged"),
                    Err(e) => warn!(tag = %tag, error = %e, "cache tag purge failed"),
                }
            }
        }
        debug!("invalidation worker stopped");
    });

    (ChannelInvalidator { tx }, handle)
}
