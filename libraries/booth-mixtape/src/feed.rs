//! Change feed plumbing
//!
//! A narrow `subscribe(mixtape) -> stream of change events` seam. The
//! reconciler only ever sees [`FeedItem`]s, so it stays independent of
//! whichever backend delivers row changes.
//!
//! Delivery is best effort. A subscriber that falls behind gets a
//! [`FeedItem::Resync`] instead of the events it missed and is expected to
//! fetch a fresh snapshot.

use crate::config::MixtapeConfig;
use crate::error::{MixtapeError, Result};
use crate::reconcile::{ChangeEvent, Reconciler};
use async_trait::async_trait;
use booth_core::{MixtapeId, MixtapeTrack};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

/// A change event tagged with the mixtape it belongs to
#[derive(Debug, Clone)]
pub struct FeedMessage {
    /// Mixtape whose rows changed
    pub mixtape_id: MixtapeId,
    /// The change
    pub event: ChangeEvent<MixtapeTrack>,
}

/// What a subscriber receives
#[derive(Debug, Clone, PartialEq)]
pub enum FeedItem {
    /// A row change for the subscribed mixtape
    Event(ChangeEvent<MixtapeTrack>),
    /// Events were dropped; refetch the whole list
    Resync,
}

/// Source of row-level change notifications
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Publish a change to every subscriber of `mixtape_id`
    async fn publish(&self, mixtape_id: &MixtapeId, event: ChangeEvent<MixtapeTrack>)
        -> Result<()>;

    /// Subscribe to changes for one mixtape
    async fn subscribe(&self, mixtape_id: &MixtapeId) -> Result<Subscription>;
}

/// Loads the current tracklist, used on first sync and after a lag
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch every track of the mixtape
    async fn fetch_tracks(&self, mixtape_id: &MixtapeId) -> Result<Vec<MixtapeTrack>>;
}

/// Filtered view of a feed for one mixtape
#[derive(Debug)]
pub struct Subscription {
    mixtape_id: MixtapeId,
    receiver: broadcast::Receiver<FeedMessage>,
}

impl Subscription {
    /// Wrap a broadcast receiver, keeping only `mixtape_id`'s events
    pub fn new(mixtape_id: MixtapeId, receiver: broadcast::Receiver<FeedMessage>) -> Self {
        Self {
            mixtape_id,
            receiver,
        }
    }

    /// Mixtape this subscription is filtered to
    pub fn mixtape_id(&self) -> &MixtapeId {
        &self.mixtape_id
    }

    /// Wait for the next item
    ///
    /// Returns `None` once the feed has shut down.
    pub async fn next(&mut self) -> Option<FeedItem> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if message.mixtape_id == self.mixtape_id => {
                    return Some(FeedItem::Event(message.event));
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        mixtape_id = %self.mixtape_id,
                        skipped, "Subscriber lagged, resync required"
                    );
                    return Some(FeedItem::Resync);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// In-process feed built on a broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastFeed {
    sender: broadcast::Sender<FeedMessage>,
    capacity: usize,
}

impl BroadcastFeed {
    /// Create a feed buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Create a feed sized by `feed_buffer`
    pub fn from_config(config: &MixtapeConfig) -> Self {
        Self::new(config.feed_buffer)
    }

    /// Events each subscriber may fall behind by before it must resync
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live subscriptions across all mixtapes
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl ChangeFeed for BroadcastFeed {
    async fn publish(
        &self,
        mixtape_id: &MixtapeId,
        event: ChangeEvent<MixtapeTrack>,
    ) -> Result<()> {
        let message = FeedMessage {
            mixtape_id: mixtape_id.clone(),
            event,
        };
        if self.sender.send(message).is_err() {
            debug!(%mixtape_id, "No subscribers, change dropped");
        }
        Ok(())
    }

    async fn subscribe(&self, mixtape_id: &MixtapeId) -> Result<Subscription> {
        Ok(Subscription::new(
            mixtape_id.clone(),
            self.sender.subscribe(),
        ))
    }
}

/// Keep a tracklist live until the feed closes or nobody is watching
///
/// Fetches a snapshot first, then applies events from `subscription`,
/// refetching whenever the subscription reports a gap. Every change is
/// published on `updates`. Subscribe before calling this so that no event
/// between the snapshot and the first `next()` is lost; events already
/// reflected in the snapshot are absorbed by the reconciler.
pub async fn follow<S>(
    mut subscription: Subscription,
    source: &S,
    updates: watch::Sender<Vec<MixtapeTrack>>,
) -> Result<()>
where
    S: SnapshotSource + ?Sized,
{
    let mixtape_id = subscription.mixtape_id().clone();
    let mut reconciler = Reconciler::from_rows(source.fetch_tracks(&mixtape_id).await?);
    updates.send_replace(reconciler.rows().to_vec());

    loop {
        let item = tokio::select! {
            () = updates.closed() => {
                debug!(%mixtape_id, "No watchers left, stopping follow");
                return Ok(());
            }
            item = subscription.next() => item,
        };
        let Some(item) = item else {
            break;
        };

        let changed = match item {
            FeedItem::Event(event) => reconciler.apply(event),
            FeedItem::Resync => {
                let rows = source.fetch_tracks(&mixtape_id).await.map_err(|e| {
                    MixtapeError::Feed(format!("resync of {} failed: {}", mixtape_id, e))
                })?;
                reconciler.resync(rows);
                true
            }
        };

        if changed {
            updates.send_replace(reconciler.rows().to_vec());
        }
    }

    debug!(%mixtape_id, "Change feed closed");
    Ok(())
}
