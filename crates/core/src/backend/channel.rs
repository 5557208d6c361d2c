use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::realtime::{ChangeEvent, RealtimeFilter};
use super::traits::ChangeFeed;

/// Producer half of a [`ChannelChangeFeed`]. The transport glue (websocket,
/// SSE, polling) pushes decoded notifications through it.
#[derive(Debug, Clone)]
pub struct ChangeSender {
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl ChangeSender {
    pub fn send(&self, event: ChangeEvent) -> Result<(), CoreError> {
        self.tx.send(event).map_err(|_| CoreError::FeedClosed)
    }
}

/// In-process change feed backed by an unbounded channel.
///
/// Filtering happens on receive: events that don't match the current
/// month-scoped subscription are dropped. With no subscription everything
/// passes.
#[derive(Debug)]
pub struct ChannelChangeFeed {
    subscription_id: Uuid,
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
    filter: Option<RealtimeFilter>,
}

impl ChannelChangeFeed {
    pub fn new() -> (ChangeSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let feed = Self {
            subscription_id: Uuid::new_v4(),
            rx,
            filter: None,
        };
        (ChangeSender { tx }, feed)
    }

    /// Identifier of the current subscription; changes on every `subscribe`.
    #[must_use]
    pub fn subscription_id(&self) -> Uuid {
        self.subscription_id
    }

    #[must_use]
    pub fn filter(&self) -> Option<&RealtimeFilter> {
        self.filter.as_ref()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ChangeFeed for ChannelChangeFeed {
    fn subscribe(&mut self, filter: RealtimeFilter) {
        self.subscription_id = Uuid::new_v4();
        debug!(
            subscription = %self.subscription_id,
            pattern = %filter.pattern(),
            "realtime subscription replaced"
        );
        self.filter = Some(filter);
    }

    async fn next_event(&mut self) -> Option<ChangeEvent> {
        loop {
            let event = self.rx.recv().await?;
            match &self.filter {
                Some(filter) if !filter.matches(&event) => {
                    trace!(key = %event.key, "change outside subscribed month dropped");
                }
                _ => return Some(event),
            }
        }
    }
}
