//! Revalidation event bus
//!
//! After a successful write, each resource gateway publishes its cache tag
//! here so dependent views know to refetch. Subscribers register per tag
//! (or for every tag) and run asynchronously; one failing handler does not
//! affect the others.

use crate::core::error::{AdminError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Unique identifier for a subscription
pub type SubscriptionId = String;

/// A single revalidation signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidationEvent {
    pub id: String,
    /// Cache tag of the resource that changed, e.g. "products"
    pub tag: String,
    /// Which session or system component triggered the write
    pub source: EventSource,
    pub timestamp: DateTime<Utc>,
}

/// Source of a revalidation signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    System,
    Session(String),
}

/// Handler function type for revalidation events
pub type EventHandler = Arc<
    dyn Fn(RevalidationEvent) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync,
>;

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    handler: EventHandler,
}

/// Revalidation bus shared between gateways and view-layer subscribers
pub struct RevalidationBus {
    /// Subscribers keyed by tag; the empty-string key receives every tag
    subscribers: Arc<RwLock<HashMap<String, Vec<Subscriber>>>>,
    history: Arc<RwLock<Vec<RevalidationEvent>>>,
    max_history: usize,
}

const ALL_TAGS: &str = "";

impl RevalidationBus {
    pub fn new() -> Self {
        Self::with_history_size(256)
    }

    pub fn with_history_size(max_history: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(Vec::new())),
            max_history,
        }
    }

    /// Subscribe to revalidation signals for one tag.
    ///
    /// Returns a subscription ID that can be used to unsubscribe.
    pub async fn subscribe(&self, tag: &str, handler: EventHandler) -> SubscriptionId {
        let subscription_id = Uuid::new_v4().to_string();
        let subscriber = Subscriber {
            id: subscription_id.clone(),
            handler,
        };

        let mut subscribers = self.subscribers.write().await;
        subscribers
            .entry(tag.to_string())
            .or_insert_with(Vec::new)
            .push(subscriber);

        subscription_id
    }

    /// Subscribe to every tag.
    pub async fn subscribe_all(&self, handler: EventHandler) -> SubscriptionId {
        self.subscribe(ALL_TAGS, handler).await
    }

    /// Unsubscribe using a subscription ID.
    pub async fn unsubscribe(&self, subscription_id: &str) -> Result<()> {
        let mut subscribers = self.subscribers.write().await;

        for subs in subscribers.values_mut() {
            if let Some(pos) = subs.iter().position(|s| s.id == subscription_id) {
                subs.remove(pos);
                return Ok(());
            }
        }

        Err(AdminError::NotFound(format!(
            "Subscription not found: {}",
            subscription_id
        )))
    }

    /// Publish a revalidation signal for a tag.
    ///
    /// Handlers run on spawned tasks and errors are isolated: one handler
    /// failure does not affect the others or the publisher.
    pub async fn publish(&self, tag: &str, source: EventSource) {
        let event = RevalidationEvent {
            id: Uuid::new_v4().to_string(),
            tag: tag.to_string(),
            source,
            timestamp: Utc::now(),
        };

        {
            let mut history = self.history.write().await;
            history.push(event.clone());
            if history.len() > self.max_history {
                let excess = history.len() - self.max_history;
                history.drain(0..excess);
            }
        }

        let targets = {
            let subs = self.subscribers.read().await;
            let mut targets: Vec<Subscriber> = Vec::new();
            if let Some(tagged) = subs.get(tag) {
                targets.extend(tagged.iter().cloned());
            }
            if let Some(all) = subs.get(ALL_TAGS) {
                targets.extend(all.iter().cloned());
            }
            targets
        };

        let mut handles = Vec::new();
        for subscriber in targets {
            let event_clone = event.clone();
            let handler = subscriber.handler.clone();
            handles.push(tokio::spawn(async move {
                if let Err(e) = handler(event_clone).await {
                    tracing::error!(
                        subscription = %subscriber.id,
                        error = %e,
                        "Revalidation handler failed"
                    );
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Recent revalidation signals, oldest first.
    pub async fn history(&self) -> Vec<RevalidationEvent> {
        self.history.read().await.clone()
    }
}

impl Default for RevalidationBus {
    fn default() -> Self {
        Self::new()
    }
}
