use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::StorageError;
use crate::event::{group_by_key, Event, EventsByKey, NewEvent};

/// Current time as milliseconds since the Unix epoch.
pub fn current_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Every event of one organization after a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Bumped by one on each published change.
    pub version: u64,
    pub events: Vec<Event>,
}

impl Snapshot {
    pub fn by_key(&self) -> EventsByKey {
        group_by_key(self.events.iter().cloned())
    }
}

/// Live view of an organization's events; always holds the latest snapshot.
pub type Subscription = watch::Receiver<Snapshot>;

/// Per-organization snapshot channels.
#[derive(Default)]
pub struct SnapshotHub {
    channels: Mutex<HashMap<String, watch::Sender<Snapshot>>>,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `org_id` if its channel already exists.
    pub fn get(&self, org_id: &str) -> Option<Subscription> {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.get(org_id).map(watch::Sender::subscribe)
    }

    /// Subscribe to `org_id`, seeding the channel with `current` if nobody
    /// has subscribed or published yet.
    pub fn subscribe(&self, org_id: &str, current: Vec<Event>) -> Subscription {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(org_id.to_string())
            .or_insert_with(|| {
                watch::channel(Snapshot {
                    version: 0,
                    events: current,
                })
                .0
            })
            .subscribe()
    }

    /// Replace the snapshot of `org_id` and wake its subscribers.
    pub fn publish(&self, org_id: &str, events: Vec<Event>) -> u64 {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = channels
            .entry(org_id.to_string())
            .or_insert_with(|| watch::channel(Snapshot::default()).0);
        let mut version = 0;
        sender.send_modify(|snapshot| {
            snapshot.version += 1;
            snapshot.events = events;
            version = snapshot.version;
        });
        version
    }
}

/// The event store capability: live reads plus admin-gated writes.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// All events of an organization, in no particular order.
    async fn list(&self, org_id: &str) -> Result<Vec<Event>, StorageError>;

    /// Live snapshots of an organization's events.
    async fn subscribe(&self, org_id: &str) -> Result<Subscription, StorageError>;

    /// Validate and store a draft. The store assigns id and creation time.
    async fn insert(&self, draft: NewEvent) -> Result<Event, StorageError>;

    /// Remove an event. Returns false when no such event exists.
    async fn delete(&self, id: Uuid) -> Result<bool, StorageError>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use super::*;
    use std::sync::RwLock;

    use crate::validation::Validator;

    /// In-memory event store for testing.
    #[derive(Default)]
    pub struct InMemoryEventStore {
        events: RwLock<Vec<Event>>,
        hub: SnapshotHub,
    }

    impl InMemoryEventStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn org_events(events: &[Event], org_id: &str) -> Vec<Event> {
            events
                .iter()
                .filter(|e| e.org_id == org_id)
                .cloned()
                .collect()
        }
    }

    // Snapshots are published under the write lock so they land in write order.
    #[async_trait]
    impl EventStore for InMemoryEventStore {
        async fn list(&self, org_id: &str) -> Result<Vec<Event>, StorageError> {
            Ok(Self::org_events(&self.events.read().unwrap(), org_id))
        }

        async fn subscribe(&self, org_id: &str) -> Result<Subscription, StorageError> {
            if let Some(sub) = self.hub.get(org_id) {
                return Ok(sub);
            }
            let events = self.events.read().unwrap();
            Ok(self.hub.subscribe(org_id, Self::org_events(&events, org_id)))
        }

        async fn insert(&self, draft: NewEvent) -> Result<Event, StorageError> {
            let key = Validator::validate_new_event(&draft)?;
            let event = draft.into_event(key, Uuid::new_v4(), current_epoch_ms());

            let mut events = self.events.write().unwrap();
            events.push(event.clone());
            self.hub
                .publish(&event.org_id, Self::org_events(&events, &event.org_id));
            Ok(event)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
            let mut events = self.events.write().unwrap();
            let Some(position) = events.iter().position(|e| e.id == id) else {
                return Ok(false);
            };
            let removed = events.remove(position);
            self.hub
                .publish(&removed.org_id, Self::org_events(&events, &removed.org_id));
            Ok(true)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::error::ValidationError;
        use std::time::Duration;

        fn draft(org: &str, key: &str, title: &str) -> NewEvent {
            NewEvent::new(org, key, title, "")
        }

        #[tokio::test]
        async fn test_insert_assigns_id_and_timestamp() {
            let store = InMemoryEventStore::new();
            let before = current_epoch_ms();

            let event = store
                .insert(draft("org", "2024-03-05", "  회의 "))
                .await
                .unwrap();

            assert_eq!(event.title, "회의");
            assert_eq!(event.date_key.as_str(), "2024-03-05");
            assert!(event.created_at >= before);
            assert_eq!(store.list("org").await.unwrap(), vec![event]);
        }

        #[tokio::test]
        async fn test_insert_rejects_invalid_draft() {
            let store = InMemoryEventStore::new();
            let result = store.insert(draft("org", "2024-03-05", "  ")).await;
            assert!(matches!(
                result,
                Err(StorageError::Invalid(ValidationError::EmptyTitle))
            ));
            assert!(store.list("org").await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_list_is_scoped_to_org() {
            let store = InMemoryEventStore::new();
            store.insert(draft("a", "2024-03-05", "one")).await.unwrap();
            store.insert(draft("b", "2024-03-05", "two")).await.unwrap();

            let a = store.list("a").await.unwrap();
            assert_eq!(a.len(), 1);
            assert_eq!(a[0].title, "one");
        }

        #[tokio::test]
        async fn test_delete() {
            let store = InMemoryEventStore::new();
            let event = store.insert(draft("org", "2024-03-05", "x")).await.unwrap();

            assert!(store.delete(event.id).await.unwrap());
            assert!(!store.delete(event.id).await.unwrap());
            assert!(store.list("org").await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_subscribe_sees_changes() {
            let store = InMemoryEventStore::new();
            store.insert(draft("org", "2024-03-05", "first")).await.unwrap();

            let mut sub = store.subscribe("org").await.unwrap();
            let initial = sub.borrow_and_update().clone();
            assert_eq!(initial.events.len(), 1);

            let second = store.insert(draft("org", "2024-03-06", "second")).await.unwrap();
            tokio::time::timeout(Duration::from_secs(1), sub.changed())
                .await
                .unwrap()
                .unwrap();
            let snapshot = sub.borrow_and_update().clone();
            assert!(snapshot.version > initial.version);
            assert_eq!(snapshot.events.len(), 2);

            store.delete(second.id).await.unwrap();
            sub.changed().await.unwrap();
            let snapshot = sub.borrow().clone();
            assert_eq!(snapshot.events.len(), 1);
            assert_eq!(snapshot.by_key().len(), 1);
        }

        #[tokio::test]
        async fn test_other_org_does_not_wake_subscriber() {
            let store = InMemoryEventStore::new();
            let mut sub = store.subscribe("a").await.unwrap();
            store.insert(draft("b", "2024-03-05", "x")).await.unwrap();
            assert!(!sub.has_changed().unwrap());
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
        async fn test_concurrent_writes_leave_latest_snapshot() {
            let store = std::sync::Arc::new(InMemoryEventStore::new());
            let sub = store.subscribe("org").await.unwrap();

            let tasks: Vec<_> = (0..16)
                .map(|i| {
                    let store = store.clone();
                    tokio::spawn(async move {
                        store
                            .insert(draft("org", "2024-03-05", &format!("event {}", i)))
                            .await
                            .unwrap()
                    })
                })
                .collect();
            for task in tasks {
                task.await.unwrap();
            }

            let snapshot = sub.borrow().clone();
            assert_eq!(snapshot.version, 16);
            assert_eq!(snapshot.events.len(), 16);
            assert_eq!(snapshot.events, store.list("org").await.unwrap());
        }
    }
}
