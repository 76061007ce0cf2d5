//! In-memory store for tests and single-node deployments.

use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use serde_json::Value;
use uuid::Uuid;

use crate::store::{
    EventKind, GlobalConfig, ResourceCallback, ResourceId, Service, ServiceCallback, Store,
    StoreError,
};

#[derive(Default)]
struct Watchers {
    services: Vec<ServiceCallback>,
    resources: Vec<ResourceCallback>,
}

pub struct MemoryStore {
    node_id: String,
    resources: DashMap<String, (ResourceId, Value)>,
    services: DashMap<String, Service>,
    watchers: RwLock<Watchers>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_node_id(Uuid::new_v4().to_string())
    }

    pub fn with_node_id(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            resources: DashMap::new(),
            services: DashMap::new(),
            watchers: RwLock::new(Watchers::default()),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    // Callbacks run without any map guard held, so they may call back into the store.
    fn resource_watchers(&self) -> Vec<ResourceCallback> {
        self.watchers
            .read()
            .map(|w| w.resources.clone())
            .unwrap_or_else(|e| e.into_inner().resources.clone())
    }

    fn service_watchers(&self) -> Vec<ServiceCallback> {
        self.watchers
            .read()
            .map(|w| w.services.clone())
            .unwrap_or_else(|e| e.into_inner().services.clone())
    }

    fn notify_resource(&self, kind: EventKind, id: &ResourceId, value: Option<&Value>) {
        for callback in self.resource_watchers() {
            callback(kind, id, value);
        }
    }

    fn service_list(&self) -> Vec<Service> {
        let mut services: Vec<Service> = self.services.iter().map(|e| e.value().clone()).collect();
        services.sort_by(|a, b| a.id.cmp(&b.id));
        services
    }

    fn remove(&self, key: &str) -> Option<ResourceId> {
        let (_, (id, _)) = self.resources.remove(key)?;
        tracing::debug!(resource = %id, "Resource deleted");
        self.notify_resource(EventKind::Delete, &id, None);
        Some(id)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn watch_services(&self, callback: ServiceCallback) -> Result<(), StoreError> {
        let mut watchers = self.watchers.write().unwrap_or_else(|e| e.into_inner());
        watchers.services.push(callback);
        Ok(())
    }

    // Registration and the replay snapshot happen under the write lock, so a
    // concurrent put is either in the snapshot or notified live (possibly both).
    fn watch_resources(&self, callback: ResourceCallback) -> Result<(), StoreError> {
        let existing: Vec<(ResourceId, Value)> = {
            let mut watchers = self.watchers.write().unwrap_or_else(|e| e.into_inner());
            watchers.resources.push(Arc::clone(&callback));
            self.resources.iter().map(|e| e.value().clone()).collect()
        };

        for (id, value) in &existing {
            callback(EventKind::Put, id, Some(value));
        }
        Ok(())
    }

    fn register(&self) {
        self.services.insert(
            self.node_id.clone(),
            Service {
                id: self.node_id.clone(),
            },
        );
        tracing::info!(node_id = %self.node_id, "Registered control-plane node");

        let services = self.service_list();
        for callback in self.service_watchers() {
            callback(EventKind::Put, &self.node_id, &services);
        }
    }

    fn set_resource<'a>(
        &'a self,
        id: &'a str,
        value: Value,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let parsed = ResourceId::parse(id)?;
            self.resources
                .insert(id.to_string(), (parsed.clone(), value.clone()));
            tracing::debug!(resource = %parsed, "Resource stored");
            self.notify_resource(EventKind::Put, &parsed, Some(&value));
            Ok(())
        })
    }

    fn delete_resource<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            ResourceId::parse(id)?;
            self.remove(id)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
    }

    fn delete_project<'a>(&'a self, project: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let keys: Vec<String> = self
                .resources
                .iter()
                .filter(|e| e.value().0.project == project)
                .map(|e| e.key().clone())
                .collect();
            if keys.is_empty() {
                return Err(StoreError::UnknownProject(project.to_string()));
            }
            for key in keys {
                self.remove(&key);
            }
            tracing::info!(project, "Project deleted");
            Ok(())
        })
    }

    fn get_global_config(&self) -> Result<GlobalConfig, StoreError> {
        let mut config = GlobalConfig::default();
        for entry in self.resources.iter() {
            let (id, value) = entry.value();
            config
                .projects
                .entry(id.project.clone())
                .or_default()
                .insert(entry.key().clone(), value.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use serde_json::json;
    use std::sync::{Mutex, Weak};

    type Log = Arc<Mutex<Vec<(EventKind, String)>>>;

    fn resource_log(store: &MemoryStore) -> Log {
        let log: Log = Arc::default();
        let sink = Arc::clone(&log);
        store
            .watch_resources(Arc::new(move |kind: EventKind, id: &ResourceId, _: Option<&Value>| {
                sink.lock().unwrap().push((kind, id.to_string()));
            }))
            .unwrap();
        log
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store
            .set_resource("shop/db/orders", json!({"type": "postgres"}))
            .await
            .unwrap();
        store
            .set_resource("blog/db/posts", json!({"type": "mysql"}))
            .await
            .unwrap();

        let config = store.get_global_config().unwrap();
        assert_eq!(config.projects.len(), 2);
        let id = ResourceId::parse("shop/db/orders").unwrap();
        assert_eq!(config.resource(&id), Some(&json!({"type": "postgres"})));
    }

    #[tokio::test]
    async fn test_invalid_id_rejected() {
        let store = MemoryStore::new();
        let err = store.set_resource("orders", json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_watchers_see_changes() {
        let store = MemoryStore::new();
        store.set_resource("shop/db/orders", json!(1)).await.unwrap();

        let log = resource_log(&store);
        store.set_resource("shop/db/users", json!(2)).await.unwrap();
        store.delete_resource("shop/db/orders").await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (EventKind::Put, "shop/db/orders".to_string()),
                (EventKind::Put, "shop/db/users".to_string()),
                (EventKind::Delete, "shop/db/orders".to_string()),
            ]
        );

        let err = store.delete_resource("shop/db/orders").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_project() {
        let store = MemoryStore::new();
        store.set_resource("shop/db/orders", json!(1)).await.unwrap();
        store.set_resource("shop/db/users", json!(2)).await.unwrap();
        store.set_resource("blog/db/posts", json!(3)).await.unwrap();

        let log = resource_log(&store);
        store.delete_project("shop").await.unwrap();

        let deletes = log
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _)| *kind == EventKind::Delete)
            .count();
        assert_eq!(deletes, 2);

        let config = store.get_global_config().unwrap();
        assert_eq!(config.projects.keys().collect::<Vec<_>>(), ["blog"]);
        assert!(matches!(
            store.delete_project("shop").await,
            Err(StoreError::UnknownProject(_))
        ));
    }

    #[tokio::test]
    async fn test_put_during_replay_reaches_new_watcher() {
        let store = Arc::new(MemoryStore::new());
        store.set_resource("shop/db/orders", json!(1)).await.unwrap();

        let log: Log = Arc::default();
        let sink = Arc::clone(&log);
        let weak: Weak<MemoryStore> = Arc::downgrade(&store);
        store
            .watch_resources(Arc::new(move |kind: EventKind, id: &ResourceId, _: Option<&Value>| {
                sink.lock().unwrap().push((kind, id.to_string()));
                if id.name == "orders" {
                    let store = weak.upgrade().unwrap();
                    store
                        .set_resource("shop/db/users", json!(2))
                        .now_or_never()
                        .unwrap()
                        .unwrap();
                }
            }))
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (EventKind::Put, "shop/db/orders".to_string()),
                (EventKind::Put, "shop/db/users".to_string()),
            ]
        );
    }

    #[test]
    fn test_register_notifies_service_watchers() {
        let store = MemoryStore::with_node_id("node-a");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store
            .watch_services(Arc::new(move |kind: EventKind, id: &str, services: &[Service]| {
                sink.lock().unwrap().push((kind, id.to_string(), services.len()));
            }))
            .unwrap();

        store.register();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(EventKind::Put, "node-a".to_string(), 1)]
        );
    }
}
