//! In-process serving engine: an atomically swapped active snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use arc_swap::ArcSwapOption;
use uuid::Uuid;

use crate::compiler::CompiledConfig;
use crate::engine::{Activation, EngineError, ServingEngine};
use crate::observability::metrics;
use crate::source::{PluginFactory, SourceRegistry};

/// One activated configuration and the registry provisioned from it.
#[derive(Debug)]
pub struct Snapshot {
    pub id: Uuid,
    pub epoch: u64,
    pub config: CompiledConfig,
    pub registry: SourceRegistry,
    pub payload: Vec<u8>,
    pub activated_at: SystemTime,
}

/// Holds the active snapshot; readers never block writers.
#[derive(Debug)]
pub struct ActiveConfig {
    current: ArcSwapOption<Snapshot>,
    factory: PluginFactory,
    epoch: AtomicU64,
    /// Serializes activations so epochs are assigned in publish order.
    write: Mutex<()>,
}

impl ActiveConfig {
    pub fn new(factory: PluginFactory) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            factory,
            epoch: AtomicU64::new(0),
            write: Mutex::new(()),
        }
    }

    /// The active snapshot, if any configuration was loaded yet.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Epoch of the active snapshot; 0 before the first activation.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

impl Default for ActiveConfig {
    fn default() -> Self {
        Self::new(PluginFactory::with_builtins())
    }
}

impl ServingEngine for ActiveConfig {
    fn load(&self, payload: &[u8], force_reload: bool) -> Result<Activation, EngineError> {
        // A poisoned lock only means a previous activation panicked; the
        // published snapshot is still whole.
        let _guard = self.write.lock().unwrap_or_else(|e| e.into_inner());

        if !force_reload {
            if let Some(active) = self.current.load().as_ref() {
                if active.payload == payload {
                    tracing::debug!(epoch = active.epoch, "Configuration unchanged, skipping");
                    return Ok(Activation::Unchanged);
                }
            }
        }

        let config = CompiledConfig::from_bytes(payload)?;
        let registry = SourceRegistry::provision(&self.factory, &config.apps.source.config);
        let epoch = self.epoch.load(Ordering::Acquire) + 1;

        let snapshot = Snapshot {
            id: Uuid::new_v4(),
            epoch,
            config,
            registry,
            payload: payload.to_vec(),
            activated_at: SystemTime::now(),
        };

        tracing::info!(
            snapshot_id = %snapshot.id,
            epoch,
            routes = snapshot.config.route_count(),
            workspaces = snapshot.registry.workspaces().len(),
            sources = snapshot.registry.source_count(),
            "Configuration activated"
        );

        self.current.store(Some(Arc::new(snapshot)));
        self.epoch.store(epoch, Ordering::Release);
        metrics::record_active_epoch(epoch);
        Ok(Activation::Applied { epoch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::RawConfig;
    use crate::compiler::ConfigCompiler;
    use std::sync::atomic::AtomicBool;

    fn payload(method: &str) -> Vec<u8> {
        let doc = format!(
            r#"
            [[routes]]
            path = ["/graphql"]
            methods = ["{method}"]
            handler = {{ name = "graphql" }}

            [sources]
            "core.gateway.io/v1alpha1/workspaces" = [{{ name = "billing" }}]
            "#
        );
        ConfigCompiler::new("info")
            .compile_to_bytes(&RawConfig::toml("test", doc))
            .unwrap()
    }

    #[test]
    fn test_first_load_applies() {
        let engine = ActiveConfig::default();
        assert!(engine.snapshot().is_none());

        let outcome = engine.load(&payload("GET"), false).unwrap();
        assert_eq!(outcome, Activation::Applied { epoch: 1 });

        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.epoch, 1);
        assert_eq!(snapshot.registry.workspaces(), ["billing"]);
        assert_eq!(snapshot.config.route_count(), 1);
    }

    #[test]
    fn test_identical_payload_is_noop() {
        let engine = ActiveConfig::default();
        engine.load(&payload("GET"), false).unwrap();
        let first = engine.snapshot().unwrap().id;

        assert_eq!(engine.load(&payload("GET"), false).unwrap(), Activation::Unchanged);
        assert_eq!(engine.snapshot().unwrap().id, first);

        assert_eq!(
            engine.load(&payload("GET"), true).unwrap(),
            Activation::Applied { epoch: 2 }
        );
        assert_ne!(engine.snapshot().unwrap().id, first);
    }

    #[test]
    fn test_bad_payload_keeps_active_config() {
        let engine = ActiveConfig::default();
        engine.load(&payload("GET"), false).unwrap();

        assert!(matches!(
            engine.load(b"not json", false),
            Err(EngineError::Decode(_))
        ));
        assert_eq!(engine.epoch(), 1);
        assert_eq!(engine.snapshot().unwrap().payload, payload("GET"));
    }

    #[test]
    fn test_readers_see_whole_snapshots() {
        let engine = Arc::new(ActiveConfig::default());
        let get = payload("GET");
        let post = payload("POST");
        engine.load(&get, false).unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let engine = Arc::clone(&engine);
            let done = Arc::clone(&done);
            let (get, post) = (get.clone(), post.clone());
            std::thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    let snapshot = engine.snapshot().unwrap();
                    let method = &snapshot.config.routes().next().unwrap().matchers[0].method;
                    let expected = if method[0] == "GET" { &get } else { &post };
                    assert_eq!(&snapshot.payload, expected);
                    assert_eq!(snapshot.registry.workspaces(), ["billing"]);
                }
            })
        };

        for i in 0..200 {
            let next = if i % 2 == 0 { &post } else { &get };
            engine.load(next, false).unwrap();
        }
        done.store(true, Ordering::Relaxed);
        reader.join().unwrap();
        assert_eq!(engine.epoch(), 201);
    }
}
