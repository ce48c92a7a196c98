//! In-memory document store for tests.
//!
//! Snapshot listeners are invoked synchronously from the mutating call
//! while the store lock is held, so listeners must hand the snapshot
//! off (e.g. over a channel) rather than call back into the store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use super::{Document, DocumentStore, Fields, SnapshotListener, WatchHandle};
use crate::errors::Error;

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, Fields>>,
    listeners: HashMap<String, Vec<Listener>>,
}

struct Listener {
    stopped: Arc<AtomicBool>,
    notify: SnapshotListener,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, Error> {
        self.inner
            .lock()
            .map_err(|_| Error::store_unavailable("store mutex poisoned"))
    }
}

fn snapshot(collection: Option<&BTreeMap<String, Fields>>) -> Vec<Document> {
    collection
        .map(|docs| {
            docs.iter()
                .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn notify_listeners(inner: &mut Inner, collection: &str) {
    let docs = snapshot(inner.collections.get(collection));
    if let Some(listeners) = inner.listeners.get_mut(collection) {
        listeners.retain(|l| !l.stopped.load(Ordering::SeqCst));
        for listener in listeners.iter() {
            (listener.notify)(docs.clone());
        }
    }
}

impl DocumentStore for MemoryStore {
    fn get_all(&self, collection: &str) -> Result<Vec<Document>, Error> {
        let inner = self.lock()?;
        Ok(snapshot(inner.collections.get(collection)))
    }

    fn get_one(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        let inner = self.lock()?;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    fn set_fields(&self, collection: &str, id: &str, fields: Fields) -> Result<(), Error> {
        let mut inner = self.lock()?;
        let doc = inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();
        for (key, value) in fields {
            doc.insert(key, value);
        }
        notify_listeners(&mut inner, collection);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), Error> {
        let mut inner = self.lock()?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            notify_listeners(&mut inner, collection);
        }
        Ok(())
    }

    fn watch(&self, collection: &str, listener: SnapshotListener) -> Result<WatchHandle, Error> {
        let id = Uuid::new_v4();
        let stopped = Arc::new(AtomicBool::new(false));
        let mut inner = self.lock()?;

        let docs = snapshot(inner.collections.get(collection));
        listener(docs);

        inner
            .listeners
            .entry(collection.to_string())
            .or_default()
            .push(Listener {
                stopped: Arc::clone(&stopped),
                notify: listener,
            });
        debug!(watch = %id, collection, "watch registered");
        Ok(WatchHandle::new(id, stopped, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::mpsc;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        }
    }

    #[test]
    fn test_set_fields_merges() {
        let store = MemoryStore::new();
        store
            .set_fields("itinerary", "1", fields(json!({ "title": "a" })))
            .unwrap();
        store
            .set_fields("itinerary", "1", fields(json!({ "isUnlocked": true })))
            .unwrap();

        let doc = store.get_one("itinerary", "1").unwrap().unwrap();
        assert_eq!(doc.fields.get("title"), Some(&json!("a")));
        assert_eq!(doc.fields.get("isUnlocked"), Some(&json!(true)));
    }

    #[test]
    fn test_get_all_ordered_by_id() {
        let store = MemoryStore::new();
        for id in ["2", "1", "3"] {
            store
                .set_fields("itinerary", id, fields(json!({ "title": id })))
                .unwrap();
        }
        let ids: Vec<String> = store
            .get_all("itinerary")
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_watch_fires_immediately_and_on_change() {
        let store = MemoryStore::new();
        store
            .set_fields("itinerary", "1", fields(json!({ "title": "a" })))
            .unwrap();

        let (tx, rx) = mpsc::channel();
        let _handle = store
            .watch(
                "itinerary",
                Box::new(move |docs| {
                    let _ = tx.send(docs.len());
                }),
            )
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), 1);

        store
            .set_fields("itinerary", "2", fields(json!({ "title": "b" })))
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), 2);

        store.delete("itinerary", "1").unwrap();
        assert_eq!(rx.try_recv().unwrap(), 1);
    }

    #[test]
    fn test_stopped_watch_gets_nothing() {
        let store = MemoryStore::new();
        let (tx, rx) = mpsc::channel();
        let handle = store
            .watch(
                "itinerary",
                Box::new(move |docs| {
                    let _ = tx.send(docs.len());
                }),
            )
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), 0);

        handle.stop();
        store
            .set_fields("itinerary", "1", fields(json!({ "title": "a" })))
            .unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_delete_missing_is_silent() {
        let store = MemoryStore::new();
        let (tx, rx) = mpsc::channel();
        let _handle = store
            .watch(
                "itinerary",
                Box::new(move |docs| {
                    let _ = tx.send(docs.len());
                }),
            )
            .unwrap();
        let _ = rx.try_recv();

        store.delete("itinerary", "404").unwrap();
        assert!(rx.try_recv().is_err());
    }
}
