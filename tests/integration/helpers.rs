//! Shared test helpers for reveal integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use jaunt::errors::Error;
use jaunt::models::constants::ITINERARY_COLLECTION;
use jaunt::models::Step;
use jaunt::reveal::{RevealMachine, RevealParams, TickOutcome};
use jaunt::store::{
    Document, DocumentStore, Fields, FileStore, SnapshotListener, WatchHandle,
};

/// Test helper: a store rooted in a fresh temp directory, polling fast
/// enough for watch assertions. The root exists, as it would after
/// `jaunt init`.
pub fn temp_store() -> (TempDir, FileStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path().join("store");
    std::fs::create_dir_all(&root).expect("Failed to create store root");
    let store = FileStore::open(root).with_poll_interval(Duration::from_millis(20));
    (temp_dir, store)
}

/// Test helper: write an itinerary of (id, title, unlocked) rows.
pub fn seed_steps(store: &FileStore, rows: &[(&str, &str, bool)]) {
    for (id, title, unlocked) in rows {
        let mut step = Step::new(*id, *title);
        step.is_unlocked = *unlocked;
        store
            .set_fields(ITINERARY_COLLECTION, id, step.to_fields())
            .expect("Failed to seed step");
    }
}

/// Short animation so tests finish in a handful of ticks.
pub fn fast_params() -> RevealParams {
    RevealParams {
        spin_ticks: 3,
        settle_ticks: 1,
        ..RevealParams::default()
    }
}

/// Test helper: tick the machine until the animation ends.
pub fn run_draw(machine: &mut RevealMachine) -> TickOutcome {
    let mut rng = StdRng::seed_from_u64(11);
    let now = Instant::now();
    for _ in 0..100 {
        match machine.on_tick(now, &mut rng) {
            TickOutcome::Spinning | TickOutcome::Settling => continue,
            outcome => return outcome,
        }
    }
    panic!("animation never finished");
}

/// Store wrapper that counts writes, for single-persist assertions.
#[derive(Clone)]
pub struct CountingStore<S: DocumentStore> {
    inner: S,
    writes: Arc<AtomicUsize>,
}

impl<S: DocumentStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        CountingStore {
            inner,
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<S: DocumentStore> DocumentStore for CountingStore<S> {
    fn get_all(&self, collection: &str) -> Result<Vec<Document>, Error> {
        self.inner.get_all(collection)
    }

    fn get_one(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        self.inner.get_one(collection, id)
    }

    fn set_fields(&self, collection: &str, id: &str, fields: Fields) -> Result<(), Error> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_fields(collection, id, fields)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), Error> {
        self.inner.delete(collection, id)
    }

    fn watch(&self, collection: &str, listener: SnapshotListener) -> Result<WatchHandle, Error> {
        self.inner.watch(collection, listener)
    }
}
