//! Itinerary access on top of the document store.
//!
//! Wraps a [`DocumentStore`] and speaks in domain types: sorted step
//! lists, the progress record, and trip metadata. Documents that do
//! not parse as steps are logged and skipped, never fatal.

use serde_json::Value;
use tracing::warn;

use crate::errors::Error;
use crate::models::constants::{
    APP_STATE_COLLECTION, ITINERARY_COLLECTION, PROGRESS_DOC_ID, TRIP_META_DOC_ID,
};
use crate::models::step::sort_by_ordinal;
use crate::models::{ProgressRecord, Step};
use crate::store::{Document, DocumentStore, Fields, WatchHandle};

/// Callback invoked with the full, sorted step list on every change.
pub type StepsListener = Box<dyn Fn(Vec<Step>) + Send + 'static>;

pub struct ItineraryRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ItineraryRepository<S> {
    pub fn new(store: S) -> Self {
        ItineraryRepository { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All steps, ordered by ordinal.
    pub fn load_steps(&self) -> Result<Vec<Step>, Error> {
        Ok(steps_of(self.store.get_all(ITINERARY_COLLECTION)?))
    }

    /// Subscribes to the itinerary collection, delivering sorted step
    /// lists. First delivery happens immediately.
    pub fn watch_steps(&self, listener: StepsListener) -> Result<WatchHandle, Error> {
        self.store.watch(
            ITINERARY_COLLECTION,
            Box::new(move |docs| listener(steps_of(docs))),
        )
    }

    /// The persisted reveal position. Malformed records read as absent.
    pub fn load_progress(&self) -> Result<Option<ProgressRecord>, Error> {
        let doc = match self.store.get_one(APP_STATE_COLLECTION, PROGRESS_DOC_ID)? {
            Some(doc) => doc,
            None => return Ok(None),
        };
        match serde_json::from_value::<ProgressRecord>(Value::Object(doc.fields)) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("ignoring malformed progress record: {e}");
                Ok(None)
            }
        }
    }

    /// Records `step_id` as the most recently revealed step.
    pub fn save_progress(&self, step_id: &str) -> Result<(), Error> {
        self.store.set_fields(
            APP_STATE_COLLECTION,
            PROGRESS_DOC_ID,
            ProgressRecord::new(step_id).to_fields(),
        )
    }

    /// Optional trip title from `appState/meta`.
    pub fn trip_title(&self) -> Result<Option<String>, Error> {
        let doc = self.store.get_one(APP_STATE_COLLECTION, TRIP_META_DOC_ID)?;
        Ok(doc
            .and_then(|doc| doc.fields.get("title").cloned())
            .and_then(|title| title.as_str().map(str::to_string)))
    }

    pub fn save_trip_title(&self, title: &str) -> Result<(), Error> {
        let mut fields = Fields::new();
        fields.insert("title".to_string(), Value::String(title.to_string()));
        self.store
            .set_fields(APP_STATE_COLLECTION, TRIP_META_DOC_ID, fields)
    }
}

fn steps_of(docs: Vec<Document>) -> Vec<Step> {
    let mut steps = Vec::with_capacity(docs.len());
    for doc in &docs {
        match Step::from_document(doc) {
            Ok(step) => steps.push(step),
            Err(e) => warn!("skipping itinerary document: {e}"),
        }
    }
    sort_by_ordinal(&mut steps);
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::mpsc;

    fn seed(store: &MemoryStore, steps: &[(&str, &str, bool)]) {
        for (id, title, unlocked) in steps {
            let mut step = Step::new(*id, *title);
            step.is_unlocked = *unlocked;
            store
                .set_fields(ITINERARY_COLLECTION, id, step.to_fields())
                .unwrap();
        }
    }

    #[test]
    fn test_load_steps_sorted_by_ordinal() {
        let store = MemoryStore::new();
        seed(
            &store,
            &[("10", "last", false), ("2", "mid", true), ("1", "first", true)],
        );

        let repo = ItineraryRepository::new(store);
        let ids: Vec<String> = repo
            .load_steps()
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_load_steps_skips_invalid_documents() {
        let store = MemoryStore::new();
        seed(&store, &[("1", "ok", true)]);
        // Missing title, does not parse as a step.
        store
            .set_fields(ITINERARY_COLLECTION, "2", Fields::new())
            .unwrap();

        let repo = ItineraryRepository::new(store);
        let steps = repo.load_steps().unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].id, "1");
    }

    #[test]
    fn test_watch_steps_delivers_sorted_lists() {
        let store = MemoryStore::new();
        seed(&store, &[("2", "b", false), ("1", "a", true)]);

        let repo = ItineraryRepository::new(store.clone());
        let (tx, rx) = mpsc::channel();
        let _handle = repo
            .watch_steps(Box::new(move |steps| {
                let _ = tx.send(steps);
            }))
            .unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, "1");

        seed(&store, &[("3", "c", false)]);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(second[2].id, "3");
    }

    #[test]
    fn test_progress_round_trip() {
        let store = MemoryStore::new();
        let repo = ItineraryRepository::new(store);
        assert!(repo.load_progress().unwrap().is_none());

        repo.save_progress("4").unwrap();
        let record = repo.load_progress().unwrap().unwrap();
        assert_eq!(record.last_drawn_step_id, "4");
    }

    #[test]
    fn test_malformed_progress_reads_as_absent() {
        let store = MemoryStore::new();
        let mut fields = Fields::new();
        fields.insert("lastDrawnStepId".to_string(), Value::Bool(true));
        store
            .set_fields(APP_STATE_COLLECTION, PROGRESS_DOC_ID, fields)
            .unwrap();

        let repo = ItineraryRepository::new(store);
        assert!(repo.load_progress().unwrap().is_none());
    }

    #[test]
    fn test_trip_title() {
        let store = MemoryStore::new();
        let repo = ItineraryRepository::new(store);
        assert!(repo.trip_title().unwrap().is_none());

        repo.save_trip_title("Shikoku loop").unwrap();
        assert_eq!(repo.trip_title().unwrap().as_deref(), Some("Shikoku loop"));
    }
}
