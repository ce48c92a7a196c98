//! Document store backing the itinerary.
//!
//! The app needs exactly four operations against its store: list a
//! collection, fetch one document, merge fields into one document, and
//! subscribe to a collection. Everything above this module talks to the
//! [`DocumentStore`] trait; [`FileStore`] is the production backend and
//! [`MemoryStore`] backs tests.

pub mod file;
pub mod memory;
pub(crate) mod watch;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use watch::WatchHandle;

use crate::errors::Error;

/// Raw field map of a document, as stored.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Callback invoked with a full collection snapshot on every change.
pub type SnapshotListener = Box<dyn Fn(Vec<Document>) + Send + 'static>;

/// One document: an id plus its fields. Ids are unique per collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Document {
            id: id.into(),
            fields,
        }
    }
}

pub trait DocumentStore: Send + Sync {
    /// All documents in a collection, ordered by id. A collection that
    /// was never written to is empty, not an error.
    fn get_all(&self, collection: &str) -> Result<Vec<Document>, Error>;

    /// A single document, or `None` if it does not exist.
    fn get_one(&self, collection: &str, id: &str) -> Result<Option<Document>, Error>;

    /// Merges `fields` into a document, creating it if absent. Fields
    /// already present but not named in `fields` are kept as-is.
    fn set_fields(&self, collection: &str, id: &str, fields: Fields) -> Result<(), Error>;

    /// Removes a document. Deleting a missing document is a no-op.
    fn delete(&self, collection: &str, id: &str) -> Result<(), Error>;

    /// Subscribes to a collection. The listener fires once with the
    /// current contents as soon as they can be read, then again after
    /// every observed change, until the handle is stopped or dropped.
    fn watch(&self, collection: &str, listener: SnapshotListener) -> Result<WatchHandle, Error>;
}
