//! File-backed document store.
//!
//! Layout: one directory per collection under the store root, one
//! pretty-printed JSON file per document, named `{id}.json`. Readers
//! take shared `fs2` locks and writers exclusive ones, so concurrent
//! `jaunt` processes against the same store stay consistent. The locks
//! are advisory and cooperative.
//!
//! Change subscriptions poll directory metadata from a background
//! thread and push full snapshots to the listener.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

use super::watch::sleep_in_chunks;
use super::{Document, DocumentStore, Fields, SnapshotListener, WatchHandle};
use crate::errors::Error;
use crate::models::constants::DEFAULT_WATCH_POLL_MS;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    poll: Duration,
}

impl FileStore {
    /// Opens a store rooted at `root`. No I/O happens until the first
    /// read or write; directories are created lazily on write.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        FileStore {
            root: root.into(),
            poll: Duration::from_millis(DEFAULT_WATCH_POLL_MS),
        }
    }

    /// Overrides how often watcher threads rescan for changes.
    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    fn doc_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{id}.json"))
    }

    /// Reads and parses one document file under a shared lock.
    fn read_document(&self, path: &Path) -> Result<Document, Error> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let file = File::open(path)
            .map_err(|e| Error::store_unavailable(format!("cannot open {}: {e}", path.display())))?;
        file.lock_shared().map_err(|e| {
            Error::store_unavailable(format!("cannot lock {}: {e}", path.display()))
        })?;
        let mut content = String::new();
        BufReader::new(&file)
            .read_to_string(&mut content)
            .map_err(|e| {
                Error::store_unavailable(format!("cannot read {}: {e}", path.display()))
            })?;
        let fields: Fields = serde_json::from_str(&content).map_err(|e| {
            Error::store_unavailable(format!("malformed document {}: {e}", path.display()))
        })?;
        Ok(Document::new(id, fields))
    }

    /// Metadata snapshot of a collection directory, used by watchers to
    /// detect changes without parsing every file.
    fn fingerprint(&self, collection: &str) -> Vec<(String, SystemTime, u64)> {
        let dir = self.collection_dir(collection);
        let mut entries = Vec::new();
        let read = match fs::read_dir(&dir) {
            Ok(read) => read,
            Err(_) => return entries,
        };
        for entry in read.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Ok(meta) = entry.metadata() {
                let name = entry.file_name().to_string_lossy().into_owned();
                let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                entries.push((name, mtime, meta.len()));
            }
        }
        entries.sort();
        entries
    }
}

impl DocumentStore for FileStore {
    fn get_all(&self, collection: &str) -> Result<Vec<Document>, Error> {
        if !self.root.exists() {
            return Err(Error::store_unavailable(format!(
                "store directory does not exist: {}",
                self.root.display()
            )));
        }
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir)
            .map_err(|e| Error::store_unavailable(format!("cannot read {}: {e}", dir.display())))?;

        let mut docs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::store_unavailable(format!("cannot list {}: {e}", dir.display()))
            })?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match self.read_document(&path) {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!("skipping unreadable document {}: {e}", path.display()),
            }
        }
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }

    fn get_one(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        let path = self.doc_path(collection, id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_document(&path).map(Some)
    }

    fn set_fields(&self, collection: &str, id: &str, fields: Fields) -> Result<(), Error> {
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir).map_err(|e| {
            Error::store_write(collection, id, format!("cannot create {}: {e}", dir.display()))
        })?;
        let path = self.doc_path(collection, id);
        let result = if path.exists() {
            merge_into_existing(&path, fields)
        } else {
            write_new(&dir, &path, fields)
        };
        result.map_err(|e| Error::store_write(collection, id, format!("{e:#}")))?;
        debug!(collection, doc = id, "document updated");
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), Error> {
        let path = self.doc_path(collection, id);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| Error::store_write(collection, id, format!("cannot delete: {e}")))?;
            debug!(collection, doc = id, "document deleted");
        }
        Ok(())
    }

    fn watch(&self, collection: &str, listener: SnapshotListener) -> Result<WatchHandle, Error> {
        let id = Uuid::new_v4();
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let store = self.clone();
        let collection = collection.to_string();
        let poll = self.poll;

        let thread = thread::Builder::new()
            .name(format!("jaunt-watch-{collection}"))
            .spawn(move || {
                debug!(watch = %id, collection = %collection, "watch started");
                let mut last = store.fingerprint(&collection);
                match store.get_all(&collection) {
                    Ok(docs) => listener(docs),
                    Err(e) => warn!("initial snapshot of {collection} failed: {e}"),
                }
                while !flag.load(Ordering::SeqCst) {
                    sleep_in_chunks(poll, &flag);
                    if flag.load(Ordering::SeqCst) {
                        break;
                    }
                    let next = store.fingerprint(&collection);
                    if next != last {
                        last = next;
                        match store.get_all(&collection) {
                            Ok(docs) => listener(docs),
                            Err(e) => warn!("snapshot of {collection} failed: {e}"),
                        }
                    }
                }
                debug!(watch = %id, "watch stopped");
            })
            .map_err(|e| Error::store_unavailable(format!("cannot spawn watcher thread: {e}")))?;

        Ok(WatchHandle::new(id, stopped, Some(thread)))
    }
}

/// Read-merge-write under a single exclusive lock. Truncation happens
/// after the lock is held, so another process can never observe an
/// empty document mid-write.
fn merge_into_existing(path: &Path, fields: Fields) -> anyhow::Result<()> {
    #[allow(clippy::suspicious_open_options)]
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.lock_exclusive()
        .with_context(|| format!("lock {}", path.display()))?;

    let mut content = String::new();
    BufReader::new(&file)
        .read_to_string(&mut content)
        .with_context(|| format!("read {}", path.display()))?;

    let mut existing: Fields = if content.trim().is_empty() {
        Fields::new()
    } else {
        match serde_json::from_str(&content) {
            Ok(existing) => existing,
            Err(e) => {
                warn!("replacing malformed document {}: {e}", path.display());
                Fields::new()
            }
        }
    };
    for (key, value) in fields {
        existing.insert(key, value);
    }

    let json =
        serde_json::to_string_pretty(&existing).context("serialize document")?;
    file.set_len(0)
        .with_context(|| format!("truncate {}", path.display()))?;
    (&file)
        .seek(SeekFrom::Start(0))
        .with_context(|| format!("rewind {}", path.display()))?;
    let mut writer = BufWriter::new(&file);
    writer
        .write_all(json.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// First write of a document goes through a temp file and an atomic
/// rename, so watchers never see a partially written file.
fn write_new(dir: &Path, path: &Path, fields: Fields) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&fields).context("serialize document")?;
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes()).context("write temp file")?;
    tmp.as_file().sync_all().context("sync temp file")?;
    tmp.persist(path)
        .with_context(|| format!("move document into place at {}", path.display()))?;
    Ok(())
}
