//! Session-file identity provider.
//!
//! The session lives in a single `session.json` beside the store
//! collections. Sign-in replaces the file atomically through a temp
//! file; sign-out deletes it. Watchers poll file metadata from a
//! background thread.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{IdentityListener, IdentityProvider};
use crate::errors::Error;
use crate::models::constants::DEFAULT_WATCH_POLL_MS;
use crate::models::Identity;
use crate::store::watch::sleep_in_chunks;
use crate::store::WatchHandle;

const SESSION_FILE: &str = "session.json";

/// On-disk shape of the session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    signed_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
    poll: Duration,
}

impl SessionFile {
    /// Provider whose session file sits directly under `root`.
    pub fn at_root(root: impl AsRef<Path>) -> Self {
        SessionFile {
            path: root.as_ref().join(SESSION_FILE),
            poll: Duration::from_millis(DEFAULT_WATCH_POLL_MS),
        }
    }

    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the current session started, if someone is signed in.
    pub fn signed_in_at(&self) -> Result<Option<DateTime<Utc>>, Error> {
        Ok(read_record(&self.path)?.map(|record| record.signed_in_at))
    }

    fn fingerprint(&self) -> Option<(SystemTime, u64)> {
        let meta = fs::metadata(&self.path).ok()?;
        let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Some((mtime, meta.len()))
    }
}

/// Reads the session file. Writers replace it atomically, so a plain
/// read never observes partial content. A missing file means signed
/// out; a malformed file is treated the same, with a warning.
fn read_record(path: &Path) -> Result<Option<SessionRecord>, Error> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)
        .map_err(|e| Error::store_unavailable(format!("cannot open session: {e}")))?;
    let mut content = String::new();
    BufReader::new(&file)
        .read_to_string(&mut content)
        .map_err(|e| Error::store_unavailable(format!("cannot read session: {e}")))?;
    match serde_json::from_str(&content) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            warn!("ignoring malformed session file {}: {e}", path.display());
            Ok(None)
        }
    }
}

fn identity_of(record: SessionRecord) -> Identity {
    Identity {
        email: record.email,
        display_name: record.display_name,
    }
}

impl IdentityProvider for SessionFile {
    fn sign_in(&self, identity: &Identity) -> Result<(), Error> {
        let record = SessionRecord {
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            signed_in_at: Utc::now(),
        };
        write_record(&self.path, &record)
            .map_err(|e| Error::store_write("session", &identity.email, format!("{e:#}")))?;
        debug!(email = %identity.email, "signed in");
        Ok(())
    }

    fn sign_out(&self) -> Result<(), Error> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| Error::store_write("session", SESSION_FILE, e.to_string()))?;
            debug!("signed out");
        }
        Ok(())
    }

    fn current(&self) -> Result<Option<Identity>, Error> {
        Ok(read_record(&self.path)?.map(identity_of))
    }

    fn watch(&self, listener: IdentityListener) -> Result<WatchHandle, Error> {
        let id = Uuid::new_v4();
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let provider = self.clone();
        let poll = self.poll;

        let thread = thread::Builder::new()
            .name("jaunt-watch-session".to_string())
            .spawn(move || {
                debug!(watch = %id, "session watch started");
                let mut last = provider.fingerprint();
                match provider.current() {
                    Ok(identity) => listener(identity),
                    Err(e) => warn!("initial session read failed: {e}"),
                }
                while !flag.load(Ordering::SeqCst) {
                    sleep_in_chunks(poll, &flag);
                    if flag.load(Ordering::SeqCst) {
                        break;
                    }
                    let next = provider.fingerprint();
                    if next != last {
                        last = next;
                        match provider.current() {
                            Ok(identity) => listener(identity),
                            Err(e) => warn!("session read failed: {e}"),
                        }
                    }
                }
                debug!(watch = %id, "session watch stopped");
            })
            .map_err(|e| Error::store_unavailable(format!("cannot spawn watcher thread: {e}")))?;

        Ok(WatchHandle::new(id, stopped, Some(thread)))
    }
}

/// Whole-file replace through a temp file so watchers and concurrent
/// readers never see a half-written session.
fn write_record(path: &Path, record: &SessionRecord) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .context("session path has no parent directory")?;
    fs::create_dir_all(parent)
        .with_context(|| format!("create session directory {}", parent.display()))?;
    let json = serde_json::to_string_pretty(record).context("serialize session")?;
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(json.as_bytes()).context("write session")?;
    tmp.as_file().sync_all().context("sync session")?;
    tmp.persist(path)
        .with_context(|| format!("move session into place at {}", path.display()))?;
    Ok(())
}
