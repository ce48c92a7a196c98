//! Admin authorization and the unlock controller.
//!
//! Admin status can come from a config allow-list or from the `admins`
//! collection in the store, where membership is by document id (the
//! email). Either way the check fails closed: an unreadable store or a
//! signed-out caller is never an admin.

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::Error;
use crate::models::constants::{ADMINS_COLLECTION, ITINERARY_COLLECTION};
use crate::models::step::unlock_fields;
use crate::models::Identity;
use crate::store::{DocumentStore, Fields};

/// Where admin membership is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdminSource {
    /// Allow-list in the config file.
    #[default]
    Config,
    /// One document per admin in the `admins` collection.
    Store,
}

pub struct AdminDirectory<S: DocumentStore> {
    source: AdminSource,
    allow_list: Vec<String>,
    store: S,
}

impl<S: DocumentStore> AdminDirectory<S> {
    pub fn new(store: S, source: AdminSource, allow_list: Vec<String>) -> Self {
        AdminDirectory {
            source,
            allow_list: allow_list.into_iter().map(|e| e.to_lowercase()).collect(),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether `identity` may toggle step locks. Email comparison is
    /// case-insensitive.
    pub fn is_admin(&self, identity: Option<&Identity>) -> bool {
        let email = match identity {
            Some(identity) => identity.email.to_lowercase(),
            None => return false,
        };
        match self.source {
            AdminSource::Config => self.allow_list.iter().any(|admin| *admin == email),
            AdminSource::Store => match self.store.get_all(ADMINS_COLLECTION) {
                Ok(docs) => docs.iter().any(|doc| doc.id.to_lowercase() == email),
                Err(e) => {
                    warn!("admin lookup failed, treating {email} as non-admin: {e}");
                    false
                }
            },
        }
    }
}

/// Sets a step's lock flag. Authorization happens first, then the step
/// must exist, then the flag is written as a single field update.
pub fn set_unlocked<S: DocumentStore>(
    directory: &AdminDirectory<S>,
    identity: Option<&Identity>,
    step_id: &str,
    unlocked: bool,
) -> Result<(), Error> {
    if !directory.is_admin(identity) {
        return Err(Error::permission_denied(
            identity.map(|identity| identity.email.as_str()),
        ));
    }
    let store = directory.store();
    if store.get_one(ITINERARY_COLLECTION, step_id)?.is_none() {
        return Err(Error::invalid_step(step_id, "no such step"));
    }
    store.set_fields(ITINERARY_COLLECTION, step_id, unlock_fields(unlocked))?;
    info!(step = step_id, unlocked, "step lock changed");
    Ok(())
}

/// Admin emails from the store, in id order.
pub fn list_admins<S: DocumentStore>(store: &S) -> Result<Vec<String>, Error> {
    Ok(store
        .get_all(ADMINS_COLLECTION)?
        .into_iter()
        .map(|doc| doc.id)
        .collect())
}

/// Registers an admin. Deployment tooling, not gated on the caller
/// being an admin themselves. Emails are stored lowercased so removal
/// never depends on the original spelling.
pub fn add_admin<S: DocumentStore>(store: &S, email: &str) -> Result<(), Error> {
    store.set_fields(ADMINS_COLLECTION, &email.to_lowercase(), Fields::new())?;
    info!(email, "admin added");
    Ok(())
}

pub fn remove_admin<S: DocumentStore>(store: &S, email: &str) -> Result<(), Error> {
    store.delete(ADMINS_COLLECTION, &email.to_lowercase())?;
    info!(email, "admin removed");
    Ok(())
}
