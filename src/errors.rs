//! Error taxonomy shared by the store, auth, and reveal layers.
//!
//! Command code wraps these in `anyhow` with context; library code
//! returns them directly so callers can match on the failure class.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The backing store could not be reached or read at all.
    #[error("itinerary store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A write against the backing store failed.
    #[error("store write failed for {collection}/{doc}: {reason}")]
    StoreWrite {
        collection: String,
        doc: String,
        reason: String,
    },

    /// The caller is not allowed to perform an admin operation.
    #[error("permission denied for {who}: not an administrator")]
    PermissionDenied { who: String },

    /// The user backed out of an interactive sign-in.
    #[error("sign-in cancelled")]
    UserCancelled,

    /// A reveal was requested while no unlocked step is available.
    #[error("the next step is not unlocked yet")]
    NextStepLocked,

    /// A step id or step document did not pass validation.
    #[error("invalid step {id}: {reason}")]
    InvalidStep { id: String, reason: String },
}

impl Error {
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Error::StoreUnavailable {
            reason: reason.into(),
        }
    }

    pub fn store_write(
        collection: impl Into<String>,
        doc: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::StoreWrite {
            collection: collection.into(),
            doc: doc.into(),
            reason: reason.into(),
        }
    }

    /// Permission failure for an optionally signed-in caller.
    pub fn permission_denied(email: Option<&str>) -> Self {
        Error::PermissionDenied {
            who: email.unwrap_or("anonymous").to_string(),
        }
    }

    pub fn invalid_step(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidStep {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
