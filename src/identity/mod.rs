//! Identity provider abstraction.
//!
//! The app treats sign-in state as externally owned: it asks who is
//! signed in and subscribes to changes, nothing more. [`SessionFile`]
//! is the local implementation, keeping the session in a JSON file
//! next to the store so separate `jaunt` processes agree on it.

pub mod session;

pub use session::SessionFile;

use crate::errors::Error;
use crate::models::Identity;
use crate::store::WatchHandle;

/// Callback invoked with the signed-in user on every auth change.
pub type IdentityListener = Box<dyn Fn(Option<Identity>) + Send + 'static>;

pub trait IdentityProvider: Send + Sync {
    /// Records `identity` as the signed-in user, replacing any other.
    fn sign_in(&self, identity: &Identity) -> Result<(), Error>;

    /// Clears the signed-in user. A no-op when nobody is signed in.
    fn sign_out(&self) -> Result<(), Error>;

    /// The currently signed-in user, if any.
    fn current(&self) -> Result<Option<Identity>, Error>;

    /// Subscribes to auth changes. The listener fires once immediately
    /// with the current user and again on every change, until the
    /// handle is stopped or dropped.
    fn watch(&self, listener: IdentityListener) -> Result<WatchHandle, Error>;
}
