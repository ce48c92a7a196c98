/// Collection holding one document per itinerary step.
pub const ITINERARY_COLLECTION: &str = "itinerary";

/// Collection holding application-wide state documents.
pub const APP_STATE_COLLECTION: &str = "appState";

/// Document id of the reveal progress record inside `appState`.
pub const PROGRESS_DOC_ID: &str = "progress";

/// Document id of the optional trip metadata record inside `appState`.
pub const TRIP_META_DOC_ID: &str = "meta";

/// Collection holding one document per administrator, keyed by email.
pub const ADMINS_COLLECTION: &str = "admins";

/// Number of animation ticks spent cycling random steps before settling.
pub const DEFAULT_SPIN_TICKS: u32 = 40;

/// Milliseconds between animation ticks while a reveal is rolling.
pub const DEFAULT_TICK_MS: u64 = 50;

/// Milliseconds to hold on the final step before committing the reveal.
pub const DEFAULT_SETTLE_MS: u64 = 200;

/// Seconds a locked-step error banner stays on screen before self-clearing.
pub const DEFAULT_BANNER_SECS: u64 = 3;

/// Milliseconds between store polls for change subscriptions.
pub const DEFAULT_WATCH_POLL_MS: u64 = 500;
