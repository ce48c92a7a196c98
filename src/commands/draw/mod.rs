//! Full-screen draw experience.
//!
//! Shows the current step, the reveal history, and (for admins) the
//! step table with lock toggles. Space starts the slot-machine reveal;
//! the store and session file are watched so edits from other
//! processes land live.

pub mod app;
pub mod event_handler;
pub mod renderer;
pub mod theme;

use std::path::Path;

use anyhow::Result;

use crate::config::Config;

pub use app::DrawApp;

/// Launch the interactive draw screen.
pub fn execute(config: &Config, store_root: &Path) -> Result<()> {
    let mut app = DrawApp::new(config, store_root)?;
    app.run()
}
