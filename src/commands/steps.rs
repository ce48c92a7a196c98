use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::auth::{set_unlocked, AdminDirectory};
use crate::config::Config;
use crate::errors::Error;
use crate::identity::{IdentityProvider, SessionFile};
use crate::itinerary::ItineraryRepository;
use crate::reveal::RevealMachine;
use crate::store::FileStore;

/// List every step with its lock and reveal state. Admin only: the
/// unrevealed titles are the whole point of the game.
pub fn execute_list(config: &Config, store_root: &Path) -> Result<()> {
    let (identity, admins) = directory(config, store_root)?;
    if !admins.is_admin(identity.as_ref()) {
        return Err(Error::permission_denied(
            identity.as_ref().map(|i| i.email.as_str()),
        )
        .into());
    }

    let repo = ItineraryRepository::new(admins.store().clone());
    let steps = repo.load_steps()?;
    let progress = repo.load_progress()?;
    let machine = RevealMachine::new(config.reveal_params(), steps, progress);

    if machine.steps().is_empty() {
        println!("{}", "no steps in the itinerary".dimmed());
        return Ok(());
    }

    println!();
    for step in machine.steps() {
        let glyph = if machine.is_revealed(&step.id) {
            "✓".green().bold()
        } else if step.is_unlocked {
            "→".cyan().bold()
        } else {
            "─".dimmed()
        };
        let lock = if step.is_unlocked {
            "unlocked".cyan()
        } else {
            "locked  ".dimmed()
        };
        let location = step
            .location
            .as_deref()
            .map(|l| format!("  {l}").dimmed().to_string())
            .unwrap_or_default();
        println!("  {glyph} {:>4}  {lock}  {}{location}", step.id.bold(), step.title);
    }
    println!();
    Ok(())
}

pub fn execute_unlock(config: &Config, store_root: &Path, step_id: &str) -> Result<()> {
    set_lock(config, store_root, step_id, true)
}

pub fn execute_lock(config: &Config, store_root: &Path, step_id: &str) -> Result<()> {
    set_lock(config, store_root, step_id, false)
}

fn set_lock(config: &Config, store_root: &Path, step_id: &str, unlocked: bool) -> Result<()> {
    let (identity, admins) = directory(config, store_root)?;
    set_unlocked(&admins, identity.as_ref(), step_id, unlocked)?;

    let verb = if unlocked { "unlocked" } else { "locked" };
    println!("{} Step {} {verb}", "✓".green().bold(), step_id.cyan());
    Ok(())
}

fn directory(
    config: &Config,
    store_root: &Path,
) -> Result<(Option<crate::models::Identity>, AdminDirectory<FileStore>)> {
    let sessions = SessionFile::at_root(store_root);
    let identity = sessions.current()?;
    let store = FileStore::open(store_root);
    let admins = AdminDirectory::new(store, config.auth.source, config.auth.admins.clone());
    Ok((identity, admins))
}
