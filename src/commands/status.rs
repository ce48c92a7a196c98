use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::auth::AdminDirectory;
use crate::config::Config;
use crate::errors::Error;
use crate::identity::{IdentityProvider, SessionFile};
use crate::itinerary::ItineraryRepository;
use crate::reveal::RevealMachine;
use crate::store::FileStore;

/// One-shot snapshot of the trip: current step, history, readiness,
/// and (for admins) the full step table.
pub fn execute(config: &Config, store_root: &Path) -> Result<()> {
    let store = FileStore::open(store_root);
    let repo = ItineraryRepository::new(store.clone());

    let steps = match repo.load_steps() {
        Ok(steps) => steps,
        Err(Error::StoreUnavailable { reason }) => {
            println!("{} {}", "✗".red().bold(), format!("store unavailable: {reason}").red());
            println!(
                "  {}",
                format!(
                    "seed it with `jaunt init <seed.yaml>` or point --store at the right directory ({})",
                    store_root.display()
                )
                .dimmed()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let sessions = SessionFile::at_root(store_root);
    let identity = sessions.current()?;
    let admins = AdminDirectory::new(store, config.auth.source, config.auth.admins.clone());
    let is_admin = admins.is_admin(identity.as_ref());

    let progress = repo.load_progress()?;
    let machine = RevealMachine::new(config.reveal_params(), steps, progress);

    println!();
    if let Some(title) = repo.trip_title()? {
        println!("{}", title.bold());
        println!("{}", "─".repeat(40).dimmed());
    }

    match &identity {
        Some(identity) => {
            let badge = if is_admin { " (admin)".yellow().to_string() } else { String::new() };
            println!("signed in as {}{badge}", identity.label().cyan());
        }
        None => println!("{}", "signed out".dimmed()),
    }
    println!();

    match machine.current_step() {
        Some(step) => {
            println!("current: {}", step.title.bold().yellow());
            if let Some(location) = &step.location {
                println!("         {}", location.dimmed());
            }
        }
        None => println!("current: {}", "nothing revealed yet".dimmed()),
    }

    let revealed: Vec<&str> = machine
        .history()
        .iter()
        .filter_map(|id| machine.steps().iter().find(|s| &s.id == id))
        .map(|s| s.title.as_str())
        .collect();
    if !revealed.is_empty() {
        println!("revealed: {}", revealed.join(", ").green());
    }

    if machine.next_ready() {
        println!("next: {}", "ready to draw".green());
    } else {
        println!("next: {}", "locked".dimmed());
    }

    if is_admin {
        println!();
        println!("{}", "Steps".bold());
        println!("{}", "─".repeat(40).dimmed());
        for step in machine.steps() {
            let (glyph, title) = if machine.is_revealed(&step.id) {
                ("✓".green().bold(), step.title.normal())
            } else if step.is_unlocked {
                ("→".cyan().bold(), step.title.normal())
            } else {
                ("─".dimmed(), step.title.dimmed())
            };
            let lock = if step.is_unlocked {
                "unlocked".cyan()
            } else {
                "locked".dimmed()
            };
            println!("  {glyph} {:>4}  {title}  {lock}", step.id.bold());
        }
    }
    println!();

    Ok(())
}
