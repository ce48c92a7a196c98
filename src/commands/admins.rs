use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::auth::{add_admin, list_admins, remove_admin, AdminSource};
use crate::config::Config;
use crate::store::FileStore;
use crate::validation::validate_email;

/// Show the effective admin list for the configured source.
pub fn execute_list(config: &Config, store_root: &Path) -> Result<()> {
    match config.auth.source {
        AdminSource::Config => {
            if config.auth.admins.is_empty() {
                println!("{}", "no admins in the config allow-list".dimmed());
            } else {
                for email in &config.auth.admins {
                    println!("  {}", email.cyan());
                }
            }
            println!(
                "  {}",
                "(from config; `auth.source = \"store\"` switches to the store)".dimmed()
            );
        }
        AdminSource::Store => {
            let store = FileStore::open(store_root);
            let admins = list_admins(&store)?;
            if admins.is_empty() {
                println!("{}", "no admins registered".dimmed());
            } else {
                for email in admins {
                    println!("  {}", email.cyan());
                }
            }
        }
    }
    Ok(())
}

/// Register an admin in the store. Bootstrap tooling, so this is not
/// gated on the caller already being an admin.
pub fn execute_add(store_root: &Path, email: &str) -> Result<()> {
    validate_email(email).map_err(|e| anyhow::anyhow!("invalid email {email:?}: {e}"))?;
    let store = FileStore::open(store_root);
    add_admin(&store, email)?;
    println!("{} {} is now an admin", "✓".green().bold(), email.cyan());
    Ok(())
}

pub fn execute_remove(store_root: &Path, email: &str) -> Result<()> {
    let store = FileStore::open(store_root);
    remove_admin(&store, email)?;
    println!("{} {} removed", "✓".green().bold(), email.cyan());
    Ok(())
}
