use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::auth::AdminDirectory;
use crate::config::Config;
use crate::errors::Error;
use crate::identity::{IdentityProvider, SessionFile};
use crate::models::Identity;
use crate::store::FileStore;
use crate::validation::validate_email;

/// Sign in. Prompts for the email when it was not passed as an
/// argument; an empty answer cancels.
pub fn execute_login(
    store_root: &Path,
    email: Option<String>,
    display_name: Option<String>,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => match prompt_email() {
            Ok(email) => email,
            // Backing out of the prompt is not an error.
            Err(e) if matches!(e.downcast_ref::<Error>(), Some(Error::UserCancelled)) => {
                println!("{}", "sign-in cancelled".dimmed());
                return Ok(());
            }
            Err(e) => return Err(e),
        },
    };
    validate_email(&email).map_err(|e| anyhow::anyhow!("invalid email {email:?}: {e}"))?;

    let mut identity = Identity::new(&email);
    if let Some(name) = display_name {
        identity = identity.with_display_name(name);
    }

    let sessions = SessionFile::at_root(store_root);
    sessions.sign_in(&identity)?;

    println!(
        "{} Signed in as {}",
        "✓".green().bold(),
        identity.label().cyan()
    );
    Ok(())
}

pub fn execute_logout(store_root: &Path) -> Result<()> {
    let sessions = SessionFile::at_root(store_root);
    sessions.sign_out()?;
    println!("{} Signed out", "✓".green().bold());
    Ok(())
}

/// Show who is signed in, with their admin standing.
pub fn execute_whoami(config: &Config, store_root: &Path) -> Result<()> {
    let sessions = SessionFile::at_root(store_root);
    let identity = sessions.current()?;

    match identity {
        Some(identity) => {
            let store = FileStore::open(store_root);
            let admins = AdminDirectory::new(store, config.auth.source, config.auth.admins.clone());
            let badge = if admins.is_admin(Some(&identity)) {
                " (admin)".yellow().to_string()
            } else {
                String::new()
            };
            println!("{}{badge}", identity.email.bold());
            if let Some(name) = &identity.display_name {
                println!("  {}", name.dimmed());
            }
            if let Some(at) = sessions.signed_in_at()? {
                println!("  signed in {}", at.format("%Y-%m-%d %H:%M UTC").to_string().dimmed());
            }
        }
        None => println!("{}", "signed out".dimmed()),
    }
    Ok(())
}

/// Ask for an email on stdin. Empty input or EOF counts as backing out.
fn prompt_email() -> Result<String> {
    print!("email: ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed to read email")?;

    let answer = answer.trim().to_string();
    if answer.is_empty() {
        return Err(Error::UserCancelled.into());
    }
    Ok(answer)
}
