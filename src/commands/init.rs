use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Deserializer};

use crate::auth::add_admin;
use crate::itinerary::ItineraryRepository;
use crate::models::constants::{ADMINS_COLLECTION, APP_STATE_COLLECTION, ITINERARY_COLLECTION};
use crate::models::Step;
use crate::store::{DocumentStore, FileStore};
use crate::validation::{validate_email, validate_step_id};

/// Seed file: trip title, steps, and the initial admin list.
#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    trip: Option<String>,
    steps: Vec<SeedStep>,
    #[serde(default)]
    admins: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SeedStep {
    #[serde(deserialize_with = "step_id_from_yaml")]
    id: String,
    title: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    unlocked: bool,
}

/// Seed files usually write ids as bare numbers; accept both.
fn step_id_from_yaml<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl serde::de::Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a step id (number or string)")
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<String, E> {
            if v < 0 {
                return Err(E::custom("step id cannot be negative"));
            }
            Ok(v.to_string())
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Seed the store from a YAML file
///
/// # Arguments
/// * `store_root` - Store directory to initialize
/// * `seed_path` - Path to the seed file
/// * `force` - If true, wipe existing itinerary data first
pub fn execute(store_root: &Path, seed_path: &Path, force: bool) -> Result<()> {
    print_header();

    let seed = load_seed(seed_path)?;
    println!(
        "  {} Seed parsed: {} step{}",
        "✓".green().bold(),
        seed.steps.len().to_string().bold(),
        if seed.steps.len() == 1 { "" } else { "s" }
    );

    let itinerary_dir = store_root.join(ITINERARY_COLLECTION);
    if itinerary_dir.exists() && !force {
        anyhow::bail!(
            "store at {} already has an itinerary (use --force to reseed)",
            store_root.display()
        );
    }

    if force {
        println!("\n{}", "Cleanup".bold());
        println!("{}", "─".repeat(40).dimmed());
        for collection in [ITINERARY_COLLECTION, APP_STATE_COLLECTION, ADMINS_COLLECTION] {
            let dir = store_root.join(collection);
            if dir.exists() {
                fs::remove_dir_all(&dir)
                    .with_context(|| format!("Failed to remove {}", dir.display()))?;
                println!(
                    "  {} Cleared {}",
                    "✓".green().bold(),
                    format!("{collection}/").dimmed()
                );
            }
        }
    }

    println!("\n{}", "Initialize".bold());
    println!("{}", "─".repeat(40).dimmed());

    let store = FileStore::open(store_root);
    let repo = ItineraryRepository::new(store.clone());

    for seed_step in &seed.steps {
        let mut step = Step::new(&seed_step.id, &seed_step.title);
        step.location = seed_step.location.clone();
        step.is_unlocked = seed_step.unlocked;
        store.set_fields(ITINERARY_COLLECTION, &step.id, step.to_fields())?;
    }
    let unlocked = seed.steps.iter().filter(|s| s.unlocked).count();
    println!(
        "  {} Steps written {}",
        "✓".green().bold(),
        format!("({unlocked} unlocked)").dimmed()
    );

    if let Some(trip) = &seed.trip {
        repo.save_trip_title(trip)?;
        println!("  {} Trip titled {}", "✓".green().bold(), trip.cyan());
    }

    for email in &seed.admins {
        add_admin(&store, email)?;
    }
    if !seed.admins.is_empty() {
        println!(
            "  {} {} admin{} registered",
            "✓".green().bold(),
            seed.admins.len().to_string().bold(),
            if seed.admins.len() == 1 { "" } else { "s" }
        );
    }

    print_summary(store_root, seed.steps.len());
    Ok(())
}

fn load_seed(seed_path: &Path) -> Result<SeedFile> {
    if !seed_path.exists() {
        anyhow::bail!("Seed file does not exist: {}", seed_path.display());
    }
    let raw = fs::read_to_string(seed_path)
        .with_context(|| format!("Failed to read seed file: {}", seed_path.display()))?;
    let seed: SeedFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file: {}", seed_path.display()))?;
    validate_seed(&seed)?;
    Ok(seed)
}

fn validate_seed(seed: &SeedFile) -> Result<()> {
    if seed.steps.is_empty() {
        anyhow::bail!("seed file has no steps");
    }
    let mut seen = HashSet::new();
    for step in &seed.steps {
        validate_step_id(&step.id)
            .map_err(|e| anyhow::anyhow!("step id {:?}: {e}", step.id))?;
        if step.title.trim().is_empty() {
            anyhow::bail!("step {} has an empty title", step.id);
        }
        if !seen.insert(step.id.as_str()) {
            anyhow::bail!("duplicate step id {}", step.id);
        }
    }
    for email in &seed.admins {
        validate_email(email).map_err(|e| anyhow::anyhow!("admin {email:?}: {e}"))?;
    }
    Ok(())
}

/// Print the jaunt init header
fn print_header() {
    println!();
    println!("{}", "╭──────────────────────────────────────╮".cyan());
    println!("{}", "│       Seeding the itinerary...       │".cyan().bold());
    println!("{}", "╰──────────────────────────────────────╯".cyan());
    println!();
}

/// Print the final summary
fn print_summary(store_root: &Path, step_count: usize) {
    println!();
    println!("{}", "═".repeat(40).dimmed());
    println!(
        "{} Store initialized at {}",
        "✓".green().bold(),
        store_root.display().to_string().cyan()
    );
    println!(
        "  {} step{} in the itinerary",
        step_count.to_string().bold(),
        if step_count == 1 { "" } else { "s" }
    );

    println!();
    println!("{}", "Next steps:".bold());
    println!("  {}  Sign in", "jaunt login".cyan());
    println!("  {}  Start revealing", "jaunt draw".cyan());
    println!();
}
