use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use jaunt::commands::{admins, draw, init, session, status, steps};
use jaunt::config::Config;
use jaunt::validation::{clap_email_validator, clap_step_id_validator};

#[derive(Parser)]
#[command(name = "jaunt")]
#[command(about = "Progressive trip itinerary reveal CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Store directory (overrides JAUNT_STORE and the config file)
    #[arg(long, global = true, value_name = "DIR")]
    store: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the store from a YAML itinerary file
    Init {
        /// Path to the seed file
        seed_path: PathBuf,

        /// Wipe existing itinerary data before seeding
        #[arg(long)]
        force: bool,
    },

    /// Sign in
    Login {
        /// Email to sign in with (prompted when omitted)
        #[arg(value_parser = clap_email_validator)]
        email: Option<String>,

        /// Display name shown instead of the email
        #[arg(long)]
        name: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show who is signed in
    Whoami,

    /// Open the interactive draw screen
    Draw,

    /// Show the trip snapshot
    Status,

    /// Inspect and toggle itinerary steps
    Steps {
        #[command(subcommand)]
        command: StepsCommands,
    },

    /// Manage the admin list
    Admins {
        #[command(subcommand)]
        command: AdminsCommands,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum StepsCommands {
    /// List all steps with lock and reveal state (admin)
    List,

    /// Unlock a step (admin)
    Unlock {
        /// Step id (digits only; max 16 characters)
        #[arg(value_parser = clap_step_id_validator)]
        step_id: String,
    },

    /// Lock a step again (admin)
    Lock {
        /// Step id (digits only; max 16 characters)
        #[arg(value_parser = clap_step_id_validator)]
        step_id: String,
    },
}

#[derive(Subcommand)]
enum AdminsCommands {
    /// List the effective admins
    List,

    /// Register an admin
    Add {
        #[arg(value_parser = clap_email_validator)]
        email: String,
    },

    /// Remove an admin
    Remove {
        #[arg(value_parser = clap_email_validator)]
        email: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jaunt=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let store_root = config.resolve_store_root(cli.store);

    match cli.command {
        Commands::Init { seed_path, force } => init::execute(&store_root, &seed_path, force),
        Commands::Login { email, name } => session::execute_login(&store_root, email, name),
        Commands::Logout => session::execute_logout(&store_root),
        Commands::Whoami => session::execute_whoami(&config, &store_root),
        Commands::Draw => draw::execute(&config, &store_root),
        Commands::Status => status::execute(&config, &store_root),
        Commands::Steps { command } => match command {
            StepsCommands::List => steps::execute_list(&config, &store_root),
            StepsCommands::Unlock { step_id } => {
                steps::execute_unlock(&config, &store_root, &step_id)
            }
            StepsCommands::Lock { step_id } => steps::execute_lock(&config, &store_root, &step_id),
        },
        Commands::Admins { command } => match command {
            AdminsCommands::List => admins::execute_list(&config, &store_root),
            AdminsCommands::Add { email } => admins::execute_add(&store_root, &email),
            AdminsCommands::Remove { email } => admins::execute_remove(&store_root, &email),
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut io::stdout());
            Ok(())
        }
    }
}
