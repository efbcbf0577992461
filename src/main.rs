mod duration;
mod error;
mod flag;

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::duration::DurationArg;
use crate::flag::{DisableOutcome, EnableOutcome, Installation};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn maintenance mode on, for a limited time by default
    Enable {
        /// Installation root
        ///
        /// Directory that holds the `.maintenance` flag file
        #[arg(long, env = "SITE_MAINTENANCE_ROOT", default_value = ".")]
        path: PathBuf,

        /// How long maintenance mode stays on
        ///
        /// `default`, `forever` (needs `--force` too), a number of seconds,
        /// or a date/time to stay on until
        #[arg(long, env = "SITE_MAINTENANCE_DURATION")]
        duration: Option<String>,

        /// Replace the duration of an already enabled maintenance mode
        #[arg(long)]
        force: bool,

        /// Seconds applied when `--duration` is absent or `default`
        #[arg(
            long,
            env = "SITE_MAINTENANCE_DEFAULT_DURATION_SECS",
            default_value_t = 600
        )]
        default_duration_secs: u32,
    },

    /// Turn maintenance mode off
    Disable {
        /// Installation root
        #[arg(long, env = "SITE_MAINTENANCE_ROOT", default_value = ".")]
        path: PathBuf,
    },

    /// Print `1` if maintenance mode is on, `0` otherwise
    Status {
        /// Installation root
        #[arg(long, env = "SITE_MAINTENANCE_ROOT", default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Enable {
            path,
            duration,
            force,
            default_duration_secs,
        } => {
            let now = Utc::now();
            let duration = DurationArg::parse(duration.as_deref(), now)?;
            let default_duration = chrono::Duration::seconds(i64::from(default_duration_secs));

            match Installation::new(path).enable(&duration, force, default_duration, now)? {
                EnableOutcome::Enabled { expires_at } => match expires_at {
                    Some(until) => println!("Maintenance mode enabled until {until}"),
                    None => println!("Maintenance mode enabled until further notice"),
                },
                EnableOutcome::Updated { expires_at } => match expires_at {
                    Some(until) => println!("Maintenance mode duration updated, on until {until}"),
                    None => println!("Maintenance mode duration updated, on until further notice"),
                },
            }
        }
        Commands::Disable { path } => match Installation::new(path).disable(Utc::now())? {
            DisableOutcome::Disabled => println!("Maintenance mode disabled"),
            DisableOutcome::WasInactive => warn!("Maintenance mode is not enabled, nothing to do"),
        },
        Commands::Status { path } => {
            let active = Installation::new(path).is_active(Utc::now())?;
            println!("{}", u8::from(active));
        }
    }

    Ok(())
}

fn init_logging() {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr) // Print to stderr
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}
