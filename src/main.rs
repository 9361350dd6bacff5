//! revkeep CLI - content-addressed directory snapshots

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use revkeep::ops::{backup, log, restore, BackupOutcome};
use revkeep::Repository;

#[derive(Parser)]
#[command(name = "revkeep")]
#[command(about = "content-addressed directory snapshots with numbered revisions")]
#[command(version)]
struct Cli {
    /// working directory to snapshot
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a repository in the working directory
    Init,

    /// remove the repository and every revision it holds
    Remove,

    /// record a new revision of the working directory
    Backup,

    /// restore the working directory to a revision
    Restore {
        /// revision number (defaults to the latest)
        #[arg(short, long)]
        revision: Option<u64>,
    },

    /// list recorded revisions
    Log,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> revkeep::Result<()> {
    match cli.command {
        Commands::Init => {
            let repo = Repository::init(&cli.dir)?;
            println!("initialized revkeep repository at {}", repo.root().display());
        }

        Commands::Remove => {
            let repo = Repository::open(&cli.dir)?;
            repo.destroy()?;
            println!("removed repository");
        }

        Commands::Backup => {
            let repo = Repository::open(&cli.dir)?;
            match backup(&repo)? {
                BackupOutcome::Created(n) => println!("recorded revision {}", n),
                BackupOutcome::NoChanges => println!("no changes"),
            }
        }

        Commands::Restore { revision } => {
            let repo = Repository::open(&cli.dir)?;
            let restored = restore(&repo, revision)?;
            println!("restored revision {}", restored);
        }

        Commands::Log => {
            let repo = Repository::open(&cli.dir)?;
            for entry in log(&repo)? {
                println!("{}", entry);
            }
        }
    }

    Ok(())
}
