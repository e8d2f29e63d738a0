use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "memstream", version, about = "Memory Streamer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Connect or disconnect (mock) social platforms
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Photo tags and chat activity
    Contacts {
        #[command(subcommand)]
        action: commands::contacts::ContactsAction,
    },
    /// Rank recipients for a photo
    Rank(commands::rank::RankArgs),
    /// Global snooze gate
    Snooze {
        #[command(subcommand)]
        action: commands::snooze::SnoozeAction,
    },
    /// Post directly to a connected platform
    Post(commands::post::PostArgs),
    /// Run the nag timers against the console
    Run(commands::run::RunArgs),
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("memstream=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Contacts { action } => commands::contacts::run(action),
        Commands::Rank(args) => commands::rank::run(args),
        Commands::Snooze { action } => commands::snooze::run(action),
        Commands::Post(args) => commands::post::run(args),
        Commands::Run(args) => commands::run::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
