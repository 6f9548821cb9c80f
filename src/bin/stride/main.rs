//! Stride CLI
//!
//! Command-line interface for the Stride & Rise leaderboard.

mod client;
mod commands;
mod style;

use clap::{Parser, Subcommand};
use stride_leaderboard::ContributionKind;
use style::*;

const BANNER: &str = r#"
  ███████╗████████╗██████╗ ██╗██████╗ ███████╗
  ██╔════╝╚══██╔══╝██╔══██╗██║██╔══██╗██╔════╝
  ███████╗   ██║   ██████╔╝██║██║  ██║█████╗
  ╚════██║   ██║   ██╔══██╗██║██║  ██║██╔══╝
  ███████║   ██║   ██║  ██║██║██████╔╝███████╗
  ╚══════╝   ╚═╝   ╚═╝  ╚═╝╚═╝╚═════╝ ╚══════╝
"#;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "stride")]
#[command(version)]
#[command(about = "Stride & Rise - Run together, climb the leaderboard", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Leaderboard server; without it the leaderboard is computed locally
    #[arg(short, long, env = "STRIDE_SERVER_URL", global = true)]
    server: Option<String>,

    /// Config file used for local mode
    #[arg(short, long, env = "STRIDE_CONFIG", default_value = "config.toml", global = true)]
    config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// View the leaderboard (default)
    #[command(visible_alias = "lb")]
    Leaderboard {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Your wallet address, always shown
        #[arg(short, long, env = "STRIDE_ADDRESS")]
        address: Option<String>,
    },

    /// Show aggregator state: contract, API key, cache
    Debug,

    /// Record a contribution in your local journal
    #[command(visible_alias = "l")]
    Log {
        /// attend, host, pace or supplies
        kind: ContributionKind,

        /// Journal file
        #[arg(long, env = "STRIDE_JOURNAL")]
        journal: Option<String>,
    },

    /// Show your journal totals, streak and badges
    #[command(visible_alias = "t")]
    Totals {
        /// Journal file
        #[arg(long, env = "STRIDE_JOURNAL")]
        journal: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("info").init();
    }

    let command = cli.command.unwrap_or(Commands::Leaderboard {
        limit: 20,
        address: None,
    });

    let result = match command {
        Commands::Leaderboard { limit, address } => {
            print_banner();
            commands::leaderboard::run(cli.server.as_deref(), &cli.config, limit, address).await
        }
        Commands::Debug => commands::debug::run(cli.server.as_deref(), &cli.config).await,
        Commands::Log { kind, journal } => commands::log::run(kind, journal.as_deref()),
        Commands::Totals { journal } => commands::totals::run(journal.as_deref()),
        Commands::Config => commands::config::run(&cli.config),
    };

    if let Err(e) = result {
        say_err(&format!("{}", e));
        std::process::exit(1);
    }
}

pub fn print_banner() {
    println!("{}", paint(Tone::Cyan, BANNER));
    println!(
        "  {} {}",
        paint(Tone::Dim, "Stride & Rise"),
        paint(Tone::Dim, &format!("v{}", VERSION))
    );
    println!();
}
