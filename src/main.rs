use anyhow::Result;
use clap::{Parser, Subcommand};

use crush::cli;
use crush::config;
use crush::handler::Handler;

#[derive(Debug, Parser)]
#[command(name = "crush")]
#[command(about = "Delete runs of three or more identical characters until none are left")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collapse TEXT (words joined by spaces), or stdin when TEXT is omitted
    Run {
        text: Vec<String>,
        /// Shortest run to delete (overrides collapse.min_run_length)
        #[arg(long)]
        min_run: Option<usize>,
    },
    /// Show every deletion on the way to the collapsed result (input is trimmed
    /// when preprocessing.trim is on)
    Trace {
        text: String,
        /// Shortest run to delete (overrides collapse.min_run_length)
        #[arg(long)]
        min_run: Option<usize>,
        /// Remove all qualifying runs per pass instead of one at a time
        #[arg(long)]
        rounds: bool,
    },
    /// Read {"input": "..."} from stdin, write {"output": "..."} to stdout
    Json,
    /// Show collapse statistics from the analytics log
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.crush/config.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key (e.g. logging.level) in the global config
    Set { key: String, value: String },
    /// Overwrite the global config with defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let mut cfg = config::load();

    match app.command {
        Commands::Run { text, min_run } => {
            if let Some(min_run) = min_run {
                cfg.collapse.min_run_length = min_run;
            }
            let handler = Handler::from_config(&cfg);
            cli::run_collapse(&handler, &text)
        }
        Commands::Trace {
            text,
            min_run,
            rounds,
        } => {
            let min_run = min_run.unwrap_or(cfg.collapse.min_run_length);
            cli::run_trace(&text, min_run, rounds, cfg.preprocessing.trim)
        }
        Commands::Json => {
            let handler = Handler::from_config(&cfg);
            cli::run_json(&handler)
        }
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(&cfg, fmt, days)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
