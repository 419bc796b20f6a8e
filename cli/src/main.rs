//! guildctl: inspect DAO configurations and replay transaction scripts.

mod script;

use anyhow::Context;
use clap::Parser;
use guild_dao::DaoConfig;
use guild_types::Address;
use guild_utils::LogFormat;
use script::{Replay, Step};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "guildctl", about = "Guild DAO governance tool")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "warn", env = "GUILD_LOG_LEVEL")]
    log_level: String,

    /// Log output: "human" or "json".
    #[arg(long, default_value = "human", env = "GUILD_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Validate a DAO config and print its governance settings.
    Settings {
        /// Path to the TOML configuration file.
        #[arg(long, env = "GUILD_CONFIG")]
        config: PathBuf,

        /// Print the settings as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Initialize a DAO from a config and replay a JSON script against it.
    Replay {
        /// Path to the TOML configuration file.
        #[arg(long, env = "GUILD_CONFIG")]
        config: PathBuf,

        /// JSON array of steps.
        #[arg(long)]
        script: PathBuf,

        /// Clock reading, in seconds, when the DAO is initialized.
        #[arg(long, default_value_t = 1)]
        start: u64,

        /// Address the DAO lives at.
        #[arg(long, default_value = "0x00000000000000000000000000000000000000da")]
        address: Address,

        /// Stop at the first failing step.
        #[arg(long)]
        fail_fast: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    guild_utils::init_logging(cli.log_format, &cli.log_level);

    match cli.command {
        Command::Settings { config, json } => {
            let config = load_config(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.settings)?);
            } else {
                println!("{} ({})", config.name, config.symbol);
                println!(
                    "members: {}  extensions: {}  paused: {}",
                    config.members.len(),
                    config.extensions.len(),
                    config.paused
                );
                print!("{}", config.settings);
            }
        }
        Command::Replay {
            config,
            script,
            start,
            address,
            fail_fast,
        } => {
            let config = load_config(&config)?;
            let raw = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let steps: Vec<Step> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing script {}", script.display()))?;

            let mut replay = Replay::new(address, config, start)?;
            let outcomes = replay.run(&steps, fail_fast);
            let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
            tracing::info!(steps = outcomes.len(), failed, "replay finished");

            println!("{}", serde_json::to_string_pretty(&replay.summary(outcomes))?);
            if fail_fast && failed > 0 {
                anyhow::bail!("replay stopped at a failing step");
            }
        }
    }
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<DaoConfig> {
    let config = DaoConfig::from_toml_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
