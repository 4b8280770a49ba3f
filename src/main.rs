//! skirmish - battle simulator
//!
//! Runs seeded battles between two rosters with both sides on autopilot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use skirmish::combat::{BattleResult, SeededDice};
use skirmish::session::autopilot;
use skirmish::{BattleConfig, BattleManager, RosterFile};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Turn-based two-team battle simulator
#[derive(Parser, Debug)]
#[command(name = "skirmish", version, about = "Simulate turn-based team battles")]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run battles between the two teams of a roster file
    Simulate {
        /// TOML file with `team_a` and `team_b` rosters
        #[arg(short, long)]
        roster: PathBuf,

        /// TOML file overriding battle rules
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for the first battle; later battles use seed + n
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Number of battles to run
        #[arg(short, long, default_value_t = 1)]
        battles: u32,

        /// Print every battle's log
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the effective battle rules as JSON
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<BattleConfig> {
    if let Some(path) = path {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }
    let config = BattleConfig::load(path).context("Failed to load battle config")?;
    config.validate()?;
    Ok(config)
}

fn describe(result: Option<BattleResult>) -> String {
    match result {
        Some(result) => result.to_string(),
        None => "unfinished".to_string(),
    }
}

async fn simulate(
    roster_path: &Path,
    config_path: Option<&Path>,
    seed: u64,
    battles: u32,
    verbose: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    if !roster_path.exists() {
        bail!("Roster file not found: {}", roster_path.display());
    }
    let roster = RosterFile::load(roster_path)
        .with_context(|| format!("Failed to read roster {}", roster_path.display()))?;

    let manager = BattleManager::new(config.clone());
    let mut tally: BTreeMap<String, u32> = BTreeMap::new();

    for n in 0..battles {
        let battle_seed = seed.wrapping_add(n as u64);
        let id = manager
            .create_battle_with(
                &roster.team_a,
                &roster.team_b,
                config.clone(),
                Box::new(SeededDice::new(battle_seed)),
            )
            .await?;

        loop {
            let battle = manager.snapshot(&id).await?;
            let Some((actor, action)) = autopilot::choose_action(&battle) else {
                break;
            };
            debug!("battle {}: {} chooses {}", id, actor, action);
            let outcome = manager.submit(&id, &actor, action).await?;
            if outcome.ended {
                break;
            }
        }

        let battle = manager.snapshot(&id).await?;
        if verbose {
            for record in battle.log().iter() {
                println!("  [round {}] {}", record.round, record.message);
            }
        }
        println!(
            "battle {} (seed {}): {} after {} rounds",
            n + 1,
            battle_seed,
            describe(battle.result()),
            battle.round()
        );

        let key = match battle.result().map(|r| r.winner) {
            Some(Some(team)) => format!("{} wins", team),
            Some(None) => "draws".to_string(),
            None => "unfinished".to_string(),
        };
        *tally.entry(key).or_default() += 1;
        manager.remove(&id).await;
    }

    info!("Simulated {} battles", battles);
    println!();
    for (outcome, count) in &tally {
        println!("{:>12}: {}", outcome, count);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "skirmish=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match args.command {
        Command::Simulate {
            roster,
            config,
            seed,
            battles,
            verbose,
        } => simulate(&roster, config.as_deref(), seed, battles, verbose).await?,
        Command::Config { config } => {
            let config = load_config(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
