// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clanbattle - clan battle progress tracker.
//!
//! This is the operator entry point: it inspects and seeds the configured
//! store without a chat platform attached.

mod console;
mod report;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clanbattle_config::model::ClanBattleConfig;
use clanbattle_core::{BattleId, ClanError, GameServer, GroupId, MemberId, SystemClock};
use clanbattle_engine::BattleService;

use crate::console::Console;
use crate::report::ReportArgs;

/// Clanbattle - clan battle progress tracker.
#[derive(Parser, Debug)]
#[command(name = "clanbattle", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the usual locations.
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and print the effective configuration.
    Config,
    /// Show a group's bosses and today's progress.
    Status {
        group: u64,
        /// Print the raw snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List a group's archives and their record counts.
    Archives { group: u64 },
    /// List recorded attempts.
    Report {
        group: u64,
        #[arg(long)]
        member: Option<u64>,
        /// Game day (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Archive to read instead of the active one.
        #[arg(long)]
        archive: Option<BattleId>,
        /// Read every archive.
        #[arg(long, conflicts_with = "archive")]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Register a group on a game server (jp, tw, cn, kr).
    Register {
        group: u64,
        server: GameServer,
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config_file {
        Some(path) => clanbattle_config::load_and_validate_path(path),
        None => clanbattle_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            clanbattle_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let Some(command) = cli.command else {
        println!("clanbattle: use --help for available commands");
        return;
    };
    if let Err(e) = run(command, &config).await {
        eprintln!("clanbattle: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &ClanBattleConfig) -> Result<(), ClanError> {
    match command {
        Commands::Config => print_config(config),
        Commands::Status { group, json } => {
            let service = open_service(config).await?;
            status::run_status(&service, GroupId(group), json).await
        }
        Commands::Archives { group } => {
            let service = open_service(config).await?;
            status::run_archives(&service, GroupId(group)).await
        }
        Commands::Report {
            group,
            member,
            date,
            archive,
            all,
            json,
        } => {
            let service = open_service(config).await?;
            let args = ReportArgs {
                member: member.map(MemberId),
                date,
                archive,
                all,
                json,
            };
            report::run_report(&service, GroupId(group), &args).await
        }
        Commands::Register {
            group,
            server,
            name,
        } => {
            let service = open_service(config).await?;
            let registered = service.create_group(GroupId(group), server, name).await?;
            println!(
                "group {} registered on {} (cycle {}, archive {})",
                registered.group_id, registered.server, registered.cycle, registered.battle_id
            );
            Ok(())
        }
    }
}

fn print_config(config: &ClanBattleConfig) -> Result<(), ClanError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| ClanError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

async fn open_service(config: &ClanBattleConfig) -> Result<BattleService, ClanError> {
    let store = clanbattle_storage::open_store(&config.storage).await?;
    BattleService::new(
        store,
        Arc::new(Console),
        Arc::new(Console),
        Arc::new(SystemClock),
        config,
    )
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("clanbattle={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = clanbattle_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.battle.daily_attempts, 3);
        print_config(&config).unwrap();
    }

    #[test]
    fn report_flags_parse() {
        let cli = Cli::try_parse_from([
            "clanbattle", "report", "42", "--member", "7", "--date", "2026-03-02", "--json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Report {
                group,
                member,
                date,
                json,
                all,
                ..
            }) => {
                assert_eq!(group, 42);
                assert_eq!(member, Some(7));
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 2));
                assert!(json);
                assert!(!all);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn register_rejects_unknown_server() {
        assert!(Cli::try_parse_from(["clanbattle", "register", "1", "eu"]).is_err());
        let cli = Cli::try_parse_from(["clanbattle", "register", "1", "tw", "--name", "Owls"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Register {
                server: GameServer::Tw,
                ..
            })
        ));
    }

    #[test]
    fn all_conflicts_with_archive() {
        assert!(
            Cli::try_parse_from(["clanbattle", "report", "1", "--all", "--archive", "2"]).is_err()
        );
    }

    #[tokio::test]
    async fn register_then_status_on_memory_store() {
        let mut config = ClanBattleConfig::default();
        config.storage.backend = clanbattle_config::StorageBackend::Memory;
        run(
            Commands::Register {
                group: 5,
                server: GameServer::Jp,
                name: None,
            },
            &config,
        )
        .await
        .unwrap();
        // Each command opens its own store, so a fresh memory store has no groups.
        let err = run(
            Commands::Status {
                group: 5,
                json: false,
            },
            &config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClanError::GroupNotFound(GroupId(5))));
    }
}
