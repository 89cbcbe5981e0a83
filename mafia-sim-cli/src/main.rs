//! Binary entry point: parses CLI flags, merges them over an optional
//! config file, builds a [`mafia_sim_engine::GameConfig`], and runs one
//! match to completion. Exit codes per spec.md §6: 0 success, 1
//! configuration error, 2 runtime exception.

mod cli;
mod config;
mod error;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mafia_sim_types::Backend;
use mafia_sim_types::LogVerbosity;
use mafia_sim_types::TiePolicy;

use cli::Cli;
use config::RawConfig;
use error::CliError;
use mafia_sim_engine::GameConfig;

fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Merges CLI flags over a (possibly absent) parsed config file: a flag
/// present on the command line overrides whatever the config file set,
/// and anything neither side set falls back to [`GameConfig::default`].
fn build_game_config(cli: &Cli, file: RawConfig) -> Result<GameConfig, CliError> {
    let defaults = GameConfig::default();

    let human = cli
        .human
        .as_deref()
        .and_then(parse_bool_flag)
        .or(file.human)
        .unwrap_or(defaults.human);

    let log_verbosity = cli
        .log
        .as_deref()
        .and_then(|v| match v {
            "short" => Some(LogVerbosity::Short),
            "full" => Some(LogVerbosity::Full),
            _ => None,
        })
        .or(file.log_verbosity)
        .unwrap_or(defaults.log_verbosity);

    let tie_policy = cli
        .tie
        .as_deref()
        .and_then(|v| match v {
            "none" => Some(TiePolicy::Executioner),
            "random" => Some(TiePolicy::Random),
            _ => None,
        })
        .or(file.tie_policy)
        .unwrap_or(defaults.tie_policy);

    let backend = if cli.coro {
        Backend::Coroutine
    } else {
        file.backend.unwrap_or(defaults.backend)
    };

    let game_config = GameConfig {
        n_players: cli.n_players.or(file.n_players).unwrap_or(defaults.n_players),
        seed: cli.seed.or(file.seed).unwrap_or(defaults.seed),
        human,
        log_verbosity,
        open_announcements: cli.open || file.open_announcements.unwrap_or(defaults.open_announcements),
        logs_dir: cli
            .logs_dir
            .clone()
            .or(file.logs_dir.map(PathBuf::from))
            .unwrap_or(defaults.logs_dir),
        tie_policy,
        k_mafia_div: cli.k_mafia_div.or(file.k_mafia_div).unwrap_or(defaults.k_mafia_div),
        executioner_count: cli
            .executioner_count
            .or(file.executioner_count)
            .unwrap_or(defaults.executioner_count),
        journalist_count: cli
            .journalist_count
            .or(file.journalist_count)
            .unwrap_or(defaults.journalist_count),
        eavesdropper_count: cli
            .eavesdropper_count
            .or(file.eavesdropper_count)
            .unwrap_or(defaults.eavesdropper_count),
        backend,
    };

    Ok(game_config)
}

/// Setup phase only: parses flags, reads the config file, and installs
/// logging. Errors here are configuration errors (exit code 1). Returns
/// the logging guard alongside the config: it must outlive the match run
/// in `main` so the background file writer flushes before exit.
fn setup() -> Result<(GameConfig, logging::LoggingGuard), CliError> {
    let cli = Cli::parse();

    let file_config = match &cli.yaml {
        Some(path) => config::load(path)?,
        None => RawConfig::default(),
    };

    let game_config = build_game_config(&cli, file_config)?;
    let logging_guard = logging::init(&game_config.logs_dir);

    if game_config.human && game_config.backend == Backend::Coroutine {
        tracing::warn!("human player requested with the coroutine backend; downgrading to threaded");
    }

    Ok((game_config, logging_guard))
}

fn main() -> ExitCode {
    let (game_config, _logging_guard) = match setup() {
        Ok(result) => result,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::from(1);
        }
    };

    // `evaluate_winner`'s documented invariant break (§7 "Unexpected
    // engine invariant break") is fatal-by-panic inside the engine; catch
    // it here so the process still reports the CLI's contracted exit code
    // instead of an arbitrary panic-runtime status.
    let outcome = std::panic::catch_unwind(|| mafia_sim_engine::play(&game_config));

    match outcome {
        Ok(Ok(moderator)) => {
            tracing::info!(
                winner = ?moderator.winner(),
                rounds = moderator.round(),
                "match complete"
            );
            ExitCode::from(0)
        }
        Ok(Err(err)) => {
            eprintln!("configuration error: {err}");
            ExitCode::from(1)
        }
        Err(_) => {
            eprintln!("runtime error: engine invariant violated, see log for diagnostic");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_file_config() {
        let cli = Cli {
            n_players: Some(15),
            seed: None,
            human: None,
            log: None,
            open: false,
            logs_dir: None,
            tie: None,
            k_mafia_div: None,
            executioner_count: None,
            journalist_count: None,
            eavesdropper_count: None,
            yaml: None,
            coro: false,
        };
        let mut file = RawConfig::default();
        file.n_players = Some(9);
        file.seed = Some(7);

        let merged = build_game_config(&cli, file).expect("merges cleanly");
        assert_eq!(merged.n_players, 15);
        assert_eq!(merged.seed, 7);
    }

    #[test]
    fn coro_flag_selects_coroutine_backend() {
        let cli = Cli {
            n_players: None,
            seed: None,
            human: None,
            log: None,
            open: false,
            logs_dir: None,
            tie: None,
            k_mafia_div: None,
            executioner_count: None,
            journalist_count: None,
            eavesdropper_count: None,
            yaml: None,
            coro: true,
        };

        let merged = build_game_config(&cli, RawConfig::default()).expect("merges cleanly");
        assert_eq!(merged.backend, Backend::Coroutine);
    }
}
