//! The flat key/value config file reader (§6): one `key: value` per line,
//! `#` begins a comment, blank lines are ignored, keys are case-insensitive.
//! Unknown keys warn and are skipped; malformed values warn and the key is
//! skipped. This is intentionally hand-rolled rather than a TOML/YAML crate
//! — the format predates both and isn't either one.

use std::path::Path;

use mafia_sim_types::Backend;
use mafia_sim_types::LogVerbosity;
use mafia_sim_types::TiePolicy;

use crate::error::CliError;

/// Values parsed out of the config file, each `None` if the key was absent.
/// Every field mirrors a [`mafia_sim_engine::GameConfig`] field of the same
/// name; merging onto CLI flags happens one layer up in `main`.
#[derive(Default, Debug, Clone)]
pub struct RawConfig {
    pub n_players: Option<usize>,
    pub seed: Option<u64>,
    pub human: Option<bool>,
    pub log_verbosity: Option<LogVerbosity>,
    pub open_announcements: Option<bool>,
    pub logs_dir: Option<String>,
    pub tie_policy: Option<TiePolicy>,
    pub k_mafia_div: Option<usize>,
    pub executioner_count: Option<u8>,
    pub journalist_count: Option<u8>,
    pub eavesdropper_count: Option<u8>,
    pub backend: Option<Backend>,
}

/// Parses `true/false/yes/no/on/off/1/0`, case-insensitively.
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_zero_or_one(value: &str) -> Option<u8> {
    match value {
        "0" => Some(0),
        "1" => Some(1),
        _ => None,
    }
}

/// Reads and parses a config file at `path`. Returns [`CliError::Unreadable`]
/// only if the file itself cannot be read; every per-line problem is a
/// warning, not an error, per spec.md §7 ("malformed values → warning and
/// the key is skipped").
pub fn load(path: &Path) -> Result<RawConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let mut config = RawConfig::default();

    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            tracing::warn!(line = lineno + 1, "malformed config line, expected 'key: value'");
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        apply_key(&mut config, &key, value, lineno + 1);
    }

    Ok(config)
}

fn apply_key(config: &mut RawConfig, key: &str, value: &str, lineno: usize) {
    match key {
        "n_players" => match value.parse::<usize>() {
            Ok(n) if n >= 1 => config.n_players = Some(n),
            _ => tracing::warn!(line = lineno, key, value, "expected an integer >= 1"),
        },
        "seed" => match value.parse::<u64>() {
            Ok(n) => config.seed = Some(n),
            Err(_) => tracing::warn!(line = lineno, key, value, "expected a non-negative integer"),
        },
        "human" => match parse_bool(value) {
            Some(b) => config.human = Some(b),
            None => tracing::warn!(line = lineno, key, value, "expected a boolean"),
        },
        "log" => match value.to_ascii_lowercase().as_str() {
            "short" => config.log_verbosity = Some(LogVerbosity::Short),
            "full" => config.log_verbosity = Some(LogVerbosity::Full),
            _ => tracing::warn!(line = lineno, key, value, "expected 'short' or 'full'"),
        },
        "open" | "open_announcements" => match parse_bool(value) {
            Some(b) => config.open_announcements = Some(b),
            None => tracing::warn!(line = lineno, key, value, "expected a boolean"),
        },
        "logs_dir" => config.logs_dir = Some(value.to_string()),
        "tie" => match value.to_ascii_lowercase().as_str() {
            "none" => config.tie_policy = Some(TiePolicy::Executioner),
            "random" => config.tie_policy = Some(TiePolicy::Random),
            _ => tracing::warn!(line = lineno, key, value, "expected 'none' or 'random'"),
        },
        "k_mafia_div" => match value.parse::<usize>() {
            Ok(n) if n >= 1 => config.k_mafia_div = Some(n),
            _ => tracing::warn!(line = lineno, key, value, "expected an integer >= 1"),
        },
        "executioner_count" => match parse_zero_or_one(value) {
            Some(n) => config.executioner_count = Some(n),
            None => tracing::warn!(line = lineno, key, value, "expected 0 or 1"),
        },
        "journalist_count" => match parse_zero_or_one(value) {
            Some(n) => config.journalist_count = Some(n),
            None => tracing::warn!(line = lineno, key, value, "expected 0 or 1"),
        },
        "eavesdropper_count" => match parse_zero_or_one(value) {
            Some(n) => config.eavesdropper_count = Some(n),
            None => tracing::warn!(line = lineno, key, value, "expected 0 or 1"),
        },
        "use_coroutines" => match parse_bool(value) {
            Some(true) => config.backend = Some(Backend::Coroutine),
            Some(false) => config.backend = Some(Backend::Threaded),
            None => tracing::warn!(line = lineno, key, value, "expected a boolean"),
        },
        "engine" => match value.to_ascii_lowercase().as_str() {
            "coro" => config.backend = Some(Backend::Coroutine),
            "threads" => config.backend = Some(Backend::Threaded),
            _ => tracing::warn!(line = lineno, key, value, "expected 'coro' or 'threads'"),
        },
        other => tracing::warn!(line = lineno, key = other, "unknown config key, ignoring"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn parses_recognised_keys_and_ignores_comments_and_blanks() {
        let dir = std::env::temp_dir().join(format!("mafia-sim-cli-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("game.conf");
        std::fs::write(
            &path,
            "# a comment\n\nn_players: 12\nSEED: 42\nhuman: yes\nlog: full\ntie: random\nk_mafia_div: 4\nexec: 1\n",
        )
        .unwrap();

        let parsed = load(&path).expect("file exists");
        assert_eq!(parsed.n_players, Some(12));
        assert_eq!(parsed.seed, Some(42));
        assert_eq!(parsed.human, Some(true));
        assert_eq!(parsed.log_verbosity, Some(LogVerbosity::Full));
        assert_eq!(parsed.tie_policy, Some(TiePolicy::Random));
        assert_eq!(parsed.k_mafia_div, Some(4));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test_log::test]
    fn unknown_key_is_warned_and_skipped_not_fatal() {
        let dir = std::env::temp_dir().join(format!("mafia-sim-cli-config-test2-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("game.conf");
        std::fs::write(&path, "bogus_key: 1\nn_players: 7\n").unwrap();

        let parsed = load(&path).expect("file exists");
        assert_eq!(parsed.n_players, Some(7));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_unreadable_error() {
        let path = Path::new("/nonexistent/path/to/a/game.conf");
        assert!(load(path).is_err());
    }
}
