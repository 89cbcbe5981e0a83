//! Integration tests covering the Moderator's resolution rules, the engine's
//! match setup, and end-to-end runs on both backends.

mod engine_tests;
mod role_tests;

use std::path::PathBuf;
use std::sync::Arc;

use mafia_sim_types::Phase;
use mafia_sim_types::Role;

use crate::moderator::Moderator;
use crate::moderator::ModeratorConfig;
use crate::world::GameState;

/// A scratch logs directory unique to the calling test, under the OS temp
/// dir. Callers are responsible for removing it when done.
fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "mafia-sim-engine-test-{label}-{}-{:?}",
        std::process::id(),
        std::thread::current().id()
    ))
}

/// Builds a bare Moderator with the given roles (index order == player id
/// order) and no Executioners registered, for tests that drive resolution
/// directly through the public intent-submission API.
fn moderator_with_roles(roles: Vec<Role>, tie_policy: mafia_sim_types::TiePolicy, logs_dir: PathBuf) -> Moderator {
    let names: Vec<Arc<str>> = (0..roles.len())
        .map(|i| Arc::from(format!("Player{}", i + 1)))
        .collect();
    let game = GameState::new(names, roles, Phase::Day);
    let config = ModeratorConfig {
        tie_policy,
        logs_dir,
        log_verbosity: mafia_sim_types::LogVerbosity::Full,
        open_announcements: false,
    };
    Moderator::new(game, Vec::new(), config, 1)
}

fn read_round_file(logs_dir: &std::path::Path, round: u32) -> String {
    std::fs::read_to_string(logs_dir.join(format!("round_{round}.txt")))
        .expect("round file should have been written")
}
