//! Discrete-turn social-deduction match engine: role catalogue, a
//! single-arbiter Moderator, and two interchangeable concurrency backends
//! (thread-per-agent and single-threaded cooperative) driving the same
//! Day/Night round loop.

mod barrier;
mod consts;
mod engine;
mod error;
mod moderator;
mod role;
mod world;

pub use barrier::CoopBarrier;
pub use barrier::ThreadedBarrier;
pub use engine::GameConfig;
pub use engine::MatchSetup;
pub use engine::setup;
pub use error::MafiaSimError;
pub use moderator::Moderator;
pub use moderator::ModeratorConfig;
pub use role::Agent;
pub use role::AgentHandle;
pub use role::ConsoleHuman;
pub use role::DetectiveChoice;
pub use role::HumanInterface;
pub use world::GameState;
pub use world::PlayerRecord;

use mafia_sim_types::Backend;

/// Builds a match from `config` and runs it to completion on whichever
/// backend [`GameConfig::effective_backend`] selects, writing round and
/// summary files under `config.logs_dir` as it goes. Returns the
/// [`Moderator`] so a caller can inspect the final roster, winner, and
/// per-player stats after the match ends.
pub fn play(config: &GameConfig) -> Result<std::sync::Arc<Moderator>, MafiaSimError> {
    let match_setup = setup(config)?;
    let moderator = std::sync::Arc::clone(&match_setup.moderator);

    match config.effective_backend() {
        Backend::Threaded => engine::threaded::run(match_setup),
        Backend::Coroutine => engine::coop::run(match_setup),
    }

    Ok(moderator)
}

#[cfg(test)]
mod tests;
