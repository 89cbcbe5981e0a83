//! Thread-per-agent backend: `N+1` OS threads (one per agent, one the
//! Moderator) rendezvousing on four [`ThreadedBarrier`]s a round.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;

use mafia_sim_types::PlayerId;

use super::MatchSetup;
use super::run_day_action;
use super::run_night_action;
use crate::barrier::ThreadedBarrier;

/// Runs a match to completion on the thread-per-agent backend, writing the
/// round/summary files as it goes, and returns once every agent thread has
/// exited.
pub fn run(setup: MatchSetup) {
    let MatchSetup { moderator, agents } = setup;
    let n = agents.len();

    let stop = Arc::new(AtomicBool::new(false));
    let day_start = Arc::new(ThreadedBarrier::new(n + 1, None));
    let day_end = Arc::new(ThreadedBarrier::new(n + 1, None));
    let night_start = Arc::new(ThreadedBarrier::new(n + 1, None));
    let night_end = Arc::new(ThreadedBarrier::new(n + 1, None));

    let handles: Vec<_> = agents
        .iter()
        .enumerate()
        .map(|(index, agent)| {
            let agent = Arc::clone(agent);
            let moderator = Arc::clone(&moderator);
            let stop = Arc::clone(&stop);
            let day_start = Arc::clone(&day_start);
            let day_end = Arc::clone(&day_end);
            let night_start = Arc::clone(&night_start);
            let night_end = Arc::clone(&night_end);

            thread::Builder::new()
                .name(format!("agent-{index}"))
                .spawn(move || {
                    let agents = std::slice::from_ref(&agent);
                    loop {
                        day_start.arrive();
                        if stop.load(Ordering::Acquire) {
                            return;
                        }
                        run_day_action(&moderator, agents, 0);

                        day_end.arrive();
                        if stop.load(Ordering::Acquire) {
                            return;
                        }

                        night_start.arrive();
                        if stop.load(Ordering::Acquire) {
                            return;
                        }
                        run_night_action(&moderator, agents, 0);

                        night_end.arrive();
                        if stop.load(Ordering::Acquire) {
                            return;
                        }
                    }
                })
                .expect("spawn agent thread")
        })
        .collect();

    moderator.begin_day();
    loop {
        day_start.arrive();
        day_end.arrive();
        moderator.resolve_day_lynch();

        if let Some(winner) = moderator.evaluate_winner() {
            moderator.finish(winner);
            stop.store(true, Ordering::Release);
            break;
        }

        night_start.arrive();
        night_end.arrive();
        moderator.resolve_night();

        if let Some(winner) = moderator.evaluate_winner() {
            moderator.finish(winner);
            stop.store(true, Ordering::Release);
            break;
        }

        moderator.advance_round();
        moderator.begin_day();
    }

    // Every agent thread is parked at whichever barrier comes next; drop a
    // party from each so none of them block forever.
    day_start.arrive_and_drop();
    day_end.arrive_and_drop();
    night_start.arrive_and_drop();
    night_end.arrive_and_drop();

    for handle in handles {
        let _ = handle.join();
    }

    moderator.finalize_round_file_if_pending();
    moderator.write_summary_file();
}

#[cfg(test)]
mod tests {
    use mafia_sim_types::Backend;

    use super::super::GameConfig;
    use super::super::setup;
    use super::*;

    #[test_log::test]
    fn a_small_match_terminates_with_a_winner() {
        let dir = tempfile_dir();
        let config = GameConfig {
            n_players: 6,
            seed: 12345,
            backend: Backend::Threaded,
            logs_dir: dir.clone(),
            ..GameConfig::default()
        };

        let match_setup = setup(&config).expect("valid config");
        let moderator = Arc::clone(&match_setup.moderator);
        run(match_setup);

        assert!(moderator.game_over());
        assert!(moderator.winner().is_some());
        assert!(!moderator.alive_ids().iter().any(|id| *id == PlayerId(usize::MAX)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn tempfile_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "mafia-sim-engine-threaded-test-{}",
            std::process::id()
        ))
    }
}
