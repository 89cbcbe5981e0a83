//! Single-threaded cooperative backend: a work-queue trampoline drives every
//! agent's `day_start -> day_end -> night_start -> night_end` cycle on one
//! call stack, using [`CoopBarrier`] purely as an arrival counter.

use std::collections::VecDeque;

use mafia_sim_types::PlayerId;

use super::MatchSetup;
use super::run_day_action;
use super::run_night_action;
use crate::barrier::CoopBarrier;

/// The barrier a queued task is about to arrive at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    DayStart,
    DayEnd,
    NightStart,
    NightEnd,
}

/// Runs a match to completion on the cooperative backend, writing the
/// round/summary files as it goes.
pub fn run(setup: MatchSetup) {
    let MatchSetup { moderator, agents } = setup;
    let n = agents.len();

    let mut day_start = CoopBarrier::new(n);
    let mut day_end = CoopBarrier::new(n);
    let mut night_start = CoopBarrier::new(n);
    let mut night_end = CoopBarrier::new(n);

    let mut queue: VecDeque<(usize, Step)> =
        (0..n).map(|index| (index, Step::DayStart)).collect();

    moderator.begin_day();
    let mut stopped = false;

    while let Some((task_id, step)) = queue.pop_front() {
        if stopped {
            continue;
        }

        let released = match step {
            Step::DayStart => day_start.arrive(task_id),
            Step::DayEnd => day_end.arrive(task_id),
            Step::NightStart => night_start.arrive(task_id),
            Step::NightEnd => night_end.arrive(task_id),
        };

        let Some(released) = released else {
            continue;
        };

        match step {
            Step::DayStart => {
                for task_id in released {
                    run_day_action(&moderator, &agents, task_id);
                    queue.push_back((task_id, Step::DayEnd));
                }
            }
            Step::DayEnd => {
                moderator.resolve_day_lynch();
                if let Some(winner) = moderator.evaluate_winner() {
                    moderator.finish(winner);
                    stopped = true;
                    continue;
                }
                for task_id in released {
                    queue.push_back((task_id, Step::NightStart));
                }
            }
            Step::NightStart => {
                for task_id in released {
                    run_night_action(&moderator, &agents, task_id);
                    queue.push_back((task_id, Step::NightEnd));
                }
            }
            Step::NightEnd => {
                moderator.resolve_night();
                if let Some(winner) = moderator.evaluate_winner() {
                    moderator.finish(winner);
                    stopped = true;
                    continue;
                }
                moderator.advance_round();
                moderator.begin_day();
                for task_id in released {
                    queue.push_back((task_id, Step::DayStart));
                }
            }
        }
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
            seed: 54321,
            backend: Backend::Coroutine,
            logs_dir: dir.clone(),
            ..GameConfig::default()
        };

        let match_setup = setup(&config).expect("valid config");
        let moderator = std::sync::Arc::clone(&match_setup.moderator);
        run(match_setup);

        assert!(moderator.game_over());
        assert!(moderator.winner().is_some());
        assert!(!moderator.alive_ids().iter().any(|id| *id == PlayerId(usize::MAX)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn tempfile_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mafia-sim-engine-coop-test-{}", std::process::id()))
    }
}
