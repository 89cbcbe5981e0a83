use mafia_sim_types::Backend;
use mafia_sim_types::Role;
use mafia_sim_types::Team;
use mafia_sim_types::TiePolicy;

use crate::engine::GameConfig;
use crate::engine::setup;
use crate::play;

use super::scratch_dir;

fn base_config(dir: std::path::PathBuf) -> GameConfig {
    GameConfig {
        logs_dir: dir,
        ..GameConfig::default()
    }
}

#[test_log::test]
fn role_census_matches_the_configured_counts() {
    let dir = scratch_dir("role-census");
    let config = GameConfig {
        n_players: 12,
        k_mafia_div: 3,
        executioner_count: 1,
        journalist_count: 1,
        eavesdropper_count: 0,
        ..base_config(dir.clone())
    };

    let match_setup = setup(&config).expect("valid config");
    let moderator = match_setup.moderator;

    assert_eq!(moderator.alive_ids_with_role(Role::Mafia).len(), 4);
    assert_eq!(moderator.alive_ids_with_role(Role::Detective).len(), 1);
    assert_eq!(moderator.alive_ids_with_role(Role::Doctor).len(), 1);
    assert_eq!(moderator.alive_ids_with_role(Role::Maniac).len(), 1);
    assert_eq!(moderator.alive_ids_with_role(Role::Executioner).len(), 1);
    assert_eq!(moderator.alive_ids_with_role(Role::Journalist).len(), 1);
    assert_eq!(moderator.alive_ids_with_role(Role::Eavesdropper).len(), 0);
    assert_eq!(moderator.player_count(), 12);

    let citizens = moderator.alive_ids_with_role(Role::Citizen).len();
    assert_eq!(4 + 1 + 1 + 1 + 1 + 1 + 0 + citizens, 12);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test_log::test]
fn too_many_fixed_roles_for_the_player_count_is_rejected() {
    let dir = scratch_dir("too-many-roles");
    let config = GameConfig {
        n_players: 2,
        executioner_count: 1,
        journalist_count: 1,
        eavesdropper_count: 1,
        ..base_config(dir.clone())
    };

    let err = setup(&config).expect_err("3 fixed + 3 optional + mafia exceeds 2 players");
    assert!(matches!(err, crate::MafiaSimError::TooManyRoles(_)));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test_log::test]
fn coop_backend_is_deterministic_for_a_fixed_nonzero_seed() {
    let dir_a = scratch_dir("determinism-a");
    let dir_b = scratch_dir("determinism-b");

    let config_a = GameConfig {
        n_players: 9,
        seed: 7,
        backend: Backend::Coroutine,
        ..base_config(dir_a.clone())
    };
    let config_b = GameConfig {
        logs_dir: dir_b.clone(),
        ..config_a.clone()
    };

    let moderator_a = play(&config_a).expect("match a runs to completion");
    let moderator_b = play(&config_b).expect("match b runs to completion");

    assert_eq!(moderator_a.winner(), moderator_b.winner());
    assert_eq!(moderator_a.round(), moderator_b.round());

    for id in 0..config_a.n_players {
        let id = mafia_sim_types::PlayerId(id);
        assert_eq!(moderator_a.is_alive(id), moderator_b.is_alive(id));
    }

    let rounds_a = moderator_a.round();
    for round in 1..=rounds_a {
        let text_a = std::fs::read_to_string(dir_a.join(format!("round_{round}.txt")));
        let text_b = std::fs::read_to_string(dir_b.join(format!("round_{round}.txt")));
        assert_eq!(text_a.ok(), text_b.ok());
    }

    let _ = std::fs::remove_dir_all(&dir_a);
    let _ = std::fs::remove_dir_all(&dir_b);
}

#[test_log::test]
fn winner_totality_holds_on_both_backends() {
    for backend in [Backend::Threaded, Backend::Coroutine] {
        let dir = scratch_dir(&format!("winner-totality-{backend:?}"));
        let config = GameConfig {
            n_players: 7,
            seed: 42,
            backend,
            ..base_config(dir.clone())
        };

        let moderator = play(&config).expect("match runs to completion");
        assert!(moderator.game_over());
        assert!(moderator.winner().is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }
}

#[test_log::test]
fn round_numbers_strictly_increase_and_each_round_file_is_written_once() {
    let dir = scratch_dir("round-monotonicity");
    let config = GameConfig {
        n_players: 8,
        seed: 99,
        backend: Backend::Coroutine,
        ..base_config(dir.clone())
    };

    let moderator = play(&config).expect("match runs to completion");
    let final_round = moderator.round();
    assert!(final_round >= 1);

    for round in 1..=final_round {
        let path = dir.join(format!("round_{round}.txt"));
        assert!(path.exists(), "round {round} file missing");
    }
    assert!(!dir.join(format!("round_{}.txt", final_round + 1)).exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test_log::test]
fn trivial_five_player_match_reaches_a_definite_outcome_quickly() {
    let dir = scratch_dir("trivial-town-win");
    let config = GameConfig {
        n_players: 5,
        k_mafia_div: 4,
        seed: 1,
        backend: Backend::Coroutine,
        ..base_config(dir.clone())
    };

    let moderator = play(&config).expect("match runs to completion");
    assert_eq!(moderator.alive_ids_with_role(Role::Mafia).len(), 1);

    let winner = moderator.winner().expect("a winner is declared");
    assert!(winner == Team::Town || winner == Team::Maniac);
    assert!(moderator.round() <= config.n_players as u32 + 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test_log::test]
fn executioner_tie_policy_with_no_living_executioner_falls_back_to_no_lynch() {
    // Exercises the full setup -> play path with TiePolicy::Executioner and
    // no Executioner role in the bag: resolve_day_lynch must fall back to
    // DayTieNoLynch rather than panicking on an empty executioners list.
    let dir = scratch_dir("executioner-fallback");
    let config = GameConfig {
        n_players: 6,
        seed: 3,
        tie_policy: TiePolicy::Executioner,
        executioner_count: 0,
        backend: Backend::Coroutine,
        ..base_config(dir.clone())
    };

    let moderator = play(&config).expect("match runs to completion");
    assert!(moderator.game_over());

    let _ = std::fs::remove_dir_all(&dir);
}
