//! Match construction and the orchestration shared by both concurrency
//! backends: role-bag assembly, per-agent RNG seeding, the day-vote
//! sanitisation rule, and the single-agent action steps each backend's
//! driver invokes once a barrier releases a task.

pub mod coop;
pub mod threaded;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use mafia_sim_types::Backend;
use mafia_sim_types::LogVerbosity;
use mafia_sim_types::Phase;
use mafia_sim_types::PlayerId;
use mafia_sim_types::Role;
use mafia_sim_types::TiePolicy;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::consts::DEFAULT_K_MAFIA_DIV;
use crate::consts::DEFAULT_LOGS_DIR;
use crate::consts::DEFAULT_N_PLAYERS;
use crate::consts::RNG_SEED_MIX;
use crate::error::MafiaSimError;
use crate::moderator::Moderator;
use crate::moderator::ModeratorConfig;
use crate::role::Agent;
use crate::role::AgentHandle;
use crate::role::ConsoleHuman;
use crate::world::GameState;

/// Everything needed to start a match. Mirrors the configuration-file /
/// CLI keys of the same name (§6).
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub n_players: usize,
    /// `0` means "derive one from OS entropy for this run".
    pub seed: u64,
    pub human: bool,
    pub log_verbosity: LogVerbosity,
    pub open_announcements: bool,
    pub logs_dir: PathBuf,
    pub tie_policy: TiePolicy,
    pub k_mafia_div: usize,
    pub executioner_count: u8,
    pub journalist_count: u8,
    pub eavesdropper_count: u8,
    pub backend: Backend,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            n_players: DEFAULT_N_PLAYERS,
            seed: 0,
            human: false,
            log_verbosity: LogVerbosity::Short,
            open_announcements: false,
            logs_dir: PathBuf::from(DEFAULT_LOGS_DIR),
            tie_policy: TiePolicy::Executioner,
            k_mafia_div: DEFAULT_K_MAFIA_DIV,
            executioner_count: 0,
            journalist_count: 0,
            eavesdropper_count: 0,
            backend: Backend::Threaded,
        }
    }
}

impl GameConfig {
    /// The backend this config actually runs with: a Human agent's console
    /// I/O is blocking, so Human+Coroutine is silently downgraded to
    /// Threaded (§6). The config/CLI layer is expected to have already
    /// applied this; `setup` and the drivers don't re-check it.
    pub fn effective_backend(&self) -> Backend {
        if self.human && self.backend == Backend::Coroutine {
            Backend::Threaded
        } else {
            self.backend
        }
    }
}

/// The constructed, not-yet-running match: a live [`Moderator`] and the
/// agent handles that both engine drivers consume identically.
pub struct MatchSetup {
    pub moderator: Arc<Moderator>,
    pub agents: Vec<AgentHandle>,
}

/// Builds the role bag: exactly one each of Detective/Doctor/Maniac, the
/// configured 0-or-1 of Executioner/Journalist/Eavesdropper, `mafia_count`
/// Mafia, and the remainder Citizens.
fn build_role_bag(
    n_players: usize,
    k_mafia_div: usize,
    executioner: bool,
    journalist: bool,
    eavesdropper: bool,
) -> Result<Vec<Role>, MafiaSimError> {
    let mafia_count = std::cmp::max(1, n_players / std::cmp::max(3, k_mafia_div));

    let mut roles = vec![Role::Detective, Role::Doctor, Role::Maniac];
    if executioner {
        roles.push(Role::Executioner);
    }
    if journalist {
        roles.push(Role::Journalist);
    }
    if eavesdropper {
        roles.push(Role::Eavesdropper);
    }
    roles.extend(std::iter::repeat_n(Role::Mafia, mafia_count));

    if roles.len() > n_players {
        return Err(MafiaSimError::TooManyRoles(format!(
            "{} fixed/optional/mafia roles exceed {n_players} players",
            roles.len()
        )));
    }

    let citizen_count = n_players - roles.len();
    roles.extend(std::iter::repeat_n(Role::Citizen, citizen_count));
    Ok(roles)
}

/// Constructs the world, the role-seeded agents, and the Moderator that
/// arbitrates them. Does not start any backend's driver loop.
pub fn setup(config: &GameConfig) -> Result<MatchSetup, MafiaSimError> {
    if config.n_players == 0 {
        return Err(MafiaSimError::NotEnoughPlayers(
            "n_players must be at least 1".to_string(),
        ));
    }

    let effective_seed = if config.seed == 0 {
        rand::rng().random::<u64>()
    } else {
        config.seed
    };
    let mut global_rng = StdRng::seed_from_u64(effective_seed);

    let mut roles = build_role_bag(
        config.n_players,
        config.k_mafia_div,
        config.executioner_count > 0,
        config.journalist_count > 0,
        config.eavesdropper_count > 0,
    )?;
    roles.shuffle(&mut global_rng);

    let human_index = config.human.then_some(0usize);

    let names: Vec<Arc<str>> = (0..config.n_players)
        .map(|i| Arc::from(format!("Player{}", i + 1)))
        .collect();

    let game = GameState::new(names, roles.clone(), Phase::Day);

    let mut agents = Vec::with_capacity(config.n_players);
    let mut executioners = Vec::new();

    for idx in 0..config.n_players {
        let id = PlayerId(idx);
        let agent_seed = effective_seed ^ RNG_SEED_MIX.wrapping_mul(idx as u64 + 1);

        let agent = if human_index == Some(idx) {
            Agent::new_human(id, roles[idx], agent_seed, Box::new(ConsoleHuman))
        } else {
            Agent::new_ai(id, roles[idx], agent_seed)
        };

        let handle: AgentHandle = Arc::new(Mutex::new(agent));
        if roles[idx] == Role::Executioner {
            executioners.push((id, Arc::clone(&handle)));
        }
        agents.push(handle);
    }

    let moderator_config = ModeratorConfig {
        tie_policy: config.tie_policy,
        logs_dir: config.logs_dir.clone(),
        log_verbosity: config.log_verbosity,
        open_announcements: config.open_announcements,
    };

    let moderator = Arc::new(Moderator::new(
        game,
        executioners,
        moderator_config,
        effective_seed,
    ));

    Ok(MatchSetup { moderator, agents })
}

/// Sanitises a day-vote: a valid pick is an alive player other than the
/// voter. An invalid or absent pick falls back to a uniform draw over the
/// same candidate set, via the Moderator's own seeded RNG stream so this
/// fallback stays reproducible for a fixed non-zero seed, same as every
/// other arbitration draw in resolution.
pub(crate) fn sanitize_day_vote(
    moderator: &Moderator,
    voter: PlayerId,
    proposed: Option<PlayerId>,
) -> Option<PlayerId> {
    if let Some(target) = proposed {
        if target != voter && moderator.is_alive(target) {
            return Some(target);
        }
    }

    let candidates: Vec<PlayerId> = moderator
        .alive_ids()
        .into_iter()
        .filter(|id| *id != voter)
        .collect();
    moderator.choose_uniform(&candidates)
}

/// Runs one agent's day step if it is alive: `on_day`, `vote_day`,
/// sanitisation, and submission. A no-op for a dead agent.
pub(crate) fn run_day_action(moderator: &Moderator, agents: &[AgentHandle], index: usize) {
    let id = PlayerId(index);
    if !moderator.is_alive(id) {
        return;
    }

    let proposed = {
        let mut agent = agents[index].lock().unwrap();
        agent.on_day(moderator);
        agent.vote_day(moderator)
    };

    let vote = sanitize_day_vote(moderator, id, proposed);
    moderator.submit_day_vote(id, vote);
}

/// Runs one agent's night step if it is alive. A no-op for a dead agent.
pub(crate) fn run_night_action(moderator: &Moderator, agents: &[AgentHandle], index: usize) {
    let id = PlayerId(index);
    if !moderator.is_alive(id) {
        return;
    }

    let mut agent = agents[index].lock().unwrap();
    agent.on_night(moderator);
}

/// `true` if any agent in this match is the interactive Human.
pub(crate) fn has_human(agents: &[AgentHandle]) -> bool {
    agents.iter().any(|a| a.lock().unwrap().is_human())
}
