//! Role catalogue: one [`Agent`] per player, dispatching its three phase
//! hooks (`on_day`, `vote_day`, `on_night`) over a tagged variant instead of
//! virtual dispatch, per the role census in the data model.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use mafia_sim_types::PlayerId;
use mafia_sim_types::Role;
use mafia_sim_types::Team;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;

use crate::moderator::Moderator;

/// Shared handle to one agent. Normally only the owning per-agent task
/// thread locks it, between that agent's own `*_start`/`*_end` barrier
/// calls; the Moderator also reaches in for `decide_execution`, but only
/// during the dead zone between the day-end and night-start barriers, when
/// the agent thread is not touching its own state. The mutex is real but,
/// by this phase discipline, never contended.
pub type AgentHandle = Arc<Mutex<Agent>>;

/// Console/stdin interaction for the one interactive human player. Boxed so
/// tests can substitute a scripted double instead of driving real stdin.
pub trait HumanInterface: Send {
    fn prompt_day_vote(&mut self, candidates: &[(PlayerId, Arc<str>)]) -> Option<PlayerId>;
    fn prompt_night_action(&mut self, candidates: &[(PlayerId, Arc<str>)]) -> Option<PlayerId>;
    fn prompt_second_target(
        &mut self,
        first: PlayerId,
        candidates: &[(PlayerId, Arc<str>)],
    ) -> Option<PlayerId>;
    fn prompt_detective_choice(&mut self, known_mafia: &[(PlayerId, Arc<str>)]) -> DetectiveChoice;
    fn prompt_execution(&mut self, leaders: &[(PlayerId, Arc<str>)]) -> Option<PlayerId>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DetectiveChoice {
    Shoot(PlayerId),
    Investigate(PlayerId),
    Abstain,
}

/// Reads an integer from stdin, `0` denoting abstain where allowed.
pub struct ConsoleHuman;

impl ConsoleHuman {
    fn read_choice(prompt: &str) -> Option<usize> {
        print!("{prompt}");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return None;
        }

        line.trim().parse::<usize>().ok()
    }
}

impl HumanInterface for ConsoleHuman {
    fn prompt_day_vote(&mut self, candidates: &[(PlayerId, Arc<str>)]) -> Option<PlayerId> {
        for (id, name) in candidates {
            println!("  {id} {name}");
        }
        let choice = Self::read_choice("vote for (0 to abstain): ")?;
        if choice == 0 {
            return None;
        }
        candidates
            .iter()
            .find(|(id, _)| id.0 + 1 == choice)
            .map(|(id, _)| *id)
    }

    fn prompt_night_action(&mut self, candidates: &[(PlayerId, Arc<str>)]) -> Option<PlayerId> {
        for (id, name) in candidates {
            println!("  {id} {name}");
        }
        let choice = Self::read_choice("night action target (0 to skip): ")?;
        if choice == 0 {
            return None;
        }
        candidates
            .iter()
            .find(|(id, _)| id.0 + 1 == choice)
            .map(|(id, _)| *id)
    }

    fn prompt_second_target(
        &mut self,
        first: PlayerId,
        candidates: &[(PlayerId, Arc<str>)],
    ) -> Option<PlayerId> {
        println!("first target: {first}");
        self.prompt_night_action(candidates)
    }

    fn prompt_detective_choice(&mut self, known_mafia: &[(PlayerId, Arc<str>)]) -> DetectiveChoice {
        println!("known mafia:");
        for (id, name) in known_mafia {
            println!("  {id} {name}");
        }
        match Self::read_choice("(1) shoot, (2) investigate, (0) skip: ") {
            Some(1) => {
                if let Some(target) = Self::read_choice("shoot target: ").map(|n| PlayerId(n - 1))
                {
                    DetectiveChoice::Shoot(target)
                } else {
                    DetectiveChoice::Abstain
                }
            }
            Some(2) => {
                if let Some(target) =
                    Self::read_choice("investigate target: ").map(|n| PlayerId(n - 1))
                {
                    DetectiveChoice::Investigate(target)
                } else {
                    DetectiveChoice::Abstain
                }
            }
            _ => DetectiveChoice::Abstain,
        }
    }

    fn prompt_execution(&mut self, leaders: &[(PlayerId, Arc<str>)]) -> Option<PlayerId> {
        for (id, name) in leaders {
            println!("  {id} {name}");
        }
        let choice = Self::read_choice("execute (0 to abstain): ")?;
        if choice == 0 {
            return None;
        }
        leaders.iter().find(|(id, _)| id.0 + 1 == choice).map(|(id, _)| *id)
    }
}

enum RoleState {
    Citizen,
    Mafia,
    Detective { known_mafia: HashSet<PlayerId> },
    Doctor { previous_heal: Option<PlayerId> },
    Maniac,
    Executioner,
    Journalist,
    Eavesdropper,
}

/// A running player: its role, its own RNG stream, and its role-private
/// state. Never shared mutably except through the phase-discipline
/// described on [`AgentHandle`].
pub struct Agent {
    pub id: PlayerId,
    pub role: Role,
    rng: StdRng,
    state: RoleState,
    human: Option<Box<dyn HumanInterface>>,
}

fn initial_role_state(role: Role) -> RoleState {
    match role {
        Role::Citizen => RoleState::Citizen,
        Role::Mafia => RoleState::Mafia,
        Role::Detective => RoleState::Detective {
            known_mafia: HashSet::new(),
        },
        Role::Doctor => RoleState::Doctor {
            previous_heal: None,
        },
        Role::Maniac => RoleState::Maniac,
        Role::Executioner => RoleState::Executioner,
        Role::Journalist => RoleState::Journalist,
        Role::Eavesdropper => RoleState::Eavesdropper,
    }
}

/// Picks uniformly among `mod_.alive_ids()` excluding every id in `excl`.
fn uniform_alive_excluding<R: Rng>(
    mod_: &Moderator,
    rng: &mut R,
    excl: &[PlayerId],
) -> Option<PlayerId> {
    mod_.alive_ids()
        .into_iter()
        .filter(|id| !excl.contains(id))
        .choose(rng)
}

fn uniform_from<R: Rng>(rng: &mut R, pool: &[PlayerId]) -> Option<PlayerId> {
    pool.iter().copied().choose(rng)
}

impl Agent {
    pub fn new_ai(id: PlayerId, role: Role, seed: u64) -> Self {
        Agent {
            id,
            role,
            rng: StdRng::seed_from_u64(seed),
            state: initial_role_state(role),
            human: None,
        }
    }

    pub fn new_human(id: PlayerId, role: Role, seed: u64, io: Box<dyn HumanInterface>) -> Self {
        Agent {
            id,
            role,
            rng: StdRng::seed_from_u64(seed),
            state: initial_role_state(role),
            human: Some(io),
        }
    }

    pub fn is_human(&self) -> bool {
        self.human.is_some()
    }

    fn named_candidates(&self, mod_: &Moderator, ids: &[PlayerId]) -> Vec<(PlayerId, Arc<str>)> {
        ids.iter()
            .map(|id| (*id, mod_.name(*id).unwrap_or_else(|| Arc::from("?"))))
            .collect()
    }

    /// Runs any day-phase bookkeeping hook; currently a no-op for every
    /// role (reserved for symmetry with `on_night`).
    pub fn on_day(&mut self, _mod_: &Moderator) {}

    /// Returns this agent's desired day-vote target, or `None` to abstain.
    /// The engine sanitises the result before submitting it.
    pub fn vote_day(&mut self, mod_: &Moderator) -> Option<PlayerId> {
        if let Some(human) = &mut self.human {
            let candidates = mod_
                .alive_ids()
                .into_iter()
                .filter(|id| *id != self.id)
                .collect::<Vec<_>>();
            let candidates = self.named_candidates(mod_, &candidates);
            return human.prompt_day_vote(&candidates);
        }

        match &self.state {
            RoleState::Detective { known_mafia } if !known_mafia.is_empty() => {
                let alive_known = known_mafia
                    .iter()
                    .copied()
                    .filter(|id| mod_.is_alive(*id))
                    .collect::<Vec<_>>();
                uniform_from(&mut self.rng, &alive_known)
            }
            RoleState::Mafia => uniform_mafia_target(mod_, &mut self.rng, self.id),
            _ => uniform_alive_excluding(mod_, &mut self.rng, &[self.id]),
        }
    }

    /// Runs the night-phase hook, submitting whatever intent this role's
    /// action produces directly to the Moderator.
    pub fn on_night(&mut self, mod_: &Moderator) {
        if let Some(_human) = &self.human {
            self.on_night_human(mod_);
            return;
        }

        match self.role {
            Role::Citizen | Role::Executioner => {}
            Role::Mafia => {
                if let Some(target) = uniform_mafia_target(mod_, &mut self.rng, self.id) {
                    mod_.mafia_vote_target(self.id, target);
                }
            }
            Role::Detective => self.detective_night(mod_),
            Role::Doctor => self.doctor_night(mod_),
            Role::Maniac => {
                if let Some(target) = uniform_alive_excluding(mod_, &mut self.rng, &[self.id]) {
                    mod_.set_maniac_target(self.id, target);
                }
            }
            Role::Journalist => self.journalist_night(mod_),
            Role::Eavesdropper => {
                if let Some(target) = uniform_alive_excluding(mod_, &mut self.rng, &[self.id]) {
                    mod_.set_eavesdropper_target(self.id, target);
                }
            }
        }
    }

    fn on_night_human(&mut self, mod_: &Moderator) {
        let human = self.human.as_mut().expect("human present");

        match self.role {
            Role::Citizen | Role::Executioner => {}
            Role::Mafia => {
                let candidates = mod_
                    .alive_ids()
                    .into_iter()
                    .filter(|id| *id != self.id)
                    .collect::<Vec<_>>();
                let named = candidates
                    .iter()
                    .map(|id| (*id, mod_.name(*id).unwrap_or_else(|| Arc::from("?"))))
                    .collect::<Vec<_>>();
                if let Some(target) = human.prompt_night_action(&named) {
                    mod_.mafia_vote_target(self.id, target);
                }
            }
            Role::Detective => {
                let RoleState::Detective { known_mafia } = &mut self.state else {
                    unreachable!("detective state")
                };
                known_mafia.retain(|id| mod_.is_alive(*id));
                let known: Vec<_> = known_mafia.iter().copied().collect();
                let named_known = known
                    .iter()
                    .map(|id| (*id, mod_.name(*id).unwrap_or_else(|| Arc::from("?"))))
                    .collect::<Vec<_>>();
                match human.prompt_detective_choice(&named_known) {
                    DetectiveChoice::Shoot(target) => mod_.set_detective_shot(self.id, target),
                    DetectiveChoice::Investigate(target) => {
                        if let Some(team) = mod_.team(target) {
                            if team == Team::Mafia {
                                known_mafia.insert(target);
                            }
                        }
                    }
                    DetectiveChoice::Abstain => {}
                }
            }
            Role::Doctor => {
                let RoleState::Doctor { previous_heal } = &mut self.state else {
                    unreachable!("doctor state")
                };
                let candidates = mod_.alive_ids();
                let named = self.named_candidates(mod_, &candidates);
                if let Some(target) = human.prompt_night_action(&named) {
                    mod_.set_doctor_heal(self.id, target);
                    *previous_heal = Some(target);
                }
            }
            Role::Maniac => {
                let candidates = mod_
                    .alive_ids()
                    .into_iter()
                    .filter(|id| *id != self.id)
                    .collect::<Vec<_>>();
                let named = self.named_candidates(mod_, &candidates);
                if let Some(target) = human.prompt_night_action(&named) {
                    mod_.set_maniac_target(self.id, target);
                }
            }
            Role::Journalist => {
                let candidates = mod_
                    .alive_ids()
                    .into_iter()
                    .filter(|id| *id != self.id)
                    .collect::<Vec<_>>();
                let named = self.named_candidates(mod_, &candidates);
                let Some(a) = human.prompt_night_action(&named) else {
                    return;
                };
                let remaining = candidates
                    .into_iter()
                    .filter(|id| *id != a)
                    .collect::<Vec<_>>();
                let named_remaining = self.named_candidates(mod_, &remaining);
                if let Some(b) = human.prompt_second_target(a, &named_remaining) {
                    mod_.set_journalist_compare(self.id, a, b);
                }
            }
            Role::Eavesdropper => {
                let candidates = mod_
                    .alive_ids()
                    .into_iter()
                    .filter(|id| *id != self.id)
                    .collect::<Vec<_>>();
                let named = self.named_candidates(mod_, &candidates);
                if let Some(target) = human.prompt_night_action(&named) {
                    mod_.set_eavesdropper_target(self.id, target);
                }
            }
        }
    }

    fn detective_night(&mut self, mod_: &Moderator) {
        let RoleState::Detective { known_mafia } = &mut self.state else {
            unreachable!("detective state")
        };
        known_mafia.retain(|id| mod_.is_alive(*id));

        if !known_mafia.is_empty() && self.rng.random_bool(0.5) {
            let pool = known_mafia.iter().copied().collect::<Vec<_>>();
            if let Some(target) = uniform_from(&mut self.rng, &pool) {
                mod_.set_detective_shot(self.id, target);
            }
            return;
        }

        let excluded = known_mafia
            .iter()
            .copied()
            .chain(std::iter::once(self.id))
            .collect::<Vec<_>>();
        let target = uniform_alive_excluding(mod_, &mut self.rng, &excluded)
            .or_else(|| uniform_alive_excluding(mod_, &mut self.rng, &[self.id]));

        if let Some(target) = target {
            if let Some(team) = mod_.team(target) {
                if team == Team::Mafia {
                    known_mafia.insert(target);
                }
            }
        }
    }

    fn doctor_night(&mut self, mod_: &Moderator) {
        let RoleState::Doctor { previous_heal } = &mut self.state else {
            unreachable!("doctor state")
        };

        let excluded = previous_heal.into_iter().collect::<Vec<_>>();
        let target = uniform_alive_excluding(mod_, &mut self.rng, &excluded);

        match target {
            Some(target) => {
                mod_.set_doctor_heal(self.id, target);
                *previous_heal = Some(target);
            }
            None => {
                tracing::info!(player = self.id.0, "doctor has no valid heal target, skipping");
            }
        }
    }

    fn journalist_night(&mut self, mod_: &Moderator) {
        let candidates = mod_
            .alive_ids()
            .into_iter()
            .filter(|id| *id != self.id)
            .collect::<Vec<_>>();

        if candidates.len() < 2 {
            return;
        }

        let Some(a) = uniform_from(&mut self.rng, &candidates) else {
            return;
        };
        let remaining = candidates
            .into_iter()
            .filter(|id| *id != a)
            .collect::<Vec<_>>();
        let Some(b) = uniform_from(&mut self.rng, &remaining) else {
            return;
        };

        mod_.set_journalist_compare(self.id, a, b);
    }

    /// The Executioner's tie-breaking capability, invoked from the
    /// Moderator's day-lynch resolution in player-id order. `leaders` are
    /// the tied vote leaders; returns `None` to abstain.
    pub fn decide_execution(&mut self, mod_: &Moderator, leaders: &[PlayerId]) -> Option<PlayerId> {
        if let Some(human) = &mut self.human {
            let named = leaders
                .iter()
                .map(|id| (*id, mod_.name(*id).unwrap_or_else(|| Arc::from("?"))))
                .collect::<Vec<_>>();
            return human.prompt_execution(&named);
        }

        if self.rng.random_bool(0.5) {
            return None;
        }

        uniform_from(&mut self.rng, leaders)
    }
}

fn uniform_mafia_target<R: Rng>(mod_: &Moderator, rng: &mut R, self_id: PlayerId) -> Option<PlayerId> {
    let town_candidates = mod_
        .alive_ids()
        .into_iter()
        .filter(|id| *id != self_id && mod_.team(*id) == Some(Team::Town))
        .collect::<Vec<_>>();

    if let Some(target) = uniform_from(rng, &town_candidates) {
        return Some(target);
    }

    uniform_alive_excluding(mod_, rng, &[self_id])
}
