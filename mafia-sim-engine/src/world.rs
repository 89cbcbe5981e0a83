//! World state: the arena of player records the Moderator owns exclusively.

use std::sync::Arc;

use mafia_sim_types::PlayerId;
use mafia_sim_types::Role;
use mafia_sim_types::Team;

/// Public, world-visible facts about one player. Role-private mutable state
/// (e.g. a Detective's confirmed-mafia list) is owned by that player's
/// [`crate::role::Agent`] instead, not here.
#[derive(Clone, Debug)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub display_name: Arc<str>,
    pub role: Role,
    pub team: Team,
    alive: bool,
}

impl PlayerRecord {
    pub fn alive(&self) -> bool {
        self.alive
    }
}

/// The arena of players plus round/phase/outcome bookkeeping. Entries are
/// never relocated: a dead player keeps its index with `alive = false`.
pub struct GameState {
    players: Vec<PlayerRecord>,
    round: u32,
    phase: mafia_sim_types::Phase,
    game_over: bool,
    winner: Option<Team>,
}

impl GameState {
    pub fn new(
        names: Vec<Arc<str>>,
        roles: Vec<Role>,
        start_phase: mafia_sim_types::Phase,
    ) -> Self {
        assert_eq!(names.len(), roles.len());

        let players = names
            .into_iter()
            .zip(roles)
            .enumerate()
            .map(|(idx, (display_name, role))| PlayerRecord {
                id: PlayerId(idx),
                display_name,
                role,
                team: role.team(),
                alive: true,
            })
            .collect();

        GameState {
            players,
            round: 1,
            phase: start_phase,
            game_over: false,
            winner: None,
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(id.0)
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn in_range(&self, id: PlayerId) -> bool {
        id.0 < self.players.len()
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(PlayerRecord::alive)
    }

    pub fn role(&self, id: PlayerId) -> Option<Role> {
        self.player(id).map(|p| p.role)
    }

    pub fn team(&self, id: PlayerId) -> Option<Team> {
        self.player(id).map(|p| p.team)
    }

    pub fn name(&self, id: PlayerId) -> Option<Arc<str>> {
        self.player(id).map(|p| Arc::clone(&p.display_name))
    }

    pub fn alive_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players
            .iter()
            .filter(|p| p.alive)
            .map(|p| p.id)
    }

    pub fn alive_ids_with_role(&self, role: Role) -> impl Iterator<Item = PlayerId> + '_ {
        self.players
            .iter()
            .filter(move |p| p.alive && p.role == role)
            .map(|p| p.id)
    }

    pub fn alive_count_team(&self, team: Team) -> usize {
        self.players
            .iter()
            .filter(|p| p.alive && p.team == team)
            .count()
    }

    /// Idempotent: returns `true` if this call is what killed the player.
    pub fn kill(&mut self, id: PlayerId) -> bool {
        match self.players.get_mut(id.0) {
            Some(p) if p.alive => {
                p.alive = false;
                true
            }
            _ => false,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> mafia_sim_types::Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: mafia_sim_types::Phase) {
        self.phase = phase;
    }

    pub fn advance_round(&mut self) {
        self.round += 1;
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    pub fn finish(&mut self, winner: Team) {
        self.game_over = true;
        self.winner = Some(winner);
    }
}
