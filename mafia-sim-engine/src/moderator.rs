//! Single authority over world mutation: collects per-phase intents behind
//! a mutex, resolves them deterministically once a phase ends, and owns the
//! per-round journal and round/summary file output.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use bit_set::BitSet;
use mafia_sim_types::EavesdropObservation;
use mafia_sim_types::JournalEvent;
use mafia_sim_types::LogVerbosity;
use mafia_sim_types::MarkSource;
use mafia_sim_types::Phase;
use mafia_sim_types::PlayerId;
use mafia_sim_types::Role;
use mafia_sim_types::RosterEntry;
use mafia_sim_types::Team;
use mafia_sim_types::TiePolicy;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;

use crate::role::AgentHandle;
use crate::world::GameState;

#[derive(Clone, Debug)]
pub struct ModeratorConfig {
    pub tie_policy: TiePolicy,
    pub logs_dir: PathBuf,
    pub log_verbosity: LogVerbosity,
    /// Whether deaths are announced with role/team to the console as they
    /// happen. The round transcript always contains full information
    /// regardless of this flag; it only affects the live logging stream.
    pub open_announcements: bool,
}

struct Stats {
    votes_given: Vec<u32>,
    votes_received: Vec<u32>,
    mafia_votes_cast: Vec<u32>,
    detective_shots: Vec<u32>,
    doctor_heals: Vec<u32>,
    maniac_targets: Vec<u32>,
    died_round: Vec<Option<u32>>,
}

impl Stats {
    fn new(n: usize) -> Self {
        Stats {
            votes_given: vec![0; n],
            votes_received: vec![0; n],
            mafia_votes_cast: vec![0; n],
            detective_shots: vec![0; n],
            doctor_heals: vec![0; n],
            maniac_targets: vec![0; n],
            died_round: vec![None; n],
        }
    }
}

struct ModeratorState {
    game: GameState,
    day_votes: HashMap<PlayerId, Option<PlayerId>>,
    day_voted_flag: BitSet,
    mafia_tally: HashMap<PlayerId, u32>,
    detective_shot: Option<PlayerId>,
    doctor_heal: Option<PlayerId>,
    maniac_target: Option<PlayerId>,
    journalist_queries: Vec<(PlayerId, PlayerId, PlayerId)>,
    eavesdrop_requests: Vec<(PlayerId, PlayerId)>,
    journal: Vec<JournalEvent>,
    round_file_written: bool,
    stats: Stats,
    rng: StdRng,
}

impl ModeratorState {
    /// Idempotent: kills `id` and records its death round if this is the
    /// first time it has died.
    fn kill_and_record(&mut self, id: PlayerId) -> bool {
        let round = self.game.round();
        if self.game.kill(id) {
            if self.stats.died_round[id.0].is_none() {
                self.stats.died_round[id.0] = Some(round);
            }
            true
        } else {
            false
        }
    }
}

/// Arbiter for one match. All mutating operations lock an internal mutex,
/// matching the "single-threaded-in-effect" discipline of the concurrency
/// model: concurrent callers serialize, but the critical sections are short.
pub struct Moderator {
    inner: Mutex<ModeratorState>,
    config: ModeratorConfig,
    /// At most one entry in practice (0 or 1 Executioners per match),
    /// consulted in id-order by `resolve_day_lynch` on ties.
    executioners: Vec<(PlayerId, AgentHandle)>,
}

impl Moderator {
    pub fn new(
        game: GameState,
        executioners: Vec<(PlayerId, AgentHandle)>,
        config: ModeratorConfig,
        seed: u64,
    ) -> Self {
        let n = game.len();

        Moderator {
            inner: Mutex::new(ModeratorState {
                game,
                day_votes: HashMap::new(),
                day_voted_flag: BitSet::with_capacity(n),
                mafia_tally: HashMap::new(),
                detective_shot: None,
                doctor_heal: None,
                maniac_target: None,
                journalist_queries: Vec::new(),
                eavesdrop_requests: Vec::new(),
                journal: Vec::new(),
                round_file_written: false,
                stats: Stats::new(n),
                rng: StdRng::seed_from_u64(seed),
            }),
            config,
            executioners,
        }
    }

    // -- read-only queries -------------------------------------------------

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.inner.lock().unwrap().game.is_alive(id)
    }

    pub fn team(&self, id: PlayerId) -> Option<Team> {
        self.inner.lock().unwrap().game.team(id)
    }

    pub fn role(&self, id: PlayerId) -> Option<Role> {
        self.inner.lock().unwrap().game.role(id)
    }

    pub fn name(&self, id: PlayerId) -> Option<Arc<str>> {
        self.inner.lock().unwrap().game.name(id)
    }

    pub fn alive_ids(&self) -> Vec<PlayerId> {
        self.inner.lock().unwrap().game.alive_ids().collect()
    }

    pub fn alive_ids_with_role(&self, role: Role) -> Vec<PlayerId> {
        self.inner.lock().unwrap().game.alive_ids_with_role(role).collect()
    }

    /// Picks uniformly from `candidates` using the Moderator's own seeded
    /// RNG stream - the same one `resolve_day_lynch`/`resolve_night` draw
    /// their tie-breaks from. Any caller outside an agent's own RNG (e.g.
    /// the engine's day-vote sanitisation fallback) should go through this
    /// rather than a fresh thread-local RNG, so a run stays reproducible
    /// end to end for a fixed non-zero seed.
    pub fn choose_uniform(&self, candidates: &[PlayerId]) -> Option<PlayerId> {
        let mut st = self.inner.lock().unwrap();
        candidates.iter().copied().choose(&mut st.rng)
    }

    pub fn round(&self) -> u32 {
        self.inner.lock().unwrap().game.round()
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().unwrap().game.phase()
    }

    pub fn game_over(&self) -> bool {
        self.inner.lock().unwrap().game.game_over()
    }

    pub fn winner(&self) -> Option<Team> {
        self.inner.lock().unwrap().game.winner()
    }

    pub fn player_count(&self) -> usize {
        self.inner.lock().unwrap().game.len()
    }

    // -- intent submission ---------------------------------------------

    pub fn submit_day_vote(&self, voter: PlayerId, target: Option<PlayerId>) {
        let mut st = self.inner.lock().unwrap();
        if !st.game.is_alive(voter) {
            return;
        }
        if let Some(t) = target {
            if !st.game.in_range(t) || !st.game.is_alive(t) {
                return;
            }
        }

        if !st.day_voted_flag.contains(voter.0) {
            st.day_voted_flag.insert(voter.0);
            st.stats.votes_given[voter.0] += 1;
        }
        st.day_votes.insert(voter, target);

        if let Some(t) = target {
            let voter_name = st.game.name(voter).expect("alive voter has a name");
            let target_name = st.game.name(t).expect("alive target has a name");
            st.journal.push(JournalEvent::DayVote {
                voter,
                voter_name,
                target: t,
                target_name,
            });
        }
    }

    pub fn mafia_vote_target(&self, voter: PlayerId, target: PlayerId) {
        let mut st = self.inner.lock().unwrap();
        if st.game.role(voter) != Some(Role::Mafia) || !st.game.is_alive(voter) {
            return;
        }
        if !st.game.in_range(target) || !st.game.is_alive(target) {
            return;
        }

        *st.mafia_tally.entry(target).or_insert(0) += 1;
        st.stats.mafia_votes_cast[voter.0] += 1;

        let voter_name = st.game.name(voter).expect("valid");
        let target_name = st.game.name(target).expect("valid");
        st.journal.push(JournalEvent::NightMafiaVote {
            voter,
            voter_name,
            target,
            target_name,
        });
    }

    pub fn set_detective_shot(&self, voter: PlayerId, target: PlayerId) {
        let mut st = self.inner.lock().unwrap();
        if !st.game.is_alive(voter) {
            return;
        }
        if !st.game.in_range(target) || !st.game.is_alive(target) || target == voter {
            return;
        }

        st.detective_shot = Some(target);
        st.stats.detective_shots[voter.0] += 1;

        let name = st.game.name(target).expect("valid");
        st.journal
            .push(JournalEvent::NightDetectiveShot { target, name });
    }

    pub fn set_doctor_heal(&self, voter: PlayerId, target: PlayerId) {
        let mut st = self.inner.lock().unwrap();
        if !st.game.is_alive(voter) {
            return;
        }
        if !st.game.in_range(target) || !st.game.is_alive(target) {
            return;
        }

        st.doctor_heal = Some(target);
        st.stats.doctor_heals[voter.0] += 1;

        let name = st.game.name(target).expect("valid");
        st.journal
            .push(JournalEvent::NightDoctorHeal { target, name });
    }

    pub fn set_maniac_target(&self, voter: PlayerId, target: PlayerId) {
        let mut st = self.inner.lock().unwrap();
        if st.game.role(voter) != Some(Role::Maniac) || !st.game.is_alive(voter) {
            return;
        }
        if !st.game.in_range(target) || !st.game.is_alive(target) || target == voter {
            return;
        }

        st.maniac_target = Some(target);
        st.stats.maniac_targets[voter.0] += 1;

        let name = st.game.name(target).expect("valid");
        st.journal
            .push(JournalEvent::NightManiacTarget { target, name });
    }

    pub fn set_journalist_compare(&self, voter: PlayerId, a: PlayerId, b: PlayerId) {
        let mut st = self.inner.lock().unwrap();
        if !st.game.is_alive(voter) {
            return;
        }
        if !st.game.in_range(a) || !st.game.in_range(b) || !st.game.is_alive(a) || !st.game.is_alive(b)
        {
            return;
        }
        if a == voter || b == voter || a == b {
            return;
        }

        st.journalist_queries.push((voter, a, b));

        let journalist_name = st.game.name(voter).expect("valid");
        let a_name = st.game.name(a).expect("valid");
        let b_name = st.game.name(b).expect("valid");
        st.journal.push(JournalEvent::NightJournalistCompare {
            journalist: voter,
            journalist_name,
            a,
            a_name,
            b,
            b_name,
        });
    }

    pub fn set_eavesdropper_target(&self, voter: PlayerId, target: PlayerId) {
        let mut st = self.inner.lock().unwrap();
        if !st.game.is_alive(voter) {
            return;
        }
        if !st.game.in_range(target) || !st.game.is_alive(target) || target == voter {
            return;
        }

        st.eavesdrop_requests.push((voter, target));
    }

    // -- lifecycle / resolution -------------------------------------------

    /// Opens a new day: resets the day vote buffers and writes the
    /// round-start header and roster into the journal.
    pub fn begin_day(&self) {
        let mut st = self.inner.lock().unwrap();
        st.game.set_phase(Phase::Day);
        st.day_votes.clear();
        st.day_voted_flag.clear();
        st.round_file_written = false;
        // Each round file holds only that round's events; the previous
        // round's transcript has already been flushed to disk by now.
        st.journal.clear();

        let round = st.game.round();
        st.journal.push(JournalEvent::RoundHeader { round });

        let roster = st
            .game
            .alive_ids()
            .map(|id| RosterEntry {
                id,
                name: st.game.name(id).expect("alive id has a name"),
                role: st.game.role(id).expect("alive id has a role"),
                team: st.game.team(id).expect("alive id has a team"),
            })
            .collect();
        st.journal.push(JournalEvent::AliveRoster(roster));
    }

    /// Resolves the day vote: lynches the plurality leader, breaking ties
    /// per [`ModeratorConfig::tie_policy`]. Returns the victim, if any.
    pub fn resolve_day_lynch(&self) -> Option<PlayerId> {
        let votes_snapshot = self.inner.lock().unwrap().day_votes.clone();

        let mut tally: HashMap<PlayerId, u32> = HashMap::new();
        {
            let st = self.inner.lock().unwrap();
            for (voter, target) in &votes_snapshot {
                if !st.game.is_alive(*voter) {
                    continue;
                }
                if let Some(t) = target {
                    if st.game.is_alive(*t) {
                        *tally.entry(*t).or_insert(0) += 1;
                    }
                }
            }
        }

        let max_votes = tally.values().copied().max().unwrap_or(0);

        if max_votes == 0 {
            self.inner.lock().unwrap().journal.push(JournalEvent::DayNoLynch);
            return None;
        }

        {
            let mut st = self.inner.lock().unwrap();
            for (&target, &count) in &tally {
                st.stats.votes_received[target.0] += count;
            }
        }

        let mut leaders: Vec<PlayerId> = tally
            .iter()
            .filter(|&(_, &count)| count == max_votes)
            .map(|(&id, _)| id)
            .collect();
        leaders.sort();

        let decision: Option<(PlayerId, Option<PlayerId>)> = if leaders.len() == 1 {
            Some((leaders[0], None))
        } else if self.config.tie_policy == TiePolicy::Random {
            let mut st = self.inner.lock().unwrap();
            leaders.iter().copied().choose(&mut st.rng).map(|v| (v, None))
        } else {
            self.ask_executioners(&leaders)
        };

        let Some((victim, executioner)) = decision else {
            self.inner.lock().unwrap().journal.push(JournalEvent::DayTieNoLynch);
            return None;
        };

        let mut st = self.inner.lock().unwrap();
        let name = st.game.name(victim).expect("valid");
        let role = st.game.role(victim).expect("valid");

        let event = match executioner {
            Some(exec_id) => {
                let executioner_name = st.game.name(exec_id).expect("valid");
                JournalEvent::DayExecutionerLynch {
                    victim,
                    name,
                    role,
                    executioner: exec_id,
                    executioner_name,
                }
            }
            None if leaders.len() > 1 => JournalEvent::DayTieRandomVictim { victim, name, role },
            None => JournalEvent::DayLynch { victim, name, role },
        };
        st.journal.push(event);
        st.kill_and_record(victim);

        Some(victim)
    }

    /// Asks each alive Executioner, in id order, to pick a victim among the
    /// tied `leaders`. Returns the first valid pick, tagged with which
    /// Executioner made it.
    fn ask_executioners(&self, leaders: &[PlayerId]) -> Option<(PlayerId, Option<PlayerId>)> {
        let mut exec_ids: Vec<PlayerId> = self.executioners.iter().map(|(id, _)| *id).collect();
        exec_ids.sort();

        for exec_id in exec_ids {
            if !self.is_alive(exec_id) {
                continue;
            }

            let handle = self
                .executioners
                .iter()
                .find(|(id, _)| *id == exec_id)
                .map(|(_, h)| Arc::clone(h))
                .expect("executioner handle registered");

            let pick = {
                let mut agent = handle.lock().unwrap();
                agent.decide_execution(self, leaders)
            };

            if let Some(pick) = pick {
                if leaders.contains(&pick) {
                    return Some((pick, Some(exec_id)));
                }
            }
        }

        None
    }

    /// Resolves all night intents into a kill set, applies heal
    /// cancellation, records Journalist/Eavesdropper results, and kills
    /// everyone left in the kill set. Returns the ids that died.
    pub fn resolve_night(&self) -> Vec<PlayerId> {
        let (mafia_tally, detective_shot, doctor_heal, maniac_target, journalist_queries, eavesdrop_requests) = {
            let mut st = self.inner.lock().unwrap();
            let snapshot = (
                st.mafia_tally.clone(),
                st.detective_shot,
                st.doctor_heal,
                st.maniac_target,
                st.journalist_queries.clone(),
                st.eavesdrop_requests.clone(),
            );
            st.mafia_tally.clear();
            st.detective_shot = None;
            st.doctor_heal = None;
            st.maniac_target = None;
            st.journalist_queries.clear();
            st.eavesdrop_requests.clear();
            snapshot
        };

        let m = mafia_tally.values().copied().max().unwrap_or(0);
        let mafia_target = if m > 0 {
            let mut st = self.inner.lock().unwrap();
            let candidates: Vec<PlayerId> = mafia_tally
                .iter()
                .filter(|&(&id, &count)| count == m && st.game.is_alive(id))
                .map(|(&id, _)| id)
                .collect();
            candidates.iter().copied().choose(&mut st.rng)
        } else {
            None
        };

        {
            let mut st = self.inner.lock().unwrap();
            let mut entries: Vec<(PlayerId, mafia_sim_types::NameRef, u32)> = mafia_tally
                .iter()
                .map(|(&id, &count)| (id, st.game.name(id).unwrap_or_else(|| Arc::from("?")), count))
                .collect();
            entries.sort_by_key(|(id, _, _)| *id);
            st.journal.push(JournalEvent::NightMafiaTally(entries));
        }

        let mut kill_set: HashSet<PlayerId> = HashSet::new();
        {
            let mut st = self.inner.lock().unwrap();
            if let Some(target) = mafia_target {
                kill_set.insert(target);
                let name = st.game.name(target).expect("valid");
                st.journal.push(JournalEvent::NightMarkedBy {
                    source: MarkSource::Mafia,
                    target,
                    name,
                });
            }
            if let Some(target) = detective_shot {
                if st.game.is_alive(target) {
                    kill_set.insert(target);
                    let name = st.game.name(target).expect("valid");
                    st.journal.push(JournalEvent::NightMarkedBy {
                        source: MarkSource::Detective,
                        target,
                        name,
                    });
                }
            }
            if let Some(target) = maniac_target {
                if st.game.is_alive(target) {
                    kill_set.insert(target);
                    let name = st.game.name(target).expect("valid");
                    st.journal.push(JournalEvent::NightMarkedBy {
                        source: MarkSource::Maniac,
                        target,
                        name,
                    });
                }
            }
        }

        if let Some(h) = doctor_heal {
            let mut st = self.inner.lock().unwrap();
            if st.game.is_alive(h) {
                kill_set.remove(&h);
                let name = st.game.name(h).expect("valid");
                st.journal.push(JournalEvent::NightHealCancels { target: h, name });
            }
        }

        {
            let mut st = self.inner.lock().unwrap();
            for (jid, a, b) in &journalist_queries {
                let (Some(team_a), Some(team_b)) = (st.game.team(*a), st.game.team(*b)) else {
                    continue;
                };
                let journalist_name = st.game.name(*jid).expect("valid");
                st.journal.push(JournalEvent::NightJournalistResult {
                    journalist: *jid,
                    journalist_name,
                    a: *a,
                    b: *b,
                    same: team_a == team_b,
                });
            }
        }

        {
            let mut st = self.inner.lock().unwrap();
            for (eid, target) in &eavesdrop_requests {
                let mut observations = Vec::new();
                if let Some(&count) = mafia_tally.get(target) {
                    if count > 0 {
                        observations.push(EavesdropObservation::Mafia(count));
                    }
                }
                if detective_shot == Some(*target) {
                    observations.push(EavesdropObservation::DetectiveShot);
                }
                if doctor_heal == Some(*target) {
                    observations.push(EavesdropObservation::DoctorHeal);
                }
                if maniac_target == Some(*target) {
                    observations.push(EavesdropObservation::Maniac);
                }

                let target_name = st.game.name(*target).unwrap_or_else(|| Arc::from("?"));
                let eavesdropper_name = st.game.name(*eid).expect("valid");
                st.journal.push(JournalEvent::NightEavesdropperResult {
                    target: *target,
                    target_name,
                    eavesdropper: *eid,
                    eavesdropper_name,
                    observations,
                });
            }
        }

        let mut dead_ids: Vec<PlayerId> = kill_set.into_iter().collect();
        dead_ids.sort();

        let mut applied = Vec::new();
        {
            let mut st = self.inner.lock().unwrap();
            for id in dead_ids {
                if st.game.is_alive(id) {
                    let name = st.game.name(id).expect("valid");
                    let role = st.game.role(id).expect("valid");
                    st.journal.push(JournalEvent::NightDeath { victim: id, name, role });
                    st.kill_and_record(id);
                    applied.push(id);
                }
            }
        }

        self.write_round_file(true);

        applied
    }

    /// Counts surviving teams and returns the winner, if the match is over.
    pub fn evaluate_winner(&self) -> Option<Team> {
        let st = self.inner.lock().unwrap();

        let alive_mafia = st.game.alive_count_team(Team::Mafia);
        let alive_maniac = st.game.alive_count_team(Team::Maniac);
        let alive_town = st.game.alive_count_team(Team::Town);

        if alive_mafia == 0 && alive_maniac == 0 {
            Some(Team::Town)
        } else if alive_mafia == 0 && alive_maniac == 1 && alive_town == 1 {
            Some(Team::Maniac)
        } else if alive_mafia > 0 && alive_mafia >= alive_town + alive_maniac {
            Some(Team::Mafia)
        } else {
            None
        }
    }

    /// Records the winner on the world state. Idempotent past the first call.
    pub fn finish(&self, winner: Team) {
        let mut st = self.inner.lock().unwrap();
        if !st.game.game_over() {
            st.game.finish(winner);
        }
    }

    /// Idempotent public kill, usable outside the resolution pipeline (e.g.
    /// admin tooling or tests).
    pub fn kill_player(&self, id: PlayerId) -> bool {
        self.inner.lock().unwrap().kill_and_record(id)
    }

    pub fn advance_round(&self) {
        self.inner.lock().unwrap().game.advance_round();
    }

    pub fn set_phase(&self, phase: Phase) {
        self.inner.lock().unwrap().game.set_phase(phase);
    }

    fn write_round_file(&self, night_completed: bool) {
        let mut st = self.inner.lock().unwrap();
        if st.round_file_written {
            return;
        }

        let round = st.game.round();
        st.journal.push(JournalEvent::RoundFooter { round, night_completed });

        let mut buf = String::from('\u{FEFF}');
        for event in &st.journal {
            buf.push_str(&event.to_string());
            buf.push('\n');
        }

        if let Err(err) = std::fs::create_dir_all(&self.config.logs_dir) {
            tracing::error!(error = %err, dir = %self.config.logs_dir.display(), "failed to create logs dir");
        } else {
            let path = self.config.logs_dir.join(format!("round_{round}.txt"));
            if let Err(source) = std::fs::write(&path, buf.as_bytes()) {
                let err = crate::error::MafiaSimError::RoundFileWriteFailed { round, source };
                tracing::error!(%err, "round file write failed");
            }
        }

        // Mark written regardless of success, per the "no retry loops" I/O
        // failure policy.
        st.round_file_written = true;
    }

    /// Flushes a round file for a round that ended during Day (no Night
    /// occurred), called once at game-over finalisation.
    pub fn finalize_round_file_if_pending(&self) {
        let pending = !self.inner.lock().unwrap().round_file_written;
        if pending {
            self.write_round_file(false);
        }
    }

    pub fn write_summary_file(&self) {
        let st = self.inner.lock().unwrap();

        let winner_str = match st.game.winner() {
            Some(Team::Town) => "Town",
            Some(Team::Mafia) => "Mafia",
            Some(Team::Maniac) => "Maniac",
            None => "None",
        };

        let mut buf = String::from('\u{FEFF}');
        buf.push_str(&format!("Winner: {winner_str}\n"));
        buf.push_str(&format!(
            "{:<4}{:<16}{:<12}{:<8}{:<8}{:<11}{:<11}{:<10}{:<11}{:<9}{:<9}{:<13}\n",
            "#",
            "Name",
            "Role",
            "Team",
            "Status",
            "Died@Round",
            "VotesGiven",
            "VotesRecv",
            "MafiaVotes",
            "DetShots",
            "DocHeals",
            "ManiacTargets"
        ));

        for player in st.game.players() {
            let status = if player.alive() { "Alive" } else { "Dead" };
            let died = st.stats.died_round[player.id.0]
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());

            buf.push_str(&format!(
                "{:<4}{:<16}{:<12}{:<8}{:<8}{:<11}{:<11}{:<10}{:<11}{:<9}{:<9}{:<13}\n",
                player.id.to_string(),
                player.display_name,
                player.role.to_string(),
                player.team.to_string(),
                status,
                died,
                st.stats.votes_given[player.id.0],
                st.stats.votes_received[player.id.0],
                st.stats.mafia_votes_cast[player.id.0],
                st.stats.detective_shots[player.id.0],
                st.stats.doctor_heals[player.id.0],
                st.stats.maniac_targets[player.id.0],
            ));
        }

        if let Err(err) = std::fs::create_dir_all(&self.config.logs_dir) {
            tracing::error!(error = %err, "failed to create logs dir");
            return;
        }

        let path = self.config.logs_dir.join("summary.txt");
        if let Err(source) = std::fs::write(&path, buf.as_bytes()) {
            let err = crate::error::MafiaSimError::SummaryFileWriteFailed { source };
            tracing::error!(%err, "summary file write failed");
        }
    }
}
