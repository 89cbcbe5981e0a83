//! Line-oriented journal events, one variant per thing the Moderator can
//! report during a round. Each event renders to exactly one line (or, for
//! [`JournalEvent::AliveRoster`], a header line followed by one line per
//! entry) of the round transcript described in the configuration contract.

use std::fmt::Display;
use std::sync::Arc;

use crate::PlayerId;
use crate::Role;
use crate::Team;

/// Cheaply clonable player display name.
pub type NameRef = Arc<str>;

/// Which night action marked a player for death.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum MarkSource {
    Mafia,
    Detective,
    Maniac,
}

impl Display for MarkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MarkSource::Mafia => "mafia",
            MarkSource::Detective => "detective",
            MarkSource::Maniac => "maniac",
        };
        f.write_str(s)
    }
}

/// One kind of night action an Eavesdropper can have observed against a target.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EavesdropObservation {
    Mafia(u32),
    DetectiveShot,
    DoctorHeal,
    Maniac,
}

impl Display for EavesdropObservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EavesdropObservation::Mafia(k) => write!(f, "mafia({k})"),
            EavesdropObservation::DetectiveShot => f.write_str("det-shot"),
            EavesdropObservation::DoctorHeal => f.write_str("doc-heal"),
            EavesdropObservation::Maniac => f.write_str("maniac"),
        }
    }
}

/// A player entry as listed in the day-start roster.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: NameRef,
    pub role: Role,
    pub team: Team,
}

/// One line (or, for [`JournalEvent::AliveRoster`], a block of lines) of a
/// round transcript.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum JournalEvent {
    RoundHeader {
        round: u32,
    },
    AliveRoster(Vec<RosterEntry>),
    DayVote {
        voter: PlayerId,
        voter_name: NameRef,
        target: PlayerId,
        target_name: NameRef,
    },
    DayLynch {
        victim: PlayerId,
        name: NameRef,
        role: Role,
    },
    DayNoLynch,
    DayTieNoLynch,
    DayExecutionerLynch {
        victim: PlayerId,
        name: NameRef,
        role: Role,
        executioner: PlayerId,
        executioner_name: NameRef,
    },
    DayTieRandomVictim {
        victim: PlayerId,
        name: NameRef,
        role: Role,
    },
    NightMafiaVote {
        voter: PlayerId,
        voter_name: NameRef,
        target: PlayerId,
        target_name: NameRef,
    },
    /// Empty vector renders as `NIGHT: mafia-tally none`.
    NightMafiaTally(Vec<(PlayerId, NameRef, u32)>),
    NightDetectiveShot {
        target: PlayerId,
        name: NameRef,
    },
    NightDoctorHeal {
        target: PlayerId,
        name: NameRef,
    },
    NightManiacTarget {
        target: PlayerId,
        name: NameRef,
    },
    NightJournalistCompare {
        journalist: PlayerId,
        journalist_name: NameRef,
        a: PlayerId,
        a_name: NameRef,
        b: PlayerId,
        b_name: NameRef,
    },
    NightMarkedBy {
        source: MarkSource,
        target: PlayerId,
        name: NameRef,
    },
    NightHealCancels {
        target: PlayerId,
        name: NameRef,
    },
    NightJournalistResult {
        journalist: PlayerId,
        journalist_name: NameRef,
        a: PlayerId,
        b: PlayerId,
        same: bool,
    },
    NightEavesdropperResult {
        target: PlayerId,
        target_name: NameRef,
        eavesdropper: PlayerId,
        eavesdropper_name: NameRef,
        observations: Vec<EavesdropObservation>,
    },
    NightDeath {
        victim: PlayerId,
        name: NameRef,
        role: Role,
    },
    RoundFooter {
        round: u32,
        night_completed: bool,
    },
}

impl Display for JournalEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JournalEvent::RoundHeader { round } => write!(f, "=== ROUND {round} (Day) ==="),
            JournalEvent::AliveRoster(entries) => {
                writeln!(f, "Alive at start of day:")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "  {} {} | role={} | team={}",
                        entry.id, entry.name, entry.role, entry.team
                    )?;
                }
                Ok(())
            }
            JournalEvent::DayVote {
                voter,
                voter_name,
                target,
                target_name,
            } => write!(f, "DAY: vote {voter} {voter_name} -> {target} {target_name}"),
            JournalEvent::DayLynch { victim, name, role } => {
                write!(f, "DAY: lynch victim {victim} {name} ({role})")
            }
            JournalEvent::DayNoLynch => f.write_str("DAY: no lynch"),
            JournalEvent::DayTieNoLynch => f.write_str("DAY: tie -> no lynch"),
            JournalEvent::DayExecutionerLynch {
                victim,
                name,
                role,
                executioner,
                executioner_name,
            } => write!(
                f,
                "DAY: executioner-lynch victim {victim} {name} ({role}) by {executioner} {executioner_name}"
            ),
            JournalEvent::DayTieRandomVictim { victim, name, role } => {
                write!(
                    f,
                    "DAY: tie -> victim chosen randomly {victim} {name} ({role})"
                )
            }
            JournalEvent::NightMafiaVote {
                voter,
                voter_name,
                target,
                target_name,
            } => write!(
                f,
                "NIGHT: mafia-vote {voter} {voter_name} -> {target} {target_name}"
            ),
            JournalEvent::NightMafiaTally(entries) => {
                if entries.is_empty() {
                    return f.write_str("NIGHT: mafia-tally none");
                }
                write!(f, "NIGHT: mafia-tally")?;
                for (id, name, count) in entries {
                    write!(f, " {id} {name}({count})")?;
                }
                Ok(())
            }
            JournalEvent::NightDetectiveShot { target, name } => {
                write!(f, "NIGHT: detective-shot -> {target} {name}")
            }
            JournalEvent::NightDoctorHeal { target, name } => {
                write!(f, "NIGHT: doctor-heal {target} {name}")
            }
            JournalEvent::NightManiacTarget { target, name } => {
                write!(f, "NIGHT: maniac-target -> {target} {name}")
            }
            JournalEvent::NightJournalistCompare {
                journalist,
                journalist_name,
                a,
                a_name,
                b,
                b_name,
            } => write!(
                f,
                "NIGHT: journalist-compare by {journalist} {journalist_name} -> {a} {a_name} vs {b} {b_name}"
            ),
            JournalEvent::NightMarkedBy {
                source,
                target,
                name,
            } => write!(f, "NIGHT: marked-by-{source} {target} {name}"),
            JournalEvent::NightHealCancels { target, name } => {
                write!(f, "NIGHT: heal-cancels {target} {name}")
            }
            JournalEvent::NightJournalistResult {
                journalist,
                journalist_name,
                a,
                b,
                same,
            } => write!(
                f,
                "NIGHT: journalist-result by {journalist} {journalist_name} -> {a} vs {b} : {}",
                if *same { "SAME" } else { "DIFFERENT" }
            ),
            JournalEvent::NightEavesdropperResult {
                target,
                target_name,
                eavesdropper,
                eavesdropper_name,
                observations,
            } => {
                write!(
                    f,
                    "NIGHT: eavesdropper-result for {target} {target_name} by {eavesdropper} {eavesdropper_name} -> "
                )?;
                if observations.is_empty() {
                    f.write_str("none")
                } else {
                    for (i, obs) in observations.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{obs}")?;
                    }
                    Ok(())
                }
            }
            JournalEvent::NightDeath { victim, name, role } => {
                write!(f, "NIGHT: death {victim} {name} ({role})")
            }
            JournalEvent::RoundFooter {
                round,
                night_completed,
            } => {
                if *night_completed {
                    write!(f, "=== ROUND {round} END (night completed) ===")
                } else {
                    write!(f, "=== ROUND {round} END (no night) ===")
                }
            }
        }
    }
}
