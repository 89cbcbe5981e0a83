//! Data types shared by the Mafia simulator's engine and its CLI front-end.

use std::fmt::Display;

mod journal;

pub use journal::EavesdropObservation;
pub use journal::JournalEvent;
pub use journal::MarkSource;
pub use journal::NameRef;
pub use journal::RosterEntry;

/// Dense, non-negative index of a player, in `[0, N)`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PlayerId(pub usize);

impl Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0 + 1)
    }
}

/// Which side a player is on.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Team {
    Town,
    Mafia,
    Maniac,
}

impl Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Team::Town => "town",
            Team::Mafia => "mafia",
            Team::Maniac => "maniac",
        };
        f.write_str(s)
    }
}

/// A player's role. Team assignment is fixed per role.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Role {
    Citizen,
    Mafia,
    Detective,
    Doctor,
    Maniac,
    Executioner,
    Journalist,
    Eavesdropper,
}

impl Role {
    pub fn team(self) -> Team {
        match self {
            Role::Citizen | Role::Detective | Role::Doctor | Role::Executioner => Team::Town,
            Role::Journalist | Role::Eavesdropper => Team::Town,
            Role::Mafia => Team::Mafia,
            Role::Maniac => Team::Maniac,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Citizen => "citizen",
            Role::Mafia => "mafia",
            Role::Detective => "detective",
            Role::Doctor => "doctor",
            Role::Maniac => "maniac",
            Role::Executioner => "executioner",
            Role::Journalist => "journalist",
            Role::Eavesdropper => "eavesdropper",
        };
        f.write_str(s)
    }
}

/// The current half of a round.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Phase {
    Day,
    Night,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Phase::Day => Phase::Night,
            Phase::Night => Phase::Day,
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Day => "Day",
            Phase::Night => "Night",
        };
        f.write_str(s)
    }
}

/// Rule for breaking a multi-leader day vote.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TiePolicy {
    /// Defer to an alive Executioner; if none decides, there is no lynch.
    Executioner,
    /// Pick uniformly among the tied leaders.
    Random,
}

/// Which concurrency discipline drives the round loop.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Backend {
    Threaded,
    Coroutine,
}

/// Verbosity of the logging sink / round transcript.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LogVerbosity {
    Short,
    Full,
}
