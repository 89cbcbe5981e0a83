use thiserror::Error;

/// Errors the engine can report. Per spec.md §7, only setup failures
/// (`NotEnoughPlayers`, `TooManyRoles`) ever propagate to a caller as
/// `Err`; `RoundFileWriteFailed`/`SummaryFileWriteFailed` are constructed
/// only to be logged and swallowed inside the Moderator, matching the "file
/// I/O failure: logged as error, match continues" policy. Intent-level
/// errors (out-of-range id, dead voter/target, self-target violations)
/// have no variant here at all - they are dropped silently inside the
/// Moderator's submission methods, per spec.md §7's "advisory and
/// tolerant" intent protocol.
#[derive(Error, Debug)]
pub enum MafiaSimError {
    #[error("not enough players: {0}")]
    NotEnoughPlayers(String),
    #[error("role counts exceed player count: {0}")]
    TooManyRoles(String),
    #[error("failed to write round file for round {round}: {source}")]
    RoundFileWriteFailed {
        round: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write summary file: {source}")]
    SummaryFileWriteFailed {
        #[source]
        source: std::io::Error,
    },
}
