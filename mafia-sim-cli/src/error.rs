use thiserror::Error;

/// Errors that can stop the CLI before a match starts. Propagation policy
/// (§7): only setup exceptions propagate to `main`; everything at or below
/// the engine's intent/file-I/O layer is logged and swallowed there.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("config file '{path}' could not be read: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Engine(#[from] mafia_sim_engine::MafiaSimError),
}
