//! Command-line surface. Every flag here mirrors a config-file key of the
//! same name (§6); a flag present on the command line overrides whatever
//! the config file set.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "mafia-sim", about = "Discrete-turn Mafia match simulator")]
pub struct Cli {
    /// Player count.
    #[arg(long = "n")]
    pub n_players: Option<usize>,

    /// RNG seed; 0 (or unset) draws one from OS entropy.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Seat one interactive human player. Accepts an optional explicit
    /// bool so `--human` and `--human false` both work.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub human: Option<String>,

    /// Round/summary transcript verbosity.
    #[arg(long, value_parser = ["short", "full"])]
    pub log: Option<String>,

    /// Announce deaths with role/team on the live logging stream.
    #[arg(long)]
    pub open: bool,

    /// Directory round/summary files are written under.
    #[arg(long = "logs-dir")]
    pub logs_dir: Option<PathBuf>,

    /// Day-vote tie-break rule.
    #[arg(long, value_parser = ["none", "random"])]
    pub tie: Option<String>,

    /// Mafia-count divisor: `mafia = max(1, n / max(3, k_mafia_div))`.
    #[arg(long = "k-mafia-div")]
    pub k_mafia_div: Option<usize>,

    /// Seat an Executioner (0 or 1).
    #[arg(long = "exec", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub executioner_count: Option<u8>,

    /// Seat a Journalist (0 or 1).
    #[arg(long = "journ", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub journalist_count: Option<u8>,

    /// Seat an Eavesdropper (0 or 1).
    #[arg(long = "ears", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub eavesdropper_count: Option<u8>,

    /// Path to the flat key/value config file (named for the original
    /// implementation's config format; the file itself is not YAML).
    #[arg(long)]
    pub yaml: Option<PathBuf>,

    /// Run on the cooperative (single-threaded) backend instead of the
    /// default thread-per-agent one. Downgraded to threaded if `--human`
    /// is also set.
    #[arg(long)]
    pub coro: bool,
}
