//! Engine-wide constants.

/// Multiplier used to derive each agent's private RNG seed from the global
/// seed: `global_seed XOR (MIX * (index + 1))`.
pub const RNG_SEED_MIX: u64 = 0x9E3779B9;

/// Default player count when unset by config or CLI.
pub const DEFAULT_N_PLAYERS: usize = 9;

/// Default mafia-count divisor: `mafia = max(1, N / max(3, k_mafia_div))`.
pub const DEFAULT_K_MAFIA_DIV: usize = 3;

/// Default logs directory, relative to the working directory.
pub const DEFAULT_LOGS_DIR: &str = "logs";
