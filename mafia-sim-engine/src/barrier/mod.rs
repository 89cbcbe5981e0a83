//! A reusable N-party rendezvous, `PhaseBarrier`, with two implementations
//! sharing one contract: construct with `expected` parties; each arrival
//! blocks or suspends the caller; the `expected`-th arrival runs a
//! completion step exactly once, before any party is released, then resets
//! for the next cycle.
//!
//! [`threaded::ThreadedBarrier`] blocks real OS threads on a mutex/condvar.
//! [`coop::CoopBarrier`] never blocks a thread; it hands the cooperative
//! engine driver the full arrival list so the driver can run the phase's
//! completion step and resume tasks itself (see that module for why it
//! doesn't own the callback directly).

pub mod coop;
pub mod threaded;

pub use coop::CoopBarrier;
pub use threaded::ThreadedBarrier;
