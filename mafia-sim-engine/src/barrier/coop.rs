//! Waiter-list rendezvous for the single-threaded cooperative backend.
//!
//! Unlike [`super::threaded::ThreadedBarrier`], this barrier never invokes
//! user code itself. Running the phase's completion step and resuming each
//! waiting task is left to the cooperative engine driver (`engine::coop`),
//! which owns the task table and drives everything from a plain loop rather
//! than recursive continuations. The alternative - storing a boxed
//! `on_complete` and a waiter list of continuations, invoked recursively
//! from inside `arrive` - has a real hazard here: these barrier objects are
//! reused every round, so by the time the recursive chain reaches the same
//! barrier again (next round's `day_start`), the outer call's borrow is
//! still on the stack. A driver-owned loop sidesteps that entirely.

/// N-party rendezvous for the cooperative scheduler. `arrive` never blocks:
/// it records `task_id` as arrived and, exactly on the `expected`-th
/// arrival of a cycle, returns the full arrival list in arrival order -
/// the driver's cue to run that phase's completion step and then resume
/// every task in the returned order. Any other call returns `None`: that
/// task suspends until a later `arrive` call returns a list containing it.
pub struct CoopBarrier {
    expected: usize,
    arrived: Vec<usize>,
}

impl CoopBarrier {
    pub fn new(expected: usize) -> Self {
        CoopBarrier {
            expected,
            arrived: Vec::with_capacity(expected),
        }
    }

    pub fn arrive(&mut self, task_id: usize) -> Option<Vec<usize>> {
        self.arrived.push(task_id);
        if self.arrived.len() == self.expected {
            Some(std::mem::replace(&mut self.arrived, Vec::with_capacity(self.expected)))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoopBarrier;

    #[test_log::test]
    fn returns_none_until_the_last_arrival() {
        let mut barrier = CoopBarrier::new(3);
        assert_eq!(barrier.arrive(0), None);
        assert_eq!(barrier.arrive(1), None);
        assert_eq!(barrier.arrive(2), Some(vec![0, 1, 2]));
    }

    #[test_log::test]
    fn resets_for_the_next_cycle() {
        let mut barrier = CoopBarrier::new(2);
        assert_eq!(barrier.arrive(0), None);
        assert_eq!(barrier.arrive(1), Some(vec![0, 1]));

        assert_eq!(barrier.arrive(5), None);
        assert_eq!(barrier.arrive(6), Some(vec![5, 6]));
    }
}
