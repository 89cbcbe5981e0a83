//! Mutex/condvar rendezvous for the thread-per-agent backend.

use std::sync::Condvar;
use std::sync::Mutex;

struct State {
    expected: usize,
    arrived: usize,
    generation: u64,
    on_complete: Option<Box<dyn FnMut() + Send>>,
}

/// A `(mutex, condvar, arrived, generation)` rendezvous for `expected`
/// parties. `arrive` blocks the calling thread until every party has
/// arrived this cycle; the last arriver runs `on_complete` while everyone
/// else is still parked, then all parties - including the last arriver -
/// are released together.
pub struct ThreadedBarrier {
    state: Mutex<State>,
    condvar: Condvar,
}

impl ThreadedBarrier {
    pub fn new(expected: usize, on_complete: Option<Box<dyn FnMut() + Send>>) -> Self {
        ThreadedBarrier {
            state: Mutex::new(State {
                expected,
                arrived: 0,
                generation: 0,
                on_complete,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Blocks until `expected` parties have called `arrive` this cycle.
    pub fn arrive(&self) {
        let mut state = self.state.lock().unwrap();
        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == state.expected {
            if let Some(on_complete) = state.on_complete.as_mut() {
                on_complete();
            }
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.condvar.notify_all();
        } else {
            while state.generation == generation {
                state = self.condvar.wait(state).unwrap();
            }
        }
    }

    /// Permanently removes one party from `expected`, used on shutdown so
    /// any thread still parked in `arrive` can be released. If every
    /// remaining party has already arrived this cycle, releases them
    /// immediately. `on_complete` still runs in that case: a barrier this
    /// engine relies on for phase resolution (the cooperative backend)
    /// should not skip it just because shutdown is in progress.
    pub fn arrive_and_drop(&self) {
        let mut state = self.state.lock().unwrap();
        if state.expected == 0 {
            return;
        }

        state.expected -= 1;
        if state.expected == 0 || state.arrived >= state.expected {
            if let Some(on_complete) = state.on_complete.as_mut() {
                on_complete();
            }
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.condvar.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::thread;

    use super::ThreadedBarrier;

    #[test_log::test]
    fn releases_all_parties_after_the_last_arrival() {
        let completions = Arc::new(AtomicUsize::new(0));
        let completions_cb = Arc::clone(&completions);
        let barrier = Arc::new(ThreadedBarrier::new(
            4,
            Some(Box::new(move || {
                completions_cb.fetch_add(1, Ordering::SeqCst);
            })),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || barrier.arrive())
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[test_log::test]
    fn reusable_across_multiple_cycles() {
        let completions = Arc::new(AtomicUsize::new(0));
        let completions_cb = Arc::clone(&completions);
        let barrier = Arc::new(ThreadedBarrier::new(
            2,
            Some(Box::new(move || {
                completions_cb.fetch_add(1, Ordering::SeqCst);
            })),
        ));

        for _ in 0..3 {
            let a = Arc::clone(&barrier);
            let b = Arc::clone(&barrier);
            let t1 = thread::spawn(move || a.arrive());
            let t2 = thread::spawn(move || b.arrive());
            t1.join().unwrap();
            t2.join().unwrap();
        }

        assert_eq!(completions.load(Ordering::SeqCst), 3);
    }

    #[test_log::test]
    fn arrive_and_drop_releases_remaining_parties() {
        let barrier = Arc::new(ThreadedBarrier::new(2, None));
        barrier.arrive_and_drop();

        let b = Arc::clone(&barrier);
        let handle = thread::spawn(move || b.arrive());
        handle.join().unwrap();
    }
}
