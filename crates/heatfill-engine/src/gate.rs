//! Ordered release gates for sequential merges of parallel work.
//!
//! [`chain`] builds `n` gates linked by one-slot channels and moves the
//! accumulator into the first one. Gate `i` blocks until gate `i − 1` has
//! handed the accumulator on, lets its owner mutate it, then passes it to
//! gate `i + 1`. Only the current holder can touch the accumulator, so
//! merges happen exactly in gate order no matter which worker finishes
//! its computation first.
//!
//! A gate dropped without passing (including by a panicking merge)
//! disconnects the chain: every later gate and the [`Tail`] observe
//! [`GateError::Broken`].

use std::error::Error;
use std::fmt;

use crossbeam_channel::{Receiver, Sender};

/// The chain was interrupted before the accumulator reached a gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateError {
    /// The accumulator never arrived; gate `index` (or the tail, with
    /// `index == len`) has no live predecessor.
    Broken {
        /// Position of the gate that observed the break.
        index: usize,
    },
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broken { index } => {
                write!(f, "merge chain broken before gate {index}")
            }
        }
    }
}

impl Error for GateError {}

/// One position in the merge order.
#[derive(Debug)]
pub struct Gate<T> {
    index: usize,
    inbox: Receiver<T>,
    outbox: Sender<T>,
}

impl<T> Gate<T> {
    /// Position of this gate in the chain.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Wait for the accumulator, apply `merge`, and release the next gate.
    pub fn pass<F: FnOnce(&mut T)>(self, merge: F) -> Result<(), GateError> {
        let mut acc = self
            .inbox
            .recv()
            .map_err(|_| GateError::Broken { index: self.index })?;
        merge(&mut acc);
        // A missing successor means the chain is being torn down; the
        // tail reports it.
        let _ = self.outbox.send(acc);
        Ok(())
    }
}

/// End of the chain; yields the accumulator after the last gate.
#[derive(Debug)]
pub struct Tail<T> {
    index: usize,
    inbox: Receiver<T>,
}

impl<T> Tail<T> {
    /// Wait for every gate to pass and take the accumulator.
    pub fn finish(self) -> Result<T, GateError> {
        self.inbox
            .recv()
            .map_err(|_| GateError::Broken { index: self.index })
    }
}

/// Build `len` gates in order, with gate 0 already released.
pub fn chain<T>(initial: T, len: usize) -> (Vec<Gate<T>>, Tail<T>) {
    let (first_tx, mut inbox) = crossbeam_channel::bounded(1);
    // The receiver is alive in this scope and the slot is empty.
    let _ = first_tx.send(initial);
    let mut gates = Vec::with_capacity(len);
    for index in 0..len {
        let (outbox, next_inbox) = crossbeam_channel::bounded(1);
        gates.push(Gate {
            index,
            inbox,
            outbox,
        });
        inbox = next_inbox;
    }
    (gates, Tail { index: len, inbox })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn empty_chain_returns_initial() {
        let (gates, tail) = chain(5, 0);
        assert!(gates.is_empty());
        assert_eq!(tail.finish(), Ok(5));
    }

    #[test]
    fn merges_follow_gate_order_under_reversed_completion() {
        let n = 8;
        let (gates, tail) = chain(Vec::new(), n);
        let handles: Vec<_> = gates
            .into_iter()
            .map(|gate| {
                thread::spawn(move || {
                    // Later gates finish their "work" first.
                    let i = gate.index();
                    thread::sleep(Duration::from_millis(((n - i) * 3) as u64));
                    gate.pass(|acc: &mut Vec<usize>| acc.push(i))
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }
        assert_eq!(tail.finish().unwrap(), (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn dropped_gate_breaks_the_rest_of_the_chain() {
        let (mut gates, tail) = chain(0u32, 3);
        let g2 = gates.pop().unwrap();
        let g1 = gates.pop().unwrap();
        let g0 = gates.pop().unwrap();
        g0.pass(|acc| *acc += 1).unwrap();
        drop(g1);
        assert_eq!(g2.pass(|acc| *acc += 1), Err(GateError::Broken { index: 2 }));
        assert_eq!(tail.finish(), Err(GateError::Broken { index: 3 }));
    }

    #[test]
    fn panicking_merge_breaks_the_chain() {
        let (mut gates, tail) = chain(0u32, 2);
        let g1 = gates.pop().unwrap();
        let g0 = gates.pop().unwrap();
        let crashed = thread::spawn(move || g0.pass(|_| panic!("merge failed"))).join();
        assert!(crashed.is_err());
        assert_eq!(g1.pass(|acc| *acc += 1), Err(GateError::Broken { index: 1 }));
        assert!(tail.finish().is_err());
    }
}
