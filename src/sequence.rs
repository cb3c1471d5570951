//! Atomic sequence counters with cache line padding to prevent false sharing.
//!
//! # Cache Line Padding and False Sharing
//!
//! ## The Problem
//! Modern CPU architectures manage memory in cache lines (typically 64 bytes). When multiple
//! threads operate on variables that live in the same cache line but on different cores:
//!
//! 1. Any modification to a variable invalidates the entire cache line
//! 2. All cores must refresh their cache line copy, even if they only use unmodified variables
//! 3. This "false sharing" creates unnecessary cache coherence traffic
//!
//! ## The Solution
//! The `AtomicSequence` keeps its counter on a cache line of its own:
//! 1. Padding bytes on both sides of the counter
//! 2. 64-byte alignment through `#[repr(C, align(64))]`
//!
//! Every consumer polls the producer cursor on its hot path, and the producer polls every
//! consumer sequence when it runs out of cached capacity, so these values must never share
//! a line with unrelated bookkeeping.
//!
//! # Memory Ordering
//! Four ordering levels are exposed and deliberately kept apart:
//!
//! | operation                | ordering  |
//! |--------------------------|-----------|
//! | [`AtomicSequence::get`]  | `Acquire` |
//! | [`AtomicSequence::set`]  | `Release` |
//! | [`AtomicSequence::set_volatile`] | `SeqCst` store |
//! | [`AtomicSequence::compare_and_set`] | `SeqCst` CAS |

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use static_assertions::const_assert;

/// A position in the unbounded index space that maps onto the ring via modulo.
pub type Sequence = i64;

/// Value of a sequence before anything has been produced or consumed.
pub const INITIAL_VALUE: Sequence = -1;

/// Size of a cache line on most modern CPUs (in bytes)
const CACHE_LINE_SIZE: usize = 64;
/// Padding bytes placed on each side of the atomic value
const CACHE_LINE_PADDING: usize = CACHE_LINE_SIZE - std::mem::size_of::<AtomicI64>();

/// An atomic sequence counter isolated on its own cache line.
///
/// # Memory Layout
/// ```text
/// |--------------------------------------------|--------------------------------|
/// | Padding (56 bytes)   | AtomicI64 (8 bytes) | Padding (56 bytes) | align fill |
/// |--------------------------------------------|--------------------------------|
/// ^                                            ^
/// Cache line start                      Cache line end
/// ```
///
/// The first line holds nothing but left padding and the value; the right padding fills the
/// following line so no neighbouring allocation can land next to the value.
#[repr(C, align(64))]
pub struct AtomicSequence {
    _lhs_padding: [u8; CACHE_LINE_PADDING],
    value: AtomicI64,
    _rhs_padding: [u8; CACHE_LINE_PADDING],
}

const_assert!(std::mem::align_of::<AtomicSequence>() == CACHE_LINE_SIZE);
const_assert!(std::mem::size_of::<AtomicSequence>() == 2 * CACHE_LINE_SIZE);

impl AtomicSequence {
    /// Create a new sequence with an initial value.
    pub fn new(initial_value: Sequence) -> Self {
        AtomicSequence {
            _lhs_padding: [0u8; CACHE_LINE_PADDING],
            value: AtomicI64::new(initial_value),
            _rhs_padding: [0u8; CACHE_LINE_PADDING],
        }
    }

    /// Current value, with acquire visibility.
    #[inline]
    pub fn get(&self) -> Sequence {
        self.value.load(Ordering::Acquire)
    }

    /// Ordered store. Writes made before this call are visible to any thread that observes
    /// the new value through [`get`](Self::get).
    #[inline]
    pub fn set(&self, new_value: Sequence) {
        self.value.store(new_value, Ordering::Release);
    }

    /// Fully fenced store, for initialisation and reset paths.
    #[inline]
    pub fn set_volatile(&self, new_value: Sequence) {
        self.value.store(new_value, Ordering::SeqCst);
    }

    /// Atomically replace `expected` with `new_value`. Returns `false` and leaves the value
    /// untouched if the current value is not `expected`.
    #[inline]
    pub fn compare_and_set(&self, expected: Sequence, new_value: Sequence) -> bool {
        self.value
            .compare_exchange(expected, new_value, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    // Increment the sequence by 1 and return the new value.
    pub fn increment_and_get(&self) -> Sequence {
        self.add_and_get(1)
    }

    /// Add `increment` and return the value that was installed.
    ///
    /// Retries the CAS until it wins; contention on a single sequence is expected to be rare.
    pub fn add_and_get(&self, increment: i64) -> Sequence {
        loop {
            let current = self.get();
            let new_value = current + increment;
            if self.compare_and_set(current, new_value) {
                return new_value;
            }
        }
    }
}

impl Default for AtomicSequence {
    fn default() -> Self {
        Self::new(INITIAL_VALUE)
    }
}

impl From<i64> for AtomicSequence {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl PartialEq for AtomicSequence {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl fmt::Debug for AtomicSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicSequence").field(&self.get()).finish()
    }
}

impl fmt::Display for AtomicSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_sequence() {
        let sequence = AtomicSequence::new(0);
        assert_eq!(sequence.get(), 0);
        assert_eq!(sequence.increment_and_get(), 1);
        assert_eq!(sequence.get(), 1);
        assert_eq!(sequence.add_and_get(5), 6);
        sequence.set(42);
        assert_eq!(sequence.get(), 42);
        sequence.set_volatile(-7);
        assert_eq!(sequence.get(), -7);
    }

    #[test]
    fn test_default_is_initial_value() {
        assert_eq!(AtomicSequence::default().get(), INITIAL_VALUE);
        assert_eq!(AtomicSequence::default().to_string(), "-1");
    }

    #[test]
    fn test_compare_and_set() {
        let sequence = AtomicSequence::new(3);
        assert!(!sequence.compare_and_set(4, 10));
        assert_eq!(sequence.get(), 3);
        assert!(sequence.compare_and_set(3, 10));
        assert_eq!(sequence.get(), 10);
    }

    #[test]
    fn test_value_sits_alone_on_its_cache_line() {
        let sequence = AtomicSequence::new(0);
        let base = &sequence as *const AtomicSequence as usize;
        let value = &sequence.value as *const AtomicI64 as usize;
        assert_eq!(base % CACHE_LINE_SIZE, 0);
        assert_eq!(value - base, CACHE_LINE_PADDING);
        // nothing after the value shares its line
        assert_eq!((value + 8) % CACHE_LINE_SIZE, 0);
    }

    #[test]
    fn test_sequence_concurrent_increment_and_get() {
        let sequence_arc = Arc::new(AtomicSequence::new(0));
        let mut handles = vec![];
        for _ in 0..10 {
            let sequence = sequence_arc.clone();
            let handle = std::thread::spawn(move || {
                for _ in 0..1000 {
                    sequence.increment_and_get();
                }
            });
            handles.push(handle);
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sequence_arc.get(), 10000);
    }

    #[test]
    fn test_add_and_get_loses_no_updates() {
        for threads in 1..=8 {
            let start = 100;
            let sequence = Arc::new(AtomicSequence::new(start));
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    let sequence = sequence.clone();
                    std::thread::spawn(move || sequence.add_and_get(1))
                })
                .collect();
            let mut installed: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            installed.sort_unstable();
            assert_eq!(sequence.get(), start + threads);
            assert_eq!(installed, (start + 1..=start + threads).collect::<Vec<_>>());
        }
    }
}
