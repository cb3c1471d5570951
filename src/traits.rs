//! Core traits defining the sequencing contracts.
//!
//! - [`Sequenced`]: what a producer uses to claim and publish slots
//! - [`Sequencer`]: a [`Sequenced`] that also owns the cursor and the gating sequences
//! - [`SequenceBarrier`]: what a consumer uses to wait for published slots and to observe
//!   cooperative shutdown
//! - [`WaitingStrategy`]: how a waiting consumer spends its time
//!
//! # Examples
//!
//! ```rust
//! use disruptor_sequencer::{
//!     BusySpinWaitStrategy, SequenceBarrier, Sequenced, Sequencer, SingleProducerSequencer,
//! };
//!
//! let mut sequencer = SingleProducerSequencer::new(8, BusySpinWaitStrategy).unwrap();
//! let barrier = sequencer.create_sequence_barrier(&[]);
//!
//! let high = sequencer.next_n(2).unwrap();
//! // ... write slots high - 1 and high into the ring ...
//! sequencer.publish_range(high - 1, high);
//!
//! assert_eq!(barrier.wait_for(0).unwrap(), 1);
//! ```

use std::sync::Arc;

use crate::error::Result;
use crate::sequence::{AtomicSequence, Sequence};

/// Producer-side claim and publish contract.
///
/// Claiming operations take `&mut self`: exactly one thread may claim, and the compiler holds
/// every implementation to that.
pub trait Sequenced {
    /// Ring capacity, a positive power of two.
    fn get_buffer_size(&self) -> i64;

    /// Whether `required_capacity` more slots could be claimed right now. May refresh
    /// internal caches; never blocks and never claims.
    fn has_available_capacity(&mut self, required_capacity: i64) -> bool;

    /// Free slots between the producer and the slowest consumer.
    fn remaining_capacity(&self) -> i64;

    /// Claim the next slot, blocking while consumers lag.
    fn next(&mut self) -> Result<Sequence> {
        self.next_n(1)
    }

    /// Claim `n` consecutive slots and return the highest; the range is
    /// `[returned - n + 1, returned]`. Blocks while consumers lag.
    fn next_n(&mut self, n: i64) -> Result<Sequence>;

    /// Claim the next slot without blocking.
    fn try_next(&mut self) -> Result<Sequence> {
        self.try_next_n(1)
    }

    /// Claim `n` slots without blocking; fails with `InsufficientCapacity` and claims nothing
    /// if the ring is too full.
    fn try_next_n(&mut self, n: i64) -> Result<Sequence>;

    /// Make `sequence` visible to consumers. Call only once the slot has been written.
    fn publish(&self, sequence: Sequence);

    /// Make `[low, high]` visible to consumers, in claim order.
    fn publish_range(&self, low: Sequence, high: Sequence);
}

/// A [`Sequenced`] that owns the published cursor and the consumer gating sequences.
pub trait Sequencer: Sequenced {
    type Barrier: SequenceBarrier;

    fn get_cursor(&self) -> Arc<AtomicSequence>;

    /// Force the claimed position. Bypasses the capacity protocol; for resets only.
    fn claim(&mut self, sequence: Sequence);

    fn is_available(&self, sequence: Sequence) -> bool;

    fn add_gating_sequence(&mut self, gating_sequence: &Arc<AtomicSequence>);
    fn remove_gating_sequence(&mut self, sequence: &Arc<AtomicSequence>) -> bool;

    /// Slowest gating sequence, or the cursor when none are registered.
    fn get_minimum_sequence(&self) -> Sequence;

    /// Barrier over the cursor that additionally waits for `sequences_to_track`.
    fn create_sequence_barrier(&self, sequences_to_track: &[Arc<AtomicSequence>])
        -> Self::Barrier;

    /// Highest position in `[lower_bound, available_sequence]` that is safe to read.
    fn get_highest_published_sequence(
        &self,
        lower_bound: Sequence,
        available_sequence: Sequence,
    ) -> Sequence;
}

/// Consumer-side wait and alert contract.
pub trait SequenceBarrier: Send + Sync {
    /// Block until `sequence` is available and return the highest available position,
    /// which may be greater than `sequence`.
    ///
    /// # Errors
    /// `Alert` if the barrier is alerted, `Timeout` if a bounded wait strategy gives up.
    fn wait_for(&self, sequence: Sequence) -> Result<Sequence>;

    /// Non-blocking snapshot of the position this barrier tracks.
    fn get_cursor(&self) -> Sequence;

    fn is_alerted(&self) -> bool;

    /// Raise the alert and wake any thread parked in [`wait_for`](Self::wait_for).
    fn alert(&self);

    fn clear_alert(&self);

    /// Fails with `Alert` if the alert is raised.
    fn check_alert(&self) -> Result<()>;
}

/// Defines how threads wait for available sequences.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use disruptor_sequencer::{AtomicSequence, Result, Sequence, WaitingStrategy};
///
/// #[derive(Default)]
/// struct PollOnce;
///
/// impl WaitingStrategy for PollOnce {
///     fn new() -> Self {
///         PollOnce
///     }
///
///     fn wait_for<F: Fn() -> Result<()>>(
///         &self,
///         _sequence: Sequence,
///         cursor: &AtomicSequence,
///         _dependencies: &[Arc<AtomicSequence>],
///         check_alert: F,
///     ) -> Result<Sequence> {
///         check_alert()?;
///         Ok(cursor.get())
///     }
///
///     fn signal_all_when_blocking(&self) {}
/// }
/// ```
pub trait WaitingStrategy: Default + Send + Sync {
    fn new() -> Self;

    /// Wait until `sequence` is available on `cursor` and, when present, on every one of
    /// `dependencies`. Returns the available position: the minimum of `dependencies`, or the
    /// cursor when there are none. `check_alert` is polled between attempts.
    fn wait_for<F: Fn() -> Result<()>>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependencies: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence>;

    /// Wake every thread blocked in [`wait_for`](Self::wait_for).
    fn signal_all_when_blocking(&self);
}
