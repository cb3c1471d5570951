//! The Sequencer coordinates access to the ring buffer.
//!
//! # Overview
//! The Sequencer hands out positions in the ring buffer and tracks who may touch them:
//!
//! 1. **Sequence Generation**: gives the producer unique, monotonically increasing positions.
//!
//! 2. **Capacity Management**: keeps the producer from lapping the slowest consumer, which it
//!    observes through the gating sequences.
//!
//! 3. **Publisher Coordination**: advances the shared cursor once slots are written and wakes
//!    waiting consumers.
//!
//! # Single Producer Design
//! `SingleProducerSequencer` assumes exactly one claiming thread, so its claim state is plain
//! producer-local data and claiming needs no CAS:
//!
//! - `next_value` is the last claimed position
//! - `cached_value` is the slowest consumer position seen at the last gating scan; it is a lower
//!   bound, so a claim whose wrap point does not pass it can skip the scan entirely
//! - the cursor is the only field consumers read, and it lives in its own [`AtomicSequence`]
//!
//! # Usage Example
//! ```rust
//! use disruptor_sequencer::{BusySpinWaitStrategy, Sequenced, SingleProducerSequencer};
//!
//! // Create a sequencer with a buffer of 1024 slots
//! let mut sequencer = SingleProducerSequencer::new(1024, BusySpinWaitStrategy).unwrap();
//! let sequence = sequencer.next().unwrap();
//! sequencer.publish(sequence);
//! ```
//!
//! # Producer Workflow
//! 1. Producer claims sequence(s) via `next()` / `next_n()` or `try_next()` / `try_next_n()`
//! 2. Writes data to the ring buffer at the claimed sequence(s)
//! 3. Publishes sequences via `publish()` to make data visible to consumers

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::barrier::ProcessingSequenceBarrier;
use crate::config::SequencerConfig;
use crate::error::{DisruptorError, Result};
use crate::sequence::{AtomicSequence, Sequence, INITIAL_VALUE};
use crate::traits::{Sequenced, Sequencer, WaitingStrategy};
use crate::utils::Utils;

/// A sequencer optimized for a single producer.
pub struct SingleProducerSequencer<W: WaitingStrategy> {
    buffer_size: i64,
    cursor: Arc<AtomicSequence>,
    next_value: Sequence,
    cached_value: Sequence,
    gating_sequences: Vec<Arc<AtomicSequence>>,
    waiting_strategy: Arc<W>,
    producer_park: Duration,
    #[cfg(test)]
    gating_scans: u64,
}

impl<W: WaitingStrategy> SingleProducerSequencer<W> {
    pub fn new(buffer_size: usize, waiting_strategy: W) -> Result<Self> {
        Self::with_config(SequencerConfig::new(buffer_size), waiting_strategy)
    }

    pub fn with_config(config: SequencerConfig, waiting_strategy: W) -> Result<Self> {
        config.validate()?;
        debug!(
            buffer_size = config.buffer_size,
            producer_park_ns = config.producer_park.as_nanos() as u64,
            "created single producer sequencer"
        );
        Ok(Self {
            buffer_size: config.buffer_size as i64,
            cursor: Arc::new(AtomicSequence::default()),
            next_value: INITIAL_VALUE,
            cached_value: INITIAL_VALUE,
            gating_sequences: Vec::new(),
            waiting_strategy: Arc::new(waiting_strategy),
            producer_park: config.producer_park,
            #[cfg(test)]
            gating_scans: 0,
        })
    }

    /// Slowest gating sequence; unconstrained (the producer's own position) when none exist.
    #[inline]
    fn scan_gating_sequences(&mut self, next_value: Sequence) -> Sequence {
        #[cfg(test)]
        {
            self.gating_scans += 1;
        }
        Utils::get_minimum_sequence(&self.gating_sequences, next_value)
    }

    fn check_n(&self, n: i64) -> Result<()> {
        if n < 1 {
            return Err(DisruptorError::invalid_argument("n must be > 0"));
        }
        Ok(())
    }
}

impl<W: WaitingStrategy> Sequenced for SingleProducerSequencer<W> {
    fn get_buffer_size(&self) -> i64 {
        self.buffer_size
    }

    fn has_available_capacity(&mut self, required_capacity: i64) -> bool {
        let next_value = self.next_value;
        let wrap_point = next_value + required_capacity - self.buffer_size;
        let cached_gating_sequence = self.cached_value;

        if wrap_point > cached_gating_sequence || cached_gating_sequence > next_value {
            let min_sequence = self.scan_gating_sequences(next_value);
            self.cached_value = min_sequence;

            if wrap_point > min_sequence {
                return false;
            }
        }

        true
    }

    fn remaining_capacity(&self) -> i64 {
        let next_value = self.next_value;
        let consumed = Utils::get_minimum_sequence(&self.gating_sequences, next_value);
        self.buffer_size - (next_value - consumed)
    }

    fn next_n(&mut self, n: i64) -> Result<Sequence> {
        self.check_n(n)?;
        // A claim wider than the ring would wait forever.
        if n > self.buffer_size {
            return Err(DisruptorError::invalid_argument(format!(
                "n must be <= buffer size {}",
                self.buffer_size
            )));
        }

        let next_value = self.next_value;
        let next_sequence = next_value + n;
        let wrap_point = next_sequence - self.buffer_size;
        let cached_gating_sequence = self.cached_value;

        if wrap_point > cached_gating_sequence || cached_gating_sequence > next_value {
            let mut min_sequence = self.scan_gating_sequences(next_value);
            if wrap_point > min_sequence {
                trace!(wrap_point, min_sequence, "producer waiting for capacity");
                while wrap_point > min_sequence {
                    std::thread::park_timeout(self.producer_park);
                    min_sequence = self.scan_gating_sequences(next_value);
                }
                trace!(min_sequence, "producer capacity available");
            }
            self.cached_value = min_sequence;
        }

        self.next_value = next_sequence;
        Ok(next_sequence)
    }

    fn try_next_n(&mut self, n: i64) -> Result<Sequence> {
        self.check_n(n)?;

        if !self.has_available_capacity(n) {
            return Err(DisruptorError::InsufficientCapacity);
        }

        self.next_value += n;
        Ok(self.next_value)
    }

    fn publish(&self, sequence: Sequence) {
        self.cursor.set(sequence);
        self.waiting_strategy.signal_all_when_blocking();
    }

    fn publish_range(&self, _low: Sequence, high: Sequence) {
        // The whole range was written before the call; only its end needs to become visible.
        self.publish(high);
    }
}

impl<W: WaitingStrategy> Sequencer for SingleProducerSequencer<W> {
    type Barrier = ProcessingSequenceBarrier<W>;

    fn get_cursor(&self) -> Arc<AtomicSequence> {
        self.cursor.clone()
    }

    fn claim(&mut self, sequence: Sequence) {
        self.next_value = sequence;
    }

    fn is_available(&self, sequence: Sequence) -> bool {
        // Holds only because a single producer moves the cursor to the end of a batch at once.
        sequence <= self.cursor.get()
    }

    fn add_gating_sequence(&mut self, gating_sequence: &Arc<AtomicSequence>) {
        let cursor = self.cursor.get();
        gating_sequence.set_volatile(cursor);
        self.gating_sequences.push(gating_sequence.clone());
        debug!(
            cursor,
            gating_sequences = self.gating_sequences.len(),
            "added gating sequence"
        );
    }

    fn remove_gating_sequence(&mut self, sequence: &Arc<AtomicSequence>) -> bool {
        let index = self
            .gating_sequences
            .iter()
            .position(|s| Arc::ptr_eq(s, sequence));
        if let Some(index) = index {
            self.gating_sequences.remove(index);
            debug!(
                gating_sequences = self.gating_sequences.len(),
                "removed gating sequence"
            );
            true
        } else {
            false
        }
    }

    fn get_minimum_sequence(&self) -> Sequence {
        Utils::get_minimum_sequence(&self.gating_sequences, self.cursor.get())
    }

    fn create_sequence_barrier(&self, sequences_to_track: &[Arc<AtomicSequence>]) -> Self::Barrier {
        ProcessingSequenceBarrier::new(
            self.cursor.clone(),
            Vec::from(sequences_to_track),
            self.waiting_strategy.clone(),
        )
    }

    fn get_highest_published_sequence(
        &self,
        _lower_bound: Sequence,
        available_sequence: Sequence,
    ) -> Sequence {
        available_sequence
    }
}
