//! Lock-free single-producer sequencing core for Disruptor-style ring buffers.
//!
//! One producer claims positions with [`Sequenced::next_n`] (or [`Sequenced::try_next_n`]),
//! writes the matching ring slots, and publishes them. Consumers wait on a
//! [`SequenceBarrier`] and advance their own [`AtomicSequence`], which the sequencer in turn
//! uses as a gating sequence so the producer never laps them.

pub mod barrier;
pub mod config;
pub mod error;
pub mod sequence;
pub mod sequencer;
pub mod traits;
pub mod utils;
pub mod waiting;

pub use barrier::ProcessingSequenceBarrier;
pub use config::SequencerConfig;
pub use error::{DisruptorError, Result};
pub use sequence::{AtomicSequence, Sequence, INITIAL_VALUE};
pub use sequencer::SingleProducerSequencer;
pub use traits::{SequenceBarrier, Sequenced, Sequencer, WaitingStrategy};
pub use waiting::{
    BlockingWaitStrategy, BusySpinWaitStrategy, SleepingWaitStrategy,
    TimeoutBlockingWaitStrategy, YieldingWaitStrategy,
};
