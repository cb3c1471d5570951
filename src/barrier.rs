use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::debug;

use crate::{
    error::{DisruptorError, Result},
    sequence::{AtomicSequence, Sequence},
    traits::{SequenceBarrier, WaitingStrategy},
    utils::Utils,
};

/// Barrier handed to a consumer: waits on the producer cursor and on the consumers upstream of
/// it, and carries the consumer's own alert flag.
pub struct ProcessingSequenceBarrier<W: WaitingStrategy> {
    alerted: AtomicBool,
    cursor: Arc<AtomicSequence>,
    dependent_sequences: Vec<Arc<AtomicSequence>>,
    waiting_strategy: Arc<W>,
}

impl<W: WaitingStrategy> ProcessingSequenceBarrier<W> {
    pub fn new(
        cursor: Arc<AtomicSequence>,
        dependent_sequences: Vec<Arc<AtomicSequence>>,
        waiting_strategy: Arc<W>,
    ) -> Self {
        debug!(
            dependencies = dependent_sequences.len(),
            "created sequence barrier"
        );
        Self {
            alerted: AtomicBool::new(false),
            cursor,
            dependent_sequences,
            waiting_strategy,
        }
    }
}

impl<W: WaitingStrategy> SequenceBarrier for ProcessingSequenceBarrier<W> {
    fn wait_for(&self, sequence: Sequence) -> Result<Sequence> {
        self.check_alert()?;
        self.waiting_strategy.wait_for(
            sequence,
            &self.cursor,
            &self.dependent_sequences,
            || self.check_alert(),
        )
    }

    fn get_cursor(&self) -> Sequence {
        if self.dependent_sequences.is_empty() {
            self.cursor.get()
        } else {
            Utils::get_minimum_sequence(&self.dependent_sequences, Sequence::MAX)
        }
    }

    fn is_alerted(&self) -> bool {
        self.alerted.load(Ordering::Acquire)
    }

    fn alert(&self) {
        debug!("sequence barrier alerted");
        self.alerted.store(true, Ordering::Release);
        self.waiting_strategy.signal_all_when_blocking();
    }

    fn clear_alert(&self) {
        self.alerted.store(false, Ordering::Release);
    }

    fn check_alert(&self) -> Result<()> {
        if self.is_alerted() {
            Err(DisruptorError::Alert)
        } else {
            Ok(())
        }
    }
}
