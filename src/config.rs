//! Construction parameters for the single-producer sequencer.

use std::time::Duration;

use crate::error::{DisruptorError, Result};
use crate::utils::Utils;

/// How long the producer parks between capacity re-checks when consumers lag.
pub const DEFAULT_PRODUCER_PARK: Duration = Duration::from_nanos(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Ring capacity; must be a power of two.
    pub buffer_size: usize,
    /// Park interval used by the blocking claim path.
    pub producer_park: Duration,
}

impl SequencerConfig {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            producer_park: DEFAULT_PRODUCER_PARK,
        }
    }

    pub fn with_producer_park(mut self, producer_park: Duration) -> Self {
        self.producer_park = producer_park;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size < 1 {
            return Err(DisruptorError::invalid_argument(
                "buffer_size must not be less than 1",
            ));
        }
        if !Utils::is_power_of_two(self.buffer_size) {
            return Err(DisruptorError::invalid_argument(format!(
                "buffer_size must be a power of 2, got {}",
                self.buffer_size
            )));
        }
        Ok(())
    }
}
