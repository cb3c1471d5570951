use std::sync::Arc;

use crate::sequence::{AtomicSequence, Sequence};

pub struct Utils;

impl Utils {
    /// Smallest current value among `sequences`, never greater than `default`.
    pub fn get_minimum_sequence(sequences: &[Arc<AtomicSequence>], default: Sequence) -> Sequence {
        sequences
            .iter()
            .fold(default, |minimum, s| minimum.min(s.get()))
    }

    pub const fn is_power_of_two(x: usize) -> bool {
        x != 0 && (x & (x - 1)) == 0
    }
}
