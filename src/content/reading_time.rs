//! Reading time estimation

use serde::Serialize;
use std::fmt;

use super::ContentBlock;

/// Words an average reader gets through in a minute
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Estimated reading time in whole minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ReadingTime(usize);

impl ReadingTime {
    pub fn minutes(self) -> usize {
        self.0
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

/// Reading time at [`DEFAULT_WORDS_PER_MINUTE`]
pub fn reading_time(blocks: &[ContentBlock]) -> ReadingTime {
    reading_time_at(blocks, DEFAULT_WORDS_PER_MINUTE)
}

/// Each block is rounded up to a whole minute on its own, then summed.
pub fn reading_time_at(blocks: &[ContentBlock], words_per_minute: usize) -> ReadingTime {
    let wpm = words_per_minute.max(1);
    ReadingTime(
        blocks
            .iter()
            .map(|block| block.word_count().div_ceil(wpm))
            .sum(),
    )
}
