//! Bounded FIFO of raw output chunks.

use std::collections::VecDeque;

/// Raw chunks exactly as they arrived from the shell, for diagnostics.
///
/// Nothing in the parser or renderer reads from here.
#[derive(Debug, Clone)]
pub struct RawLog {
    chunks: VecDeque<String>,
    max_chunks: usize,
}

impl RawLog {
    pub fn new(max_chunks: usize) -> Self {
        Self {
            chunks: VecDeque::new(),
            max_chunks: max_chunks.max(1),
        }
    }

    /// Record a chunk, dropping the oldest ones past capacity.
    pub fn push(&mut self, chunk: &str) {
        self.chunks.push_back(chunk.to_string());
        while self.chunks.len() > self.max_chunks {
            self.chunks.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_chunks
    }

    /// The last `count` chunks, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let skip = self.chunks.len().saturating_sub(count);
        self.chunks.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}

impl Default for RawLog {
    fn default() -> Self {
        Self::new(super::DEFAULT_MAX_BUFFER_SIZE)
    }
}
