// Copyright (C) Microsoft Corporation. All rights reserved.

//! Partial-block buffering for streaming transforms.

use super::*;

/// Holds input that does not yet fill a block.
///
/// [`BlockBuffer::update`] forwards only whole blocks to its callback; at
/// most `block_size - 1` bytes are ever held back.
pub(crate) struct BlockBuffer {
    block_size: usize,
    multiple_blocks: bool,
    pending: Zeroizing<Vec<u8>>,
}

impl BlockBuffer {
    /// `multiple_blocks` lets one callback receive several blocks at once;
    /// otherwise blocks are delivered one at a time.
    pub(crate) fn new(block_size: usize, multiple_blocks: bool) -> Self {
        Self {
            block_size,
            multiple_blocks,
            pending: Zeroizing::new(Vec::with_capacity(block_size)),
        }
    }

    pub(crate) fn update<F>(&mut self, input: &[u8], mut op: F) -> CryptoResult<()>
    where
        F: FnMut(&[u8]) -> CryptoResult<()>,
    {
        let mut input = input;

        if !self.pending.is_empty() {
            let fill = input.len().min(self.block_size - self.pending.len());
            self.pending.extend_from_slice(&input[..fill]);
            input = &input[fill..];

            if self.pending.len() < self.block_size {
                return Ok(());
            }
            op(&self.pending)?;
            self.pending.clear();
        }

        let whole = input.len() - input.len() % self.block_size;
        if whole > 0 {
            if self.multiple_blocks {
                op(&input[..whole])?;
            } else {
                for block in input[..whole].chunks(self.block_size) {
                    op(block)?;
                }
            }
        }

        self.pending.extend_from_slice(&input[whole..]);
        Ok(())
    }

    /// Removes and returns the buffered partial block.
    pub(crate) fn take_pending(&mut self) -> Zeroizing<Vec<u8>> {
        let tail = Zeroizing::new(self.pending.to_vec());
        self.pending.clear();
        tail
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }
}
