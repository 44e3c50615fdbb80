// Copyright (C) Microsoft Corporation. All rights reserved.

//! Incremental transforms and the `std::io` stream adapter over them.

mod block;
mod cipher;
mod io;

pub(crate) use block::*;
pub use cipher::*;
pub use io::*;

use super::*;

/// Incremental transform: cipher, hash or MAC.
///
/// `transform_block` may be called any number of times; the transform
/// buffers partial blocks itself. `transform_final_block` ends the
/// computation, after which only [`CryptoTransform::reset`] (where
/// supported) makes the object usable again.
pub trait CryptoTransform {
    /// Input granularity in bytes.
    fn input_block_size(&self) -> usize;

    /// Output granularity in bytes.
    fn output_block_size(&self) -> usize;

    /// Whether more than one block may be passed per call.
    fn can_transform_multiple_blocks(&self) -> bool;

    /// Whether [`CryptoTransform::reset`] is supported.
    fn can_reuse_transform(&self) -> bool;

    /// Processes `input`, returning whatever output is ready.
    fn transform_block(&mut self, input: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Processes the last of the input and flushes all remaining output.
    fn transform_final_block(&mut self, input: &[u8]) -> CryptoResult<Vec<u8>>;

    /// Returns a finalized transform to its initial state.
    fn reset(&mut self) -> CryptoResult<()>;
}
