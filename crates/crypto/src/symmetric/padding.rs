// Copyright (C) Microsoft Corporation. All rights reserved.

//! PKCS#7 block padding and the constant-time helpers it needs.

use super::*;

/// `0xFF` when `a < b`, otherwise `0x00`, without branching on the values.
fn ct_lt(a: u8, b: u8) -> u8 {
    ((a as u16).wrapping_sub(b as u16) >> 8) as u8
}

fn ct_eq(a: u8, b: u8) -> u8 {
    ct_lt(a ^ b, 1)
}

/// Constant-time equality of two byte strings. Lengths are not secret.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    ct_eq(diff, 0) == 0xFF
}

/// Pads the final partial block `tail` (shorter than `block_size`) to one
/// or two full blocks' worth of output.
pub(crate) fn pad(tail: &[u8], block_size: usize) -> Zeroizing<Vec<u8>> {
    let pad_len = block_size - tail.len() % block_size;
    let mut padded = Zeroizing::new(Vec::with_capacity(tail.len() + pad_len));
    padded.extend_from_slice(tail);
    padded.resize(tail.len() + pad_len, pad_len as u8);
    padded
}

/// Strips PKCS#7 padding from the last plaintext block.
///
/// Every byte of the block is examined regardless of where a mismatch
/// occurs; the only branch is on the final verdict.
pub(crate) fn unpad(block: &[u8]) -> CryptoResult<&[u8]> {
    let block_size = block.len();
    let Some(&pad_len) = block.last() else {
        return Err(CryptoError::InvalidPadding);
    };

    let mut bad = ct_eq(pad_len, 0) | ct_lt(block_size as u8, pad_len);
    for (i, &byte) in block.iter().enumerate() {
        let in_padding = ct_lt((block_size - 1 - i) as u8, pad_len);
        bad |= in_padding & (byte ^ pad_len);
    }

    if bad != 0 {
        return Err(CryptoError::InvalidPadding);
    }
    Ok(&block[..block_size - pad_len as usize])
}
