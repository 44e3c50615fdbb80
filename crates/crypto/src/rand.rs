// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Cryptographically secure random bytes from the native provider.
pub struct RandomEngine<'a> {
    crypto: &'a Crypto,
}

impl<'a> RandomEngine<'a> {
    pub(crate) fn new(crypto: &'a Crypto) -> Self {
        Self { crypto }
    }

    /// Fills `buf` with random bytes.
    pub fn fill(&self, buf: &mut [u8]) -> CryptoResult<()> {
        if buf.is_empty() {
            return Ok(());
        }
        Ok(self.crypto.provider().fill_random(buf)?)
    }

    /// Returns `len` random bytes.
    pub fn generate(&self, len: usize) -> CryptoResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    pub fn generate_u32(&self) -> CryptoResult<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}
