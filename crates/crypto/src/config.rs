// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Policy knobs applied on top of what the native provider supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoConfig {
    allow_key_export: bool,
    allow_sha1: bool,
    min_rsa_key_bits: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            allow_key_export: true,
            allow_sha1: true,
            min_rsa_key_bits: 1024,
        }
    }
}

impl CryptoConfig {
    /// Permits raw and private key export for keys created by this instance.
    pub fn with_key_export(mut self, allow: bool) -> Self {
        self.allow_key_export = allow;
        self
    }

    /// Leaves every SHA-1 based algorithm out of the registry when `false`.
    pub fn with_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Smallest RSA modulus accepted for generation and import.
    pub fn with_min_rsa_key_bits(mut self, bits: usize) -> Self {
        self.min_rsa_key_bits = bits;
        self
    }

    pub fn allow_key_export(&self) -> bool {
        self.allow_key_export
    }

    pub fn allow_sha1(&self) -> bool {
        self.allow_sha1
    }

    pub fn min_rsa_key_bits(&self) -> usize {
        self.min_rsa_key_bits
    }

    pub(crate) fn permits(&self, id: AlgorithmId) -> bool {
        self.allow_sha1 || !id.descriptor().uses_sha1()
    }

    /// Checks `bits` against the descriptor's size set and this policy.
    pub(crate) fn check_key_bits(
        &self,
        descriptor: &AlgorithmDescriptor,
        bits: usize,
    ) -> CryptoResult<()> {
        if !descriptor.key_sizes().contains(bits) {
            tracing::debug!(algorithm = %descriptor.id(), bits, "key size outside allowed set");
            Err(CryptoError::InvalidKeySize)?;
        }
        if descriptor.is_rsa() && bits < self.min_rsa_key_bits {
            tracing::debug!(
                algorithm = %descriptor.id(),
                bits,
                min = self.min_rsa_key_bits,
                "RSA key below configured minimum"
            );
            Err(CryptoError::InvalidKeySize)?;
        }
        Ok(())
    }
}
