// Copyright (C) Microsoft Corporation. All rights reserved.

//! Password-based key derivation.

use super::*;

/// Immutable PBKDF2 inputs.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyDerivationParameters {
    salt: Vec<u8>,
    iteration_count: u32,
    generic: Option<Vec<u8>>,
}

impl KeyDerivationParameters {
    /// PBKDF2 salt and iteration count. The count is validated when the
    /// parameters are used.
    pub fn build_for_pbkdf2(salt: &[u8], iteration_count: u32) -> Self {
        Self {
            salt: salt.to_vec(),
            iteration_count,
            generic: None,
        }
    }

    /// Opaque provider-specific payload carried alongside the parameters.
    pub fn with_generic_parameter(mut self, payload: &[u8]) -> Self {
        self.generic = Some(payload.to_vec());
        self
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn generic_parameter(&self) -> Option<&[u8]> {
        self.generic.as_deref()
    }
}

impl std::fmt::Debug for KeyDerivationParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDerivationParameters")
            .field("salt_len", &self.salt.len())
            .field("iteration_count", &self.iteration_count)
            .field("generic", &self.generic.is_some())
            .finish()
    }
}

/// PBKDF2 over the native provider.
pub struct KeyDerivationEngine<'a> {
    crypto: &'a Crypto,
}

impl<'a> KeyDerivationEngine<'a> {
    pub(crate) fn new(crypto: &'a Crypto) -> Self {
        Self { crypto }
    }

    /// Derives `len` bytes from `password`.
    #[tracing::instrument(skip(self, password, params), fields(iterations = params.iteration_count()), err)]
    pub fn derive(
        &self,
        algorithm: AlgorithmId,
        password: &[u8],
        params: &KeyDerivationParameters,
        len: usize,
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(algorithm, AlgorithmCategory::KeyDerivation)?;
        if params.iteration_count == 0 || len == 0 {
            Err(CryptoError::InvalidParameter)?;
        }

        let mut output = Zeroizing::new(vec![0u8; len]);
        self.crypto.provider().pbkdf2(
            descriptor,
            password,
            &params.salt,
            params.iteration_count,
            &mut output,
        )?;
        Ok(output)
    }

    /// Derives key material and imports it as a symmetric or MAC key of
    /// `bits` for `target`.
    pub fn derive_key(
        &self,
        algorithm: AlgorithmId,
        password: &[u8],
        params: &KeyDerivationParameters,
        target: AlgorithmId,
        bits: usize,
    ) -> CryptoResult<CryptographicKey> {
        let target_descriptor = self.crypto.registry().resolve(target)?;
        if bits == 0 || bits % 8 != 0 {
            Err(CryptoError::InvalidKeySize)?;
        }

        let category = target_descriptor.category();
        if !matches!(category, AlgorithmCategory::Symmetric | AlgorithmCategory::Mac) {
            Err(CryptoError::InvalidParameter)?;
        }

        let material = self.derive(algorithm, password, params, bits / 8)?;
        if category == AlgorithmCategory::Symmetric {
            self.crypto.symmetric().import_key(target, &material)
        } else {
            self.crypto.mac().create_key(target, &material)
        }
    }
}
