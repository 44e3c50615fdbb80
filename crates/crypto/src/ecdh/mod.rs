// Copyright (C) Microsoft Corporation. All rights reserved.

//! Elliptic-curve Diffie-Hellman key agreement.

use super::*;

/// ECDH key pairs and shared-secret derivation.
pub struct EcdhExchange<'a> {
    crypto: &'a Crypto,
}

impl<'a> EcdhExchange<'a> {
    pub(crate) fn new(crypto: &'a Crypto) -> Self {
        Self { crypto }
    }

    /// Generates a key pair on `curve`.
    #[tracing::instrument(skip(self), err)]
    pub fn create_key_pair(&self, curve: EccCurve) -> CryptoResult<CryptographicKey> {
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(AlgorithmId::ecdh(curve), AlgorithmCategory::KeyAgreement)?;
        let native = self
            .crypto
            .provider()
            .generate_key_pair(descriptor, curve.bit_size())?;
        Ok(self.crypto.wrap_key(descriptor, native))
    }

    /// Imports a peer's public key; the curve is taken from the blob.
    #[tracing::instrument(skip_all, fields(format = %blob.format()), err)]
    pub fn public_key_from_blob(&self, blob: &PublicKeyBlob) -> CryptoResult<CryptographicKey> {
        let provider = self.crypto.provider();
        let curve = provider
            .public_key_curve(blob.as_bytes(), blob.format())?
            .ok_or(CryptoError::InvalidParameter)?;
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(AlgorithmId::ecdh(curve), AlgorithmCategory::KeyAgreement)?;
        let native = provider.import_public_key(descriptor, blob.as_bytes(), blob.format())?;
        Ok(self.crypto.wrap_key(descriptor, native))
    }

    /// Raw shared secret (the X coordinate of the shared point).
    ///
    /// Keys on different curves fail with [`CryptoError::CurveMismatch`]
    /// before the provider is involved.
    #[tracing::instrument(skip_all, err)]
    pub fn derive_shared_secret(
        &self,
        private_key: &CryptographicKey,
        peer_public_key: &CryptographicKey,
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let local = private_key.live_for(KeyCapability::Derive)?;
        if !local.native().has_private() {
            Err(CryptoError::InvalidKeyUsage)?;
        }
        let peer = peer_public_key.live_for(KeyCapability::Derive)?;

        if local.descriptor().curve() != peer.descriptor().curve() {
            tracing::debug!(
                local = ?local.descriptor().curve(),
                peer = ?peer.descriptor().curve(),
                "curve mismatch"
            );
            Err(CryptoError::CurveMismatch)?;
        }

        let secret = local.provider().agree(local.native(), peer.native())?;
        Ok(Zeroizing::new(secret))
    }
}

#[cfg(test)]
mod tests;
