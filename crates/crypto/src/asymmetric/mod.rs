// Copyright (C) Microsoft Corporation. All rights reserved.

//! RSA and ECDSA keys, signatures and RSA encryption.

use super::*;

/// Asymmetric key management, signing and RSA encryption.
pub struct AsymmetricEngine<'a> {
    crypto: &'a Crypto,
}

impl<'a> AsymmetricEngine<'a> {
    pub(crate) fn new(crypto: &'a Crypto) -> Self {
        Self { crypto }
    }

    fn resolve(&self, algorithm: AlgorithmId) -> CryptoResult<&'static AlgorithmDescriptor> {
        let descriptor = self.crypto.registry().resolve(algorithm)?;
        match descriptor.category() {
            AlgorithmCategory::Asymmetric | AlgorithmCategory::KeyAgreement => Ok(descriptor),
            _ => Err(CryptoError::InvalidParameter),
        }
    }

    /// Generates a key pair; `None` picks the algorithm's default size.
    #[tracing::instrument(skip(self), err)]
    pub fn generate_key_pair(
        &self,
        algorithm: AlgorithmId,
        bits: Option<usize>,
    ) -> CryptoResult<CryptographicKey> {
        let descriptor = self.resolve(algorithm)?;
        let bits = bits.unwrap_or(descriptor.default_key_bits());
        self.crypto.config().check_key_bits(descriptor, bits)?;

        let native = self.crypto.provider().generate_key_pair(descriptor, bits)?;
        Ok(self.crypto.wrap_key(descriptor, native))
    }

    /// Imports a public key. The result can verify, encrypt or agree but
    /// never sign or decrypt.
    #[tracing::instrument(skip(self, blob), err)]
    pub fn import_public_key(
        &self,
        algorithm: AlgorithmId,
        blob: &[u8],
        format: PublicKeyBlobFormat,
    ) -> CryptoResult<CryptographicKey> {
        let descriptor = self.resolve(algorithm)?;
        if !format.fits(descriptor) {
            Err(CryptoError::InvalidParameter)?;
        }
        if descriptor.is_ecc() {
            let curve = self.crypto.provider().public_key_curve(blob, format)?;
            if curve.is_some() && curve != descriptor.curve() {
                tracing::debug!(algorithm = %descriptor.id(), ?curve, "public key blob is on another curve");
                Err(CryptoError::CurveMismatch)?;
            }
        }
        let native = self
            .crypto
            .provider()
            .import_public_key(descriptor, blob, format)?;
        self.admit(descriptor, native)
    }

    /// Imports a key pair from a private key blob.
    #[tracing::instrument(skip(self, blob), err)]
    pub fn import_key_pair(
        &self,
        algorithm: AlgorithmId,
        blob: &[u8],
        format: PrivateKeyBlobFormat,
    ) -> CryptoResult<CryptographicKey> {
        let descriptor = self.resolve(algorithm)?;
        if !format.fits(descriptor) {
            Err(CryptoError::InvalidParameter)?;
        }
        let native = self
            .crypto
            .provider()
            .import_private_key(descriptor, blob, format)?;
        self.admit(descriptor, native)
    }

    /// Applies curve and size policy to an imported key.
    fn admit(
        &self,
        descriptor: &'static AlgorithmDescriptor,
        native: Box<dyn NativeKey>,
    ) -> CryptoResult<CryptographicKey> {
        if descriptor.is_ecc() && native.curve() != descriptor.curve() {
            tracing::debug!(algorithm = %descriptor.id(), curve = ?native.curve(), "imported key is on another curve");
            Err(CryptoError::CurveMismatch)?;
        }
        self.crypto.config().check_key_bits(descriptor, native.bits())?;
        Ok(self.crypto.wrap_key(descriptor, native))
    }

    pub fn export_public_key(
        &self,
        key: &CryptographicKey,
        format: PublicKeyBlobFormat,
    ) -> CryptoResult<PublicKeyBlob> {
        key.export_public_key(format)
    }

    pub fn export_private_key(
        &self,
        key: &CryptographicKey,
        format: PrivateKeyBlobFormat,
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        key.export_private_key(format)
    }

    /// Regenerates a key pair at a new size.
    pub fn set_key_size(&self, key: &CryptographicKey, bits: usize) -> CryptoResult<()> {
        key.set_key_size(bits, self.crypto.config())
    }

    #[tracing::instrument(skip_all, fields(len = data.len()), err)]
    pub fn sign(&self, key: &CryptographicKey, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let live = key.live_for(KeyCapability::Sign)?;
        let descriptor = live.descriptor();
        if !descriptor.is_signature() {
            Err(CryptoError::InvalidKeyUsage)?;
        }
        Ok(live.provider().sign(descriptor, live.native(), data)?)
    }

    /// `Ok(false)` for any signature that does not verify.
    #[tracing::instrument(skip_all, fields(len = data.len()), err)]
    pub fn verify(
        &self,
        key: &CryptographicKey,
        data: &[u8],
        signature: &[u8],
    ) -> CryptoResult<bool> {
        let live = key.live_for(KeyCapability::Verify)?;
        let descriptor = live.descriptor();
        if !descriptor.is_signature() {
            Err(CryptoError::InvalidKeyUsage)?;
        }
        Ok(live
            .provider()
            .verify(descriptor, live.native(), data, signature)?)
    }

    #[tracing::instrument(skip_all, fields(len = data.len()), err)]
    pub fn encrypt(&self, key: &CryptographicKey, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let live = key.live_for(KeyCapability::Encrypt)?;
        let descriptor = live.descriptor();
        if !descriptor.is_encryption() {
            Err(CryptoError::InvalidKeyUsage)?;
        }
        if data.len() > max_plaintext_len(descriptor, live.bits()) {
            tracing::debug!(len = data.len(), bits = live.bits(), "plaintext too long for key");
            Err(CryptoError::InvalidParameter)?;
        }
        Ok(live.provider().encrypt(descriptor, live.native(), data)?)
    }

    /// Every rejection, whatever its cause, is [`CryptoError::DecryptionFailed`].
    #[tracing::instrument(skip_all, fields(len = data.len()))]
    pub fn decrypt(&self, key: &CryptographicKey, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let live = key.live_for(KeyCapability::Decrypt)?;
        let descriptor = live.descriptor();
        if !descriptor.is_encryption() {
            Err(CryptoError::InvalidKeyUsage)?;
        }
        if data.len() != live.bits().div_ceil(8) {
            return Err(CryptoError::DecryptionFailed);
        }
        live.provider()
            .decrypt(descriptor, live.native(), data)
            .map_err(NativeError::into_decrypt_error)
    }
}

/// Longest message RSA encryption accepts for a `bits` modulus.
fn max_plaintext_len(descriptor: &AlgorithmDescriptor, bits: usize) -> usize {
    let modulus_len = bits.div_ceil(8);
    let overhead = match descriptor.rsa_scheme() {
        Some(RsaScheme::Oaep) => {
            let hash_len = descriptor
                .hash()
                .map_or(0, |hash| hash.descriptor().output_len());
            2 * hash_len + 2
        }
        _ => 11,
    };
    modulus_len.saturating_sub(overhead)
}

#[cfg(test)]
mod tests;
