// Copyright (C) Microsoft Corporation. All rights reserved.

//! Symmetric ciphers.
//!
//! One-shot operations run through the same [`CipherTransform`] as the
//! streaming API, so chunked and whole-buffer results are identical. GCM is
//! one-shot only.

mod padding;
mod params;

pub(crate) use padding::*;
pub use params::*;

use super::*;

/// Symmetric key creation and encryption.
pub struct SymmetricEngine<'a> {
    crypto: &'a Crypto,
}

impl<'a> SymmetricEngine<'a> {
    pub(crate) fn new(crypto: &'a Crypto) -> Self {
        Self { crypto }
    }

    /// Generates a random key of `bits` for `algorithm`.
    #[tracing::instrument(skip(self), err)]
    pub fn generate_key(&self, algorithm: AlgorithmId, bits: usize) -> CryptoResult<CryptographicKey> {
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(algorithm, AlgorithmCategory::Symmetric)?;
        self.crypto.config().check_key_bits(descriptor, bits)?;

        let mut material = Zeroizing::new(vec![0u8; bits / 8]);
        self.crypto.provider().fill_random(&mut material)?;
        self.import(descriptor, &material)
    }

    /// Wraps raw key material. The key size is the material length.
    #[tracing::instrument(skip_all, fields(%algorithm), err)]
    pub fn import_key(&self, algorithm: AlgorithmId, material: &[u8]) -> CryptoResult<CryptographicKey> {
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(algorithm, AlgorithmCategory::Symmetric)?;
        self.crypto
            .config()
            .check_key_bits(descriptor, material.len() * 8)?;
        self.import(descriptor, material)
    }

    fn import(
        &self,
        descriptor: &'static AlgorithmDescriptor,
        material: &[u8],
    ) -> CryptoResult<CryptographicKey> {
        let native = self.crypto.provider().import_secret(descriptor, material)?;
        Ok(self.crypto.wrap_key(descriptor, native))
    }

    /// Raw key material; fails with [`CryptoError::NotExportable`] when
    /// export is disabled.
    pub fn export_key(&self, key: &CryptographicKey) -> CryptoResult<Zeroizing<Vec<u8>>> {
        symmetric_descriptor(key)?;
        key.export_raw().map_err(|err| match err {
            CryptoError::InvalidKeyUsage => CryptoError::NotExportable,
            other => other,
        })
    }

    #[tracing::instrument(skip_all, fields(len = plaintext.len()), err)]
    pub fn encrypt(
        &self,
        key: &CryptographicKey,
        params: &CipherParameters,
        plaintext: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let descriptor = symmetric_descriptor(key)?;
        let cipher = params.resolve(descriptor)?;

        if cipher.mode == CipherMode::Gcm {
            let live = key.live_for(KeyCapability::Encrypt)?;
            let nonce = cipher.iv.ok_or(CryptoError::InvalidParameter)?;
            return Ok(live
                .provider()
                .aead_encrypt(live.native(), nonce, cipher.aad, plaintext)?);
        }

        let mut transform = CipherTransform::new(key, &cipher, Direction::Encrypt)?;
        transform.transform_final_block(plaintext)
    }

    /// Decrypts `ciphertext`.
    ///
    /// Bad PKCS#7 padding yields [`CryptoError::InvalidPadding`]; a GCM tag
    /// mismatch yields [`CryptoError::DecryptionFailed`].
    #[tracing::instrument(skip_all, fields(len = ciphertext.len()))]
    pub fn decrypt(
        &self,
        key: &CryptographicKey,
        params: &CipherParameters,
        ciphertext: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let descriptor = symmetric_descriptor(key)?;
        let cipher = params.resolve(descriptor)?;

        if cipher.mode == CipherMode::Gcm {
            let live = key.live_for(KeyCapability::Decrypt)?;
            let nonce = cipher.iv.ok_or(CryptoError::InvalidParameter)?;
            if ciphertext.len() < GCM_TAG_LEN {
                return Err(CryptoError::DecryptionFailed);
            }
            let (body, tag) = ciphertext.split_at(ciphertext.len() - GCM_TAG_LEN);
            return live
                .provider()
                .aead_decrypt(live.native(), nonce, cipher.aad, body, tag)
                .map_err(NativeError::into_decrypt_error);
        }

        let mut transform = CipherTransform::new(key, &cipher, Direction::Decrypt)?;
        transform.transform_final_block(ciphertext)
    }

    /// Streaming encryptor for block modes.
    pub fn create_encryptor(
        &self,
        key: &CryptographicKey,
        params: &CipherParameters,
    ) -> CryptoResult<CipherTransform> {
        let cipher = params.resolve(symmetric_descriptor(key)?)?;
        CipherTransform::new(key, &cipher, Direction::Encrypt)
    }

    /// Streaming decryptor for block modes.
    pub fn create_decryptor(
        &self,
        key: &CryptographicKey,
        params: &CipherParameters,
    ) -> CryptoResult<CipherTransform> {
        let cipher = params.resolve(symmetric_descriptor(key)?)?;
        CipherTransform::new(key, &cipher, Direction::Decrypt)
    }
}

fn symmetric_descriptor(key: &CryptographicKey) -> CryptoResult<&'static AlgorithmDescriptor> {
    let descriptor = key.live()?.descriptor();
    if descriptor.category() != AlgorithmCategory::Symmetric {
        Err(CryptoError::InvalidParameter)?;
    }
    Ok(descriptor)
}
