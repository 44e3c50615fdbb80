// Copyright (C) Microsoft Corporation. All rights reserved.

//! Hashing and HMAC.
//!
//! Both engines hand out [`CryptographicHash`], an incremental digest that
//! also implements [`CryptoTransform`] so it can sit behind a
//! [`CryptoStream`].

use super::*;

/// Message digests.
pub struct HashEngine<'a> {
    crypto: &'a Crypto,
}

impl<'a> HashEngine<'a> {
    pub(crate) fn new(crypto: &'a Crypto) -> Self {
        Self { crypto }
    }

    /// Digest length of `algorithm` in bytes.
    pub fn hash_length(&self, algorithm: AlgorithmId) -> CryptoResult<usize> {
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(algorithm, AlgorithmCategory::Hash)?;
        Ok(descriptor.output_len())
    }

    /// One-shot digest of `data`.
    #[tracing::instrument(skip(self, data), fields(len = data.len()), err)]
    pub fn hash(&self, algorithm: AlgorithmId, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut hash = self.create_hash(algorithm)?;
        hash.append(data)?;
        hash.finalize()
    }

    /// Incremental digest.
    pub fn create_hash(&self, algorithm: AlgorithmId) -> CryptoResult<CryptographicHash> {
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(algorithm, AlgorithmCategory::Hash)?;
        CryptographicHash::new(descriptor, Arc::clone(self.crypto.provider()), None)
    }
}

/// HMAC keys and tags.
pub struct MacEngine<'a> {
    crypto: &'a Crypto,
}

impl<'a> MacEngine<'a> {
    pub(crate) fn new(crypto: &'a Crypto) -> Self {
        Self { crypto }
    }

    /// Wraps `material` as a MAC key. Any non-empty length is accepted.
    #[tracing::instrument(skip_all, fields(%algorithm), err)]
    pub fn create_key(&self, algorithm: AlgorithmId, material: &[u8]) -> CryptoResult<CryptographicKey> {
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(algorithm, AlgorithmCategory::Mac)?;
        self.crypto
            .config()
            .check_key_bits(descriptor, material.len() * 8)?;
        let native = self.crypto.provider().import_secret(descriptor, material)?;
        Ok(self.crypto.wrap_key(descriptor, native))
    }

    /// Random MAC key; `None` picks the digest length.
    pub fn generate_key(
        &self,
        algorithm: AlgorithmId,
        bits: Option<usize>,
    ) -> CryptoResult<CryptographicKey> {
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(algorithm, AlgorithmCategory::Mac)?;
        let bits = bits.unwrap_or(descriptor.default_key_bits());
        self.crypto.config().check_key_bits(descriptor, bits)?;

        let mut material = Zeroizing::new(vec![0u8; bits / 8]);
        self.crypto.provider().fill_random(&mut material)?;
        self.create_key(algorithm, &material)
    }

    /// Tag length of `algorithm` in bytes.
    pub fn mac_length(&self, algorithm: AlgorithmId) -> CryptoResult<usize> {
        let descriptor = self
            .crypto
            .registry()
            .resolve_in(algorithm, AlgorithmCategory::Mac)?;
        Ok(descriptor.output_len())
    }

    /// One-shot tag over `data`.
    #[tracing::instrument(skip_all, fields(len = data.len()), err)]
    pub fn sign(&self, key: &CryptographicKey, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut mac = self.create_hash(key)?;
        mac.append(data)?;
        mac.finalize()
    }

    /// Recomputes the tag and compares it in constant time.
    #[tracing::instrument(skip_all, fields(len = data.len()))]
    pub fn verify(&self, key: &CryptographicKey, data: &[u8], tag: &[u8]) -> CryptoResult<bool> {
        key.live_for(KeyCapability::Verify)?;
        let mut mac = CryptographicHash::for_key(key)?;
        mac.append(data)?;
        let expected = mac.finalize()?;
        Ok(constant_time_eq(&expected, tag))
    }

    /// Incremental MAC under `key`.
    pub fn create_hash(&self, key: &CryptographicKey) -> CryptoResult<CryptographicHash> {
        key.live_for(KeyCapability::Sign)?;
        CryptographicHash::for_key(key)
    }
}

/// Incremental hash or MAC computation.
///
/// [`CryptographicHash::finalize`] ends the computation; later calls fail
/// with [`CryptoError::InvalidState`] until [`CryptoTransform::reset`].
pub struct CryptographicHash {
    descriptor: &'static AlgorithmDescriptor,
    provider: Arc<dyn NativeProvider>,
    key: Option<CryptographicKey>,
    native: Option<Box<dyn NativeDigest>>,
    value: Option<Vec<u8>>,
}

impl CryptographicHash {
    fn new(
        descriptor: &'static AlgorithmDescriptor,
        provider: Arc<dyn NativeProvider>,
        key: Option<CryptographicKey>,
    ) -> CryptoResult<Self> {
        let mut hash = Self {
            descriptor,
            provider,
            key,
            native: None,
            value: None,
        };
        hash.native = Some(hash.open()?);
        Ok(hash)
    }

    fn for_key(key: &CryptographicKey) -> CryptoResult<Self> {
        let (descriptor, provider) = {
            let live = key.live()?;
            (live.descriptor(), Arc::clone(live.provider()))
        };
        if descriptor.category() != AlgorithmCategory::Mac {
            Err(CryptoError::InvalidParameter)?;
        }
        Self::new(descriptor, provider, Some(key.clone()))
    }

    fn open(&self) -> CryptoResult<Box<dyn NativeDigest>> {
        match &self.key {
            None => Ok(self.provider.create_digest(self.descriptor)?),
            Some(key) => {
                let live = key.live()?;
                Ok(self.provider.create_mac(self.descriptor, live.native())?)
            }
        }
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.descriptor.id()
    }

    /// Digest or tag length in bytes.
    pub fn output_len(&self) -> usize {
        self.descriptor.output_len()
    }

    /// Digest produced by the last finalization, if any.
    pub fn hash_value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    pub fn append(&mut self, data: &[u8]) -> CryptoResult<()> {
        let native = self.native.as_mut().ok_or(CryptoError::InvalidState)?;
        Ok(native.update(data)?)
    }

    pub fn finalize(&mut self) -> CryptoResult<Vec<u8>> {
        let mut native = self.native.take().ok_or(CryptoError::InvalidState)?;
        let value = native.finish()?;
        self.value = Some(value.clone());
        Ok(value)
    }
}

impl CryptoTransform for CryptographicHash {
    fn input_block_size(&self) -> usize {
        1
    }

    fn output_block_size(&self) -> usize {
        1
    }

    fn can_transform_multiple_blocks(&self) -> bool {
        true
    }

    fn can_reuse_transform(&self) -> bool {
        true
    }

    /// Feeds `input` to the digest and passes it through unchanged.
    fn transform_block(&mut self, input: &[u8]) -> CryptoResult<Vec<u8>> {
        self.append(input)?;
        Ok(input.to_vec())
    }

    /// Feeds `input`, finalizes, and passes `input` through. The digest is
    /// available from [`CryptographicHash::hash_value`].
    fn transform_final_block(&mut self, input: &[u8]) -> CryptoResult<Vec<u8>> {
        self.append(input)?;
        self.finalize()?;
        Ok(input.to_vec())
    }

    fn reset(&mut self) -> CryptoResult<()> {
        self.native = Some(self.open()?);
        self.value = None;
        Ok(())
    }
}

impl std::fmt::Debug for CryptographicHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptographicHash")
            .field("algorithm", &self.descriptor.id())
            .field("keyed", &self.key.is_some())
            .field("finalized", &self.native.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests;
