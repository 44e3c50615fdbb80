// Copyright (C) Microsoft Corporation. All rights reserved.

//! Seam between the portable core and a native crypto provider.
//!
//! A provider supplies raw primitives only: it never pads, never buffers
//! partial blocks and never decides policy. Everything it reports goes
//! through [`NativeError`] so the core can normalize it.

mod error;

use std::any::Any;
use std::fmt::Debug;

pub use error::*;
use zeroize::Zeroizing;

use super::*;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod ossl;
        pub use ossl::OsslProvider;

        /// Provider compiled in for the current target.
        pub type DefaultProvider = OsslProvider;
    } else {
        compile_error!("no native crypto provider is available for this target");
    }
}

/// Cipher direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Opaque native key handle.
pub trait NativeKey: Debug + Send + Sync {
    /// Key size in bits (modulus size for RSA, field size for EC).
    fn bits(&self) -> usize;

    /// Whether private (or secret) material is present.
    fn has_private(&self) -> bool;

    fn curve(&self) -> Option<EccCurve> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Running digest or MAC computation.
pub trait NativeDigest: Send {
    fn update(&mut self, data: &[u8]) -> NativeResult<()>;

    /// Produces the digest. The object must not be used afterwards.
    fn finish(&mut self) -> NativeResult<Vec<u8>>;
}

/// Raw block cipher context with padding disabled.
pub trait NativeCipher: Send {
    /// Granularity of [`NativeCipher::update`] input, in bytes.
    fn block_size(&self) -> usize;

    /// Whether one `update` call may carry more than one block.
    fn can_process_multiple_blocks(&self) -> bool {
        true
    }

    /// Appends the transform of `input` to `output`. `input` is a whole
    /// number of blocks except for the last call of a stream mode.
    fn update(&mut self, input: &[u8], output: &mut Vec<u8>) -> NativeResult<()>;

    /// Appends anything the native context still holds.
    fn finish(&mut self, output: &mut Vec<u8>) -> NativeResult<()>;
}

/// Native crypto provider.
///
/// Keys handed to a provider were created by the same provider; a foreign
/// key is reported as [`NativeErrorKind::InvalidKey`].
pub trait NativeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Native name for `id`, or `None` when the provider has no mapping.
    fn native_name(&self, id: AlgorithmId) -> Option<&'static str>;

    fn fill_random(&self, buf: &mut [u8]) -> NativeResult<()>;

    fn import_secret(
        &self,
        algo: &AlgorithmDescriptor,
        material: &[u8],
    ) -> NativeResult<Box<dyn NativeKey>>;

    fn export_secret(&self, key: &dyn NativeKey) -> NativeResult<Zeroizing<Vec<u8>>>;

    fn generate_key_pair(
        &self,
        algo: &AlgorithmDescriptor,
        bits: usize,
    ) -> NativeResult<Box<dyn NativeKey>>;

    fn import_public_key(
        &self,
        algo: &AlgorithmDescriptor,
        blob: &[u8],
        format: PublicKeyBlobFormat,
    ) -> NativeResult<Box<dyn NativeKey>>;

    fn import_private_key(
        &self,
        algo: &AlgorithmDescriptor,
        blob: &[u8],
        format: PrivateKeyBlobFormat,
    ) -> NativeResult<Box<dyn NativeKey>>;

    fn export_public_key(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        format: PublicKeyBlobFormat,
    ) -> NativeResult<Vec<u8>>;

    fn export_private_key(
        &self,
        key: &dyn NativeKey,
        format: PrivateKeyBlobFormat,
    ) -> NativeResult<Zeroizing<Vec<u8>>>;

    /// Public half of an asymmetric key as a new handle.
    fn public_key(&self, key: &dyn NativeKey) -> NativeResult<Box<dyn NativeKey>>;

    /// Curve of an encoded EC public key, `None` for non-EC blobs.
    fn public_key_curve(
        &self,
        blob: &[u8],
        format: PublicKeyBlobFormat,
    ) -> NativeResult<Option<EccCurve>>;

    fn create_digest(&self, algo: &AlgorithmDescriptor) -> NativeResult<Box<dyn NativeDigest>>;

    fn create_mac(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
    ) -> NativeResult<Box<dyn NativeDigest>>;

    fn create_cipher(
        &self,
        mode: CipherMode,
        key: &dyn NativeKey,
        direction: Direction,
        iv: Option<&[u8]>,
    ) -> NativeResult<Box<dyn NativeCipher>>;

    /// AES-GCM seal; returns `ciphertext || tag`.
    fn aead_encrypt(
        &self,
        key: &dyn NativeKey,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> NativeResult<Vec<u8>>;

    /// AES-GCM open of `ciphertext || tag`.
    fn aead_decrypt(
        &self,
        key: &dyn NativeKey,
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> NativeResult<Vec<u8>>;

    fn sign(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        data: &[u8],
    ) -> NativeResult<Vec<u8>>;

    /// `Ok(false)` for any signature that does not verify, malformed or not.
    fn verify(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        data: &[u8],
        signature: &[u8],
    ) -> NativeResult<bool>;

    fn encrypt(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        data: &[u8],
    ) -> NativeResult<Vec<u8>>;

    fn decrypt(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        data: &[u8],
    ) -> NativeResult<Vec<u8>>;

    /// Raw ECDH shared secret between `local` (private) and `peer`.
    fn agree(&self, local: &dyn NativeKey, peer: &dyn NativeKey) -> NativeResult<Vec<u8>>;

    fn pbkdf2(
        &self,
        algo: &AlgorithmDescriptor,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        output: &mut [u8],
    ) -> NativeResult<()>;
}
