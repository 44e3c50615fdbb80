// Copyright (C) Microsoft Corporation. All rights reserved.

//! Portable cryptography over native platform providers.
//!
//! Callers name algorithms with portable identifiers ([`AlgorithmId`]) and
//! exchange keys in standard blob formats. The crate resolves identifiers to
//! whatever the native provider calls them, applies the behaviors some
//! providers lack (PKCS#7 padding, chunked transforms, stream adapters) and
//! reports every native failure through one error taxonomy, [`CryptoError`].
//!
//! - **Symmetric**: AES in CBC, ECB, CTR and GCM modes
//! - **Asymmetric**: RSA encryption/signatures, ECDSA on NIST curves
//! - **Hash / MAC**: SHA-1/2 digests and HMAC
//! - **Key derivation**: PBKDF2
//! - **Key agreement**: ECDH on NIST curves
//! - **Streams**: [`CryptoTransform`] and [`CryptoStream`]
//!
//! # Platform Support
//!
//! The native provider is selected at build time:
//! - Unix: OpenSSL
//!
//! # Example
//!
//! ```no_run
//! use portable_crypto::*;
//!
//! let crypto = Crypto::global();
//! let digest = crypto.hash().hash(AlgorithmId::Sha256, b"abc")?;
//! assert_eq!(digest.len(), 32);
//! # Ok::<(), CryptoError>(())
//! ```

mod asymmetric;
mod config;
mod context;
mod ecdh;
mod hash;
mod kdf;
mod key;
mod provider;
mod rand;
mod registry;
mod stream;
mod symmetric;

use std::sync::Arc;

pub use asymmetric::*;
pub use config::*;
pub use context::*;
pub use ecdh::*;
pub use hash::*;
pub use kdf::*;
pub use key::*;
pub use provider::*;
pub use rand::*;
pub use registry::*;
pub use stream::*;
pub use symmetric::*;
use thiserror::Error;
use zeroize::Zeroizing;

/// Portable error taxonomy.
///
/// Every native provider failure is normalized into one of these variants
/// before it reaches the caller; provider error types never cross the API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The identifier is unknown, or the active provider cannot map it.
    #[error("algorithm not supported by the native provider")]
    UnsupportedAlgorithm,

    /// Key size is outside the algorithm's allowed set.
    #[error("invalid key size")]
    InvalidKeySize,

    /// Malformed input: wrong IV length, mode mismatch, unaligned data,
    /// unparseable blob, wrong algorithm category and similar.
    #[error("invalid parameter")]
    InvalidParameter,

    /// The key does not permit the requested operation.
    #[error("key usage does not permit this operation")]
    InvalidKeyUsage,

    /// PKCS#7 padding did not verify after decryption.
    #[error("invalid padding")]
    InvalidPadding,

    /// Authenticated or asymmetric decryption rejected the input.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Key material cannot be exported.
    #[error("key is not exportable")]
    NotExportable,

    /// Key agreement between keys on different curves.
    #[error("key agreement curves do not match")]
    CurveMismatch,

    /// The object was finalized or released.
    #[error("object is finalized or released")]
    InvalidState,

    /// Unclassified native provider failure.
    #[error("native provider failure: {0}")]
    NativeFailure(String),
}

/// Result alias used across the crate.
pub type CryptoResult<T> = Result<T, CryptoError>;
