// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Encodings accepted for public keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum PublicKeyBlobFormat {
    /// DER `SubjectPublicKeyInfo` (RSA and EC).
    X509SubjectPublicKeyInfo,
    /// DER `RSAPublicKey` (RSA only).
    Pkcs1RsaPublicKey,
    /// `BCRYPT_RSAKEY_BLOB` / `BCRYPT_ECCKEY_BLOB` public layout.
    BCryptPublicKey,
    /// `04 || X || Y` (EC only).
    X962Uncompressed,
}

impl PublicKeyBlobFormat {
    /// Whether keys of `descriptor` can be carried in this format.
    pub(crate) fn fits(self, descriptor: &AlgorithmDescriptor) -> bool {
        match self {
            PublicKeyBlobFormat::X509SubjectPublicKeyInfo | PublicKeyBlobFormat::BCryptPublicKey => {
                descriptor.is_rsa() || descriptor.is_ecc()
            }
            PublicKeyBlobFormat::Pkcs1RsaPublicKey => descriptor.is_rsa(),
            PublicKeyBlobFormat::X962Uncompressed => descriptor.is_ecc(),
        }
    }
}

/// Encodings accepted for private keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum PrivateKeyBlobFormat {
    /// DER `PrivateKeyInfo` (RSA and EC).
    Pkcs8PrivateKeyInfo,
    /// DER `RSAPrivateKey` (RSA only).
    Pkcs1RsaPrivateKey,
}

impl PrivateKeyBlobFormat {
    pub(crate) fn fits(self, descriptor: &AlgorithmDescriptor) -> bool {
        match self {
            PrivateKeyBlobFormat::Pkcs8PrivateKeyInfo => descriptor.is_rsa() || descriptor.is_ecc(),
            PrivateKeyBlobFormat::Pkcs1RsaPrivateKey => descriptor.is_rsa(),
        }
    }
}

/// Encoded public key together with its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyBlob {
    format: PublicKeyBlobFormat,
    bytes: Vec<u8>,
}

impl PublicKeyBlob {
    pub fn new(format: PublicKeyBlobFormat, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            format,
            bytes: bytes.into(),
        }
    }

    pub fn format(&self) -> PublicKeyBlobFormat {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for PublicKeyBlob {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
