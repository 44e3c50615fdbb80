// Copyright (C) Microsoft Corporation. All rights reserved.

//! Portable algorithm identifiers and the per-provider registry that maps
//! them onto native algorithm names.

mod descriptor;

pub use descriptor::*;
use strum::EnumCount;
use strum::IntoEnumIterator;

use super::*;

/// Portable algorithm identifier.
///
/// The string form (`Display`/`FromStr`) is the provider-neutral name, e.g.
/// `"AES-CBC-PKCS7"` or `"ECDSA-P256-SHA256"`. Parsing is ASCII
/// case-insensitive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    strum_macros::EnumCount,
    strum_macros::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum AlgorithmId {
    /// AES with mode and padding chosen by [`CipherParameters`].
    #[strum(serialize = "AES")]
    Aes,
    #[strum(serialize = "AES-CBC")]
    AesCbc,
    #[strum(serialize = "AES-CBC-PKCS7")]
    AesCbcPkcs7,
    #[strum(serialize = "AES-ECB")]
    AesEcb,
    #[strum(serialize = "AES-ECB-PKCS7")]
    AesEcbPkcs7,
    #[strum(serialize = "AES-CTR")]
    AesCtr,
    #[strum(serialize = "AES-GCM")]
    AesGcm,

    #[strum(serialize = "RSA-PKCS1")]
    RsaPkcs1,
    #[strum(serialize = "RSA-OAEP-SHA1")]
    RsaOaepSha1,
    #[strum(serialize = "RSA-OAEP-SHA256")]
    RsaOaepSha256,
    #[strum(serialize = "RSA-SIGN-PKCS1-SHA1")]
    RsaSignPkcs1Sha1,
    #[strum(serialize = "RSA-SIGN-PKCS1-SHA256")]
    RsaSignPkcs1Sha256,
    #[strum(serialize = "RSA-SIGN-PKCS1-SHA384")]
    RsaSignPkcs1Sha384,
    #[strum(serialize = "RSA-SIGN-PKCS1-SHA512")]
    RsaSignPkcs1Sha512,
    #[strum(serialize = "RSA-SIGN-PSS-SHA256")]
    RsaSignPssSha256,

    #[strum(serialize = "ECDSA-P256-SHA256")]
    EcdsaP256Sha256,
    #[strum(serialize = "ECDSA-P384-SHA384")]
    EcdsaP384Sha384,
    #[strum(serialize = "ECDSA-P521-SHA512")]
    EcdsaP521Sha512,

    #[strum(serialize = "SHA1")]
    Sha1,
    #[strum(serialize = "SHA256")]
    Sha256,
    #[strum(serialize = "SHA384")]
    Sha384,
    #[strum(serialize = "SHA512")]
    Sha512,

    #[strum(serialize = "HMAC-SHA1")]
    HmacSha1,
    #[strum(serialize = "HMAC-SHA256")]
    HmacSha256,
    #[strum(serialize = "HMAC-SHA384")]
    HmacSha384,
    #[strum(serialize = "HMAC-SHA512")]
    HmacSha512,

    #[strum(serialize = "PBKDF2-SHA1")]
    Pbkdf2Sha1,
    #[strum(serialize = "PBKDF2-SHA256")]
    Pbkdf2Sha256,
    #[strum(serialize = "PBKDF2-SHA384")]
    Pbkdf2Sha384,
    #[strum(serialize = "PBKDF2-SHA512")]
    Pbkdf2Sha512,

    #[strum(serialize = "ECDH-P256")]
    EcdhP256,
    #[strum(serialize = "ECDH-P384")]
    EcdhP384,
    #[strum(serialize = "ECDH-P521")]
    EcdhP521,
}

impl AlgorithmId {
    /// Static descriptor for this identifier.
    ///
    /// Descriptors exist for every identifier; whether the active provider
    /// supports it is a [`Registry`] question.
    pub fn descriptor(self) -> &'static AlgorithmDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Key agreement identifier for `curve`.
    pub fn ecdh(curve: EccCurve) -> Self {
        match curve {
            EccCurve::P256 => AlgorithmId::EcdhP256,
            EccCurve::P384 => AlgorithmId::EcdhP384,
            EccCurve::P521 => AlgorithmId::EcdhP521,
        }
    }
}

/// Algorithm table for one native provider.
///
/// Built once from the provider's native-name table; an identifier the
/// provider cannot map (or that [`CryptoConfig`] disables) resolves to
/// [`CryptoError::UnsupportedAlgorithm`].
pub struct Registry {
    provider: &'static str,
    native: [Option<&'static str>; AlgorithmId::COUNT],
}

impl Registry {
    pub(crate) fn new(provider: &dyn NativeProvider, config: &CryptoConfig) -> Self {
        let mut native = [None; AlgorithmId::COUNT];

        for id in AlgorithmId::iter() {
            if !config.permits(id) {
                tracing::debug!(algorithm = %id, "algorithm disabled by configuration");
                continue;
            }
            native[id as usize] = provider.native_name(id);
        }

        let registry = Self {
            provider: provider.name(),
            native,
        };
        tracing::debug!(
            provider = registry.provider,
            supported = registry.supported().count(),
            total = AlgorithmId::COUNT,
            "algorithm registry populated"
        );
        registry
    }

    /// Name of the native provider this registry was built for.
    pub fn provider_name(&self) -> &'static str {
        self.provider
    }

    /// Looks up the descriptor for `id`.
    pub fn resolve(&self, id: AlgorithmId) -> CryptoResult<&'static AlgorithmDescriptor> {
        match self.native[id as usize] {
            Some(_) => Ok(id.descriptor()),
            None => Err(CryptoError::UnsupportedAlgorithm),
        }
    }

    /// Looks up a descriptor by its portable name.
    pub fn resolve_name(&self, name: &str) -> CryptoResult<&'static AlgorithmDescriptor> {
        let id = name
            .parse::<AlgorithmId>()
            .map_err(|_| CryptoError::UnsupportedAlgorithm)?;
        self.resolve(id)
    }

    /// Native name the provider uses for `id`.
    pub fn native_name(&self, id: AlgorithmId) -> CryptoResult<&'static str> {
        self.native[id as usize].ok_or(CryptoError::UnsupportedAlgorithm)
    }

    pub fn is_supported(&self, id: AlgorithmId) -> bool {
        self.native[id as usize].is_some()
    }

    /// Identifiers usable through this registry, in declaration order.
    pub fn supported(&self) -> impl Iterator<Item = AlgorithmId> + '_ {
        AlgorithmId::iter().filter(|id| self.is_supported(*id))
    }

    /// Resolves `id` and checks it belongs to `category`.
    pub(crate) fn resolve_in(
        &self,
        id: AlgorithmId,
        category: AlgorithmCategory,
    ) -> CryptoResult<&'static AlgorithmDescriptor> {
        let descriptor = self.resolve(id)?;
        if descriptor.category() != category {
            tracing::debug!(algorithm = %id, ?category, "algorithm used with the wrong engine");
            Err(CryptoError::InvalidParameter)?;
        }
        Ok(descriptor)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("provider", &self.provider)
            .field("supported", &self.supported().collect::<Vec<_>>())
            .finish()
    }
}
