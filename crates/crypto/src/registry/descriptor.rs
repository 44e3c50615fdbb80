// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Engine an algorithm belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmCategory {
    Symmetric,
    Asymmetric,
    Hash,
    Mac,
    KeyDerivation,
    KeyAgreement,
}

/// Block cipher chaining mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum CipherMode {
    #[strum(serialize = "CBC")]
    Cbc,
    #[strum(serialize = "ECB")]
    Ecb,
    #[strum(serialize = "CTR")]
    Ctr,
    #[strum(serialize = "GCM")]
    Gcm,
}

impl CipherMode {
    /// Modes that consume any input length without padding.
    pub fn is_stream(self) -> bool {
        matches!(self, CipherMode::Ctr | CipherMode::Gcm)
    }

    /// Initialization vector (or nonce) length, `0` when the mode takes none.
    pub fn iv_len(self, block_size: usize) -> usize {
        match self {
            CipherMode::Ecb => 0,
            CipherMode::Cbc | CipherMode::Ctr => block_size,
            CipherMode::Gcm => GCM_NONCE_LEN,
        }
    }
}

/// Symmetric padding applied by the portable core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaddingMode {
    #[default]
    None,
    Pkcs7,
}

/// Padding or signature scheme of an RSA algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsaScheme {
    Pkcs1Encrypt,
    Oaep,
    Pkcs1Sign,
    Pss,
}

/// Supported NIST prime curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum EccCurve {
    #[strum(serialize = "P-256")]
    P256,
    #[strum(serialize = "P-384")]
    P384,
    #[strum(serialize = "P-521")]
    P521,
}

impl EccCurve {
    /// Coordinate size in bytes (P-521 rounds up to 66).
    pub fn point_size(&self) -> usize {
        match self {
            EccCurve::P256 => 32,
            EccCurve::P384 => 48,
            EccCurve::P521 => 66,
        }
    }

    pub fn bit_size(&self) -> usize {
        match self {
            EccCurve::P256 => 256,
            EccCurve::P384 => 384,
            EccCurve::P521 => 521,
        }
    }

    /// Curve whose X9.62 uncompressed point (`04 || X || Y`) is `len` bytes.
    pub fn from_uncompressed_point_len(len: usize) -> Option<Self> {
        [EccCurve::P256, EccCurve::P384, EccCurve::P521]
            .into_iter()
            .find(|curve| 1 + 2 * curve.point_size() == len)
    }
}

impl TryFrom<usize> for EccCurve {
    type Error = CryptoError;

    fn try_from(bits: usize) -> Result<Self, Self::Error> {
        match bits {
            256 => Ok(EccCurve::P256),
            384 => Ok(EccCurve::P384),
            521 => Ok(EccCurve::P521),
            _ => Err(CryptoError::InvalidKeySize),
        }
    }
}

/// Key sizes (in bits) an algorithm accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySizes {
    /// Algorithm takes no key.
    None,
    Fixed(&'static [usize]),
    Range { min: usize, max: usize, step: usize },
    /// Any whole number of bytes, at least one.
    AnyBytes,
}

impl KeySizes {
    pub fn contains(&self, bits: usize) -> bool {
        match *self {
            KeySizes::None => false,
            KeySizes::Fixed(sizes) => sizes.contains(&bits),
            KeySizes::Range { min, max, step } => {
                (min..=max).contains(&bits) && (bits - min) % step == 0
            }
            KeySizes::AnyBytes => bits > 0 && bits % 8 == 0,
        }
    }
}

pub(crate) const AES_BLOCK_SIZE: usize = 16;
pub(crate) const GCM_NONCE_LEN: usize = 12;
pub(crate) const GCM_TAG_LEN: usize = 16;

const AES_KEY_SIZES: KeySizes = KeySizes::Fixed(&[128, 192, 256]);
const RSA_KEY_SIZES: KeySizes = KeySizes::Range {
    min: 512,
    max: 16384,
    step: 64,
};

/// Static capabilities of one portable algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmDescriptor {
    id: AlgorithmId,
    category: AlgorithmCategory,
    block_size: usize,
    key_sizes: KeySizes,
    default_key_bits: usize,
    output_len: usize,
    mode: Option<CipherMode>,
    padding: PaddingMode,
    rsa: Option<RsaScheme>,
    hash: Option<AlgorithmId>,
    curve: Option<EccCurve>,
}

impl AlgorithmDescriptor {
    const fn base(id: AlgorithmId, category: AlgorithmCategory) -> Self {
        Self {
            id,
            category,
            block_size: 1,
            key_sizes: KeySizes::None,
            default_key_bits: 0,
            output_len: 0,
            mode: None,
            padding: PaddingMode::None,
            rsa: None,
            hash: None,
            curve: None,
        }
    }

    const fn aes(id: AlgorithmId, mode: Option<CipherMode>, padding: PaddingMode) -> Self {
        Self {
            block_size: AES_BLOCK_SIZE,
            key_sizes: AES_KEY_SIZES,
            default_key_bits: 256,
            mode,
            padding,
            ..Self::base(id, AlgorithmCategory::Symmetric)
        }
    }

    const fn digest(id: AlgorithmId, output_len: usize) -> Self {
        Self {
            output_len,
            ..Self::base(id, AlgorithmCategory::Hash)
        }
    }

    const fn hmac(id: AlgorithmId, hash: AlgorithmId, output_len: usize) -> Self {
        Self {
            key_sizes: KeySizes::AnyBytes,
            default_key_bits: output_len * 8,
            output_len,
            hash: Some(hash),
            ..Self::base(id, AlgorithmCategory::Mac)
        }
    }

    const fn pbkdf2(id: AlgorithmId, hash: AlgorithmId) -> Self {
        Self {
            hash: Some(hash),
            ..Self::base(id, AlgorithmCategory::KeyDerivation)
        }
    }

    const fn rsa(id: AlgorithmId, scheme: RsaScheme, hash: Option<AlgorithmId>) -> Self {
        Self {
            key_sizes: RSA_KEY_SIZES,
            default_key_bits: 2048,
            rsa: Some(scheme),
            hash,
            ..Self::base(id, AlgorithmCategory::Asymmetric)
        }
    }

    const fn ecdsa(id: AlgorithmId, curve: EccCurve, bits: &'static [usize], hash: AlgorithmId) -> Self {
        Self {
            key_sizes: KeySizes::Fixed(bits),
            default_key_bits: bits[0],
            hash: Some(hash),
            curve: Some(curve),
            ..Self::base(id, AlgorithmCategory::Asymmetric)
        }
    }

    const fn ecdh(id: AlgorithmId, curve: EccCurve, bits: &'static [usize]) -> Self {
        Self {
            key_sizes: KeySizes::Fixed(bits),
            default_key_bits: bits[0],
            curve: Some(curve),
            ..Self::base(id, AlgorithmCategory::KeyAgreement)
        }
    }

    pub fn id(&self) -> AlgorithmId {
        self.id
    }

    pub fn category(&self) -> AlgorithmCategory {
        self.category
    }

    /// Cipher block size in bytes; `1` for non-block algorithms.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn key_sizes(&self) -> KeySizes {
        self.key_sizes
    }

    pub fn default_key_bits(&self) -> usize {
        self.default_key_bits
    }

    /// Digest or tag length in bytes, `0` when not applicable.
    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// Fixed chaining mode; `None` for plain `AES` and non-ciphers.
    pub fn mode(&self) -> Option<CipherMode> {
        self.mode
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    pub fn rsa_scheme(&self) -> Option<RsaScheme> {
        self.rsa
    }

    /// Underlying hash of signature, MAC and KDF algorithms.
    pub fn hash(&self) -> Option<AlgorithmId> {
        self.hash
    }

    pub fn curve(&self) -> Option<EccCurve> {
        self.curve
    }

    pub fn is_rsa(&self) -> bool {
        self.rsa.is_some()
    }

    pub fn is_ecc(&self) -> bool {
        self.curve.is_some()
    }

    pub fn is_signature(&self) -> bool {
        matches!(self.rsa, Some(RsaScheme::Pkcs1Sign | RsaScheme::Pss))
            || (self.curve.is_some() && self.category == AlgorithmCategory::Asymmetric)
    }

    pub fn is_encryption(&self) -> bool {
        matches!(self.rsa, Some(RsaScheme::Pkcs1Encrypt | RsaScheme::Oaep))
    }

    /// Whether this algorithm touches SHA-1 anywhere.
    pub(crate) fn uses_sha1(&self) -> bool {
        self.id == AlgorithmId::Sha1 || self.hash == Some(AlgorithmId::Sha1)
    }
}

/// Descriptor table, indexed by `AlgorithmId as usize`.
pub(super) static DESCRIPTORS: [AlgorithmDescriptor; AlgorithmId::COUNT] = {
    use AlgorithmDescriptor as D;
    use AlgorithmId::*;
    use CipherMode::*;

    [
        D::aes(Aes, None, PaddingMode::None),
        D::aes(AesCbc, Some(Cbc), PaddingMode::None),
        D::aes(AesCbcPkcs7, Some(Cbc), PaddingMode::Pkcs7),
        D::aes(AesEcb, Some(Ecb), PaddingMode::None),
        D::aes(AesEcbPkcs7, Some(Ecb), PaddingMode::Pkcs7),
        D::aes(AesCtr, Some(Ctr), PaddingMode::None),
        D::aes(AesGcm, Some(Gcm), PaddingMode::None),
        D::rsa(RsaPkcs1, RsaScheme::Pkcs1Encrypt, None),
        D::rsa(RsaOaepSha1, RsaScheme::Oaep, Some(Sha1)),
        D::rsa(RsaOaepSha256, RsaScheme::Oaep, Some(Sha256)),
        D::rsa(RsaSignPkcs1Sha1, RsaScheme::Pkcs1Sign, Some(Sha1)),
        D::rsa(RsaSignPkcs1Sha256, RsaScheme::Pkcs1Sign, Some(Sha256)),
        D::rsa(RsaSignPkcs1Sha384, RsaScheme::Pkcs1Sign, Some(Sha384)),
        D::rsa(RsaSignPkcs1Sha512, RsaScheme::Pkcs1Sign, Some(Sha512)),
        D::rsa(RsaSignPssSha256, RsaScheme::Pss, Some(Sha256)),
        D::ecdsa(EcdsaP256Sha256, EccCurve::P256, &[256], Sha256),
        D::ecdsa(EcdsaP384Sha384, EccCurve::P384, &[384], Sha384),
        D::ecdsa(EcdsaP521Sha512, EccCurve::P521, &[521], Sha512),
        D::digest(Sha1, 20),
        D::digest(Sha256, 32),
        D::digest(Sha384, 48),
        D::digest(Sha512, 64),
        D::hmac(HmacSha1, Sha1, 20),
        D::hmac(HmacSha256, Sha256, 32),
        D::hmac(HmacSha384, Sha384, 48),
        D::hmac(HmacSha512, Sha512, 64),
        D::pbkdf2(Pbkdf2Sha1, Sha1),
        D::pbkdf2(Pbkdf2Sha256, Sha256),
        D::pbkdf2(Pbkdf2Sha384, Sha384),
        D::pbkdf2(Pbkdf2Sha512, Sha512),
        D::ecdh(EcdhP256, EccCurve::P256, &[256]),
        D::ecdh(EcdhP384, EccCurve::P384, &[384]),
        D::ecdh(EcdhP521, EccCurve::P521, &[521]),
    ]
};
