// Copyright (C) Microsoft Corporation. All rights reserved.

//! OpenSSL native provider.

mod asym;
mod cipher;
mod digest;
mod error;
mod key;

use self::asym::*;
use self::cipher::*;
use self::digest::*;
use self::error::*;
use self::key::*;
use openssl::ec::EcGroup;
use openssl::hash::MessageDigest;
use strum::EnumCount;

use super::*;

/// How the provider confirms a native algorithm is present at load time.
enum Probe {
    /// Always compiled into libcrypto.
    Builtin,
    Digest(&'static str),
    Curve(EccCurve),
}

const NATIVE_NAMES: &[(AlgorithmId, &str, Probe)] = &[
    (AlgorithmId::Aes, "AES", Probe::Builtin),
    (AlgorithmId::AesCbc, "AES-CBC", Probe::Builtin),
    (AlgorithmId::AesCbcPkcs7, "AES-CBC", Probe::Builtin),
    (AlgorithmId::AesEcb, "AES-ECB", Probe::Builtin),
    (AlgorithmId::AesEcbPkcs7, "AES-ECB", Probe::Builtin),
    (AlgorithmId::AesCtr, "AES-CTR", Probe::Builtin),
    (AlgorithmId::AesGcm, "id-aes-GCM", Probe::Builtin),
    (AlgorithmId::RsaPkcs1, "RSA/PKCS1", Probe::Builtin),
    (AlgorithmId::RsaOaepSha1, "RSA/OAEP/SHA1", Probe::Digest("SHA1")),
    (AlgorithmId::RsaOaepSha256, "RSA/OAEP/SHA256", Probe::Digest("SHA256")),
    (AlgorithmId::RsaSignPkcs1Sha1, "RSA-SHA1", Probe::Digest("SHA1")),
    (AlgorithmId::RsaSignPkcs1Sha256, "RSA-SHA256", Probe::Digest("SHA256")),
    (AlgorithmId::RsaSignPkcs1Sha384, "RSA-SHA384", Probe::Digest("SHA384")),
    (AlgorithmId::RsaSignPkcs1Sha512, "RSA-SHA512", Probe::Digest("SHA512")),
    (AlgorithmId::RsaSignPssSha256, "RSASSA-PSS/SHA256", Probe::Digest("SHA256")),
    (AlgorithmId::EcdsaP256Sha256, "ecdsa-with-SHA256", Probe::Curve(EccCurve::P256)),
    (AlgorithmId::EcdsaP384Sha384, "ecdsa-with-SHA384", Probe::Curve(EccCurve::P384)),
    (AlgorithmId::EcdsaP521Sha512, "ecdsa-with-SHA512", Probe::Curve(EccCurve::P521)),
    (AlgorithmId::Sha1, "SHA1", Probe::Digest("SHA1")),
    (AlgorithmId::Sha256, "SHA256", Probe::Digest("SHA256")),
    (AlgorithmId::Sha384, "SHA384", Probe::Digest("SHA384")),
    (AlgorithmId::Sha512, "SHA512", Probe::Digest("SHA512")),
    (AlgorithmId::HmacSha1, "HMAC-SHA1", Probe::Digest("SHA1")),
    (AlgorithmId::HmacSha256, "HMAC-SHA256", Probe::Digest("SHA256")),
    (AlgorithmId::HmacSha384, "HMAC-SHA384", Probe::Digest("SHA384")),
    (AlgorithmId::HmacSha512, "HMAC-SHA512", Probe::Digest("SHA512")),
    (AlgorithmId::Pbkdf2Sha1, "PBKDF2-SHA1", Probe::Digest("SHA1")),
    (AlgorithmId::Pbkdf2Sha256, "PBKDF2-SHA256", Probe::Digest("SHA256")),
    (AlgorithmId::Pbkdf2Sha384, "PBKDF2-SHA384", Probe::Digest("SHA384")),
    (AlgorithmId::Pbkdf2Sha512, "PBKDF2-SHA512", Probe::Digest("SHA512")),
    (AlgorithmId::EcdhP256, "ECDH/prime256v1", Probe::Curve(EccCurve::P256)),
    (AlgorithmId::EcdhP384, "ECDH/secp384r1", Probe::Curve(EccCurve::P384)),
    (AlgorithmId::EcdhP521, "ECDH/secp521r1", Probe::Curve(EccCurve::P521)),
];

impl Probe {
    fn available(&self) -> bool {
        match self {
            Probe::Builtin => true,
            Probe::Digest(name) => MessageDigest::from_name(name).is_some(),
            Probe::Curve(curve) => EcGroup::from_curve_name(curve_nid(*curve)).is_ok(),
        }
    }
}

/// Native provider backed by the system libcrypto.
pub struct OsslProvider {
    names: [Option<&'static str>; AlgorithmId::COUNT],
}

impl Default for OsslProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OsslProvider {
    /// Resolves every native name once; anything libcrypto lacks stays
    /// unmapped.
    pub fn new() -> Self {
        openssl::init();

        let mut names = [None; AlgorithmId::COUNT];
        for (id, name, probe) in NATIVE_NAMES {
            if probe.available() {
                names[*id as usize] = Some(*name);
            } else {
                tracing::warn!(algorithm = %id, native = name, "native algorithm unavailable");
            }
        }

        tracing::debug!(version = openssl::version::version(), "OpenSSL provider initialized");
        Self { names }
    }
}

impl std::fmt::Debug for OsslProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsslProvider")
            .field("mapped", &self.names.iter().flatten().count())
            .finish()
    }
}

impl NativeProvider for OsslProvider {
    fn name(&self) -> &'static str {
        "openssl"
    }

    fn native_name(&self, id: AlgorithmId) -> Option<&'static str> {
        self.names[id as usize]
    }

    fn fill_random(&self, buf: &mut [u8]) -> NativeResult<()> {
        openssl::rand::rand_bytes(buf).native("random")
    }

    fn import_secret(
        &self,
        _algo: &AlgorithmDescriptor,
        material: &[u8],
    ) -> NativeResult<Box<dyn NativeKey>> {
        Ok(Box::new(OsslKey::Secret(Zeroizing::new(material.to_vec()))))
    }

    fn export_secret(&self, key: &dyn NativeKey) -> NativeResult<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(ossl_key(key)?.secret()?.to_vec()))
    }

    fn generate_key_pair(
        &self,
        algo: &AlgorithmDescriptor,
        bits: usize,
    ) -> NativeResult<Box<dyn NativeKey>> {
        Ok(Box::new(generate(algo, bits)?))
    }

    fn import_public_key(
        &self,
        algo: &AlgorithmDescriptor,
        blob: &[u8],
        format: PublicKeyBlobFormat,
    ) -> NativeResult<Box<dyn NativeKey>> {
        Ok(Box::new(import_public(algo, blob, format)?))
    }

    fn import_private_key(
        &self,
        algo: &AlgorithmDescriptor,
        blob: &[u8],
        format: PrivateKeyBlobFormat,
    ) -> NativeResult<Box<dyn NativeKey>> {
        Ok(Box::new(import_private(algo, blob, format)?))
    }

    fn export_public_key(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        format: PublicKeyBlobFormat,
    ) -> NativeResult<Vec<u8>> {
        let key = ossl_key(key)?;
        let curve = key.curve();
        with_public_pkey!(key, pkey => export_public(algo, pkey, curve, format))
    }

    fn export_private_key(
        &self,
        key: &dyn NativeKey,
        format: PrivateKeyBlobFormat,
    ) -> NativeResult<Zeroizing<Vec<u8>>> {
        export_private(ossl_key(key)?.private()?, format)
    }

    fn public_key(&self, key: &dyn NativeKey) -> NativeResult<Box<dyn NativeKey>> {
        Ok(Box::new(public_half(ossl_key(key)?)?))
    }

    fn public_key_curve(
        &self,
        blob: &[u8],
        format: PublicKeyBlobFormat,
    ) -> NativeResult<Option<EccCurve>> {
        blob_curve(blob, format)
    }

    fn create_digest(&self, algo: &AlgorithmDescriptor) -> NativeResult<Box<dyn NativeDigest>> {
        Ok(Box::new(OsslDigest::new(algo)?))
    }

    fn create_mac(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
    ) -> NativeResult<Box<dyn NativeDigest>> {
        Ok(Box::new(OsslHmac::new(algo, ossl_key(key)?.secret()?)?))
    }

    fn create_cipher(
        &self,
        mode: CipherMode,
        key: &dyn NativeKey,
        direction: Direction,
        iv: Option<&[u8]>,
    ) -> NativeResult<Box<dyn NativeCipher>> {
        let secret = ossl_key(key)?.secret()?;
        Ok(Box::new(OsslCipher::new(mode, secret, direction, iv)?))
    }

    fn aead_encrypt(
        &self,
        key: &dyn NativeKey,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> NativeResult<Vec<u8>> {
        gcm_encrypt(ossl_key(key)?.secret()?, nonce, aad, plaintext)
    }

    fn aead_decrypt(
        &self,
        key: &dyn NativeKey,
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> NativeResult<Vec<u8>> {
        gcm_decrypt(ossl_key(key)?.secret()?, nonce, aad, ciphertext, tag)
    }

    fn sign(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        data: &[u8],
    ) -> NativeResult<Vec<u8>> {
        sign(algo, ossl_key(key)?, data)
    }

    fn verify(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        data: &[u8],
        signature: &[u8],
    ) -> NativeResult<bool> {
        verify(algo, ossl_key(key)?, data, signature)
    }

    fn encrypt(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        data: &[u8],
    ) -> NativeResult<Vec<u8>> {
        encrypt(algo, ossl_key(key)?, data)
    }

    fn decrypt(
        &self,
        algo: &AlgorithmDescriptor,
        key: &dyn NativeKey,
        data: &[u8],
    ) -> NativeResult<Vec<u8>> {
        decrypt(algo, ossl_key(key)?, data)
    }

    fn agree(&self, local: &dyn NativeKey, peer: &dyn NativeKey) -> NativeResult<Vec<u8>> {
        agree(ossl_key(local)?, ossl_key(peer)?)
    }

    fn pbkdf2(
        &self,
        algo: &AlgorithmDescriptor,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        output: &mut [u8],
    ) -> NativeResult<()> {
        pbkdf2(algo, password, salt, iterations, output)
    }
}
