// Copyright (C) Microsoft Corporation. All rights reserved.

use openssl::derive::Deriver;
use openssl::encrypt::Decrypter;
use openssl::encrypt::Encrypter;
use openssl::hash::MessageDigest;
use openssl::pkey::HasPublic;
use openssl::pkey::PKeyRef;
use openssl::rsa::Padding;
use openssl::sign::RsaPssSaltlen;
use openssl::sign::Signer;
use openssl::sign::Verifier;

use super::*;

fn encryption_padding(algo: &AlgorithmDescriptor) -> NativeResult<Padding> {
    match algo.rsa_scheme() {
        Some(RsaScheme::Pkcs1Encrypt) => Ok(Padding::PKCS1),
        Some(RsaScheme::Oaep) => Ok(Padding::PKCS1_OAEP),
        _ => Err(unsupported("rsa encrypt", "not an RSA encryption algorithm")),
    }
}

pub(super) fn sign(algo: &AlgorithmDescriptor, key: &OsslKey, data: &[u8]) -> NativeResult<Vec<u8>> {
    let digest = message_digest(algo.hash())?;
    let mut signer = Signer::new(digest, key.private()?).native("sign init")?;

    match algo.rsa_scheme() {
        Some(RsaScheme::Pkcs1Sign) => signer.set_rsa_padding(Padding::PKCS1).native("sign init")?,
        Some(RsaScheme::Pss) => {
            signer.set_rsa_padding(Padding::PKCS1_PSS).native("sign init")?;
            signer
                .set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)
                .native("sign init")?;
            signer.set_rsa_mgf1_md(digest).native("sign init")?;
        }
        _ => {}
    }

    signer.sign_oneshot_to_vec(data).native("sign")
}

fn verify_with<T: HasPublic>(
    algo: &AlgorithmDescriptor,
    digest: MessageDigest,
    pkey: &PKeyRef<T>,
    data: &[u8],
    signature: &[u8],
) -> NativeResult<bool> {
    let mut verifier = Verifier::new(digest, pkey).native("verify init")?;

    match algo.rsa_scheme() {
        Some(RsaScheme::Pkcs1Sign) => verifier.set_rsa_padding(Padding::PKCS1).native("verify init")?,
        Some(RsaScheme::Pss) => {
            verifier.set_rsa_padding(Padding::PKCS1_PSS).native("verify init")?;
            verifier
                .set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)
                .native("verify init")?;
            verifier.set_rsa_mgf1_md(digest).native("verify init")?;
        }
        _ => {}
    }

    // Malformed signatures surface as errors from some OpenSSL versions.
    match verifier.verify_oneshot(signature, data) {
        Ok(valid) => Ok(valid),
        Err(openssl_error_stack) => {
            tracing::debug!(?openssl_error_stack, "signature rejected");
            Ok(false)
        }
    }
}

pub(super) fn verify(
    algo: &AlgorithmDescriptor,
    key: &OsslKey,
    data: &[u8],
    signature: &[u8],
) -> NativeResult<bool> {
    let digest = message_digest(algo.hash())?;
    with_public_pkey!(key, pkey => verify_with(algo, digest, pkey, data, signature))
}

fn encrypt_with<T: HasPublic>(
    algo: &AlgorithmDescriptor,
    pkey: &PKeyRef<T>,
    data: &[u8],
) -> NativeResult<Vec<u8>> {
    let padding = encryption_padding(algo)?;
    let mut encrypter = Encrypter::new(pkey).native("rsa encrypt")?;
    encrypter.set_rsa_padding(padding).native("rsa encrypt")?;
    if padding == Padding::PKCS1_OAEP {
        let digest = message_digest(algo.hash())?;
        encrypter.set_rsa_oaep_md(digest).native("rsa encrypt")?;
        encrypter.set_rsa_mgf1_md(digest).native("rsa encrypt")?;
    }

    let len = encrypter.encrypt_len(data).native("rsa encrypt")?;
    let mut output = vec![0u8; len];
    let count = encrypter.encrypt(data, &mut output).native("rsa encrypt")?;
    output.truncate(count);
    Ok(output)
}

pub(super) fn encrypt(algo: &AlgorithmDescriptor, key: &OsslKey, data: &[u8]) -> NativeResult<Vec<u8>> {
    with_public_pkey!(key, pkey => encrypt_with(algo, pkey, data))
}

pub(super) fn decrypt(algo: &AlgorithmDescriptor, key: &OsslKey, data: &[u8]) -> NativeResult<Vec<u8>> {
    let padding = encryption_padding(algo)?;
    let mut decrypter = Decrypter::new(key.private()?).native("rsa decrypt")?;
    decrypter.set_rsa_padding(padding).native("rsa decrypt")?;
    if padding == Padding::PKCS1_OAEP {
        let digest = message_digest(algo.hash())?;
        decrypter.set_rsa_oaep_md(digest).native("rsa decrypt")?;
        decrypter.set_rsa_mgf1_md(digest).native("rsa decrypt")?;
    }

    let len = decrypter.decrypt_len(data).native_decrypt("rsa decrypt")?;
    let mut output = vec![0u8; len];
    let count = decrypter
        .decrypt(data, &mut output)
        .native_decrypt("rsa decrypt")?;
    output.truncate(count);
    Ok(output)
}

pub(super) fn agree(local: &OsslKey, peer: &OsslKey) -> NativeResult<Vec<u8>> {
    let mut deriver = Deriver::new(local.private()?).native("ecdh init")?;
    with_public_pkey!(peer, pkey => deriver.set_peer(pkey).native("ecdh set peer"))?;
    deriver.derive_to_vec().native("ecdh derive")
}

pub(super) fn pbkdf2(
    algo: &AlgorithmDescriptor,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output: &mut [u8],
) -> NativeResult<()> {
    let digest = message_digest(algo.hash())?;
    openssl::pkcs5::pbkdf2_hmac(password, salt, iterations as usize, digest, output).native("pbkdf2")
}
