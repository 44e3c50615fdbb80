// Copyright (C) Microsoft Corporation. All rights reserved.

use std::io::Read;
use std::io::Write;

use portable_crypto::*;
use test_with_tracing::test;

#[test]
fn test_global_instance_is_shared() {
    let a = Crypto::global();
    let b = Crypto::global();
    assert!(std::ptr::eq(a, b));
    assert_eq!(a.config(), &CryptoConfig::default());
}

#[test]
fn test_random_output() {
    let crypto = Crypto::global();
    let a = crypto.random().generate(32).expect("random");
    let b = crypto.random().generate(32).expect("random");
    assert_eq!(a.len(), 32);
    assert_ne!(a, b);

    let mut buf = [0u8; 0];
    crypto.random().fill(&mut buf).expect("empty fill");
}

/// Two parties agree on a secret, stretch it with PBKDF2 and exchange an
/// AES-GCM message.
#[test]
fn test_key_agreement_to_authenticated_message() {
    let crypto = Crypto::global();

    let alice = crypto.ecdh().create_key_pair(EccCurve::P256).expect("alice");
    let bob = crypto.ecdh().create_key_pair(EccCurve::P256).expect("bob");
    let alice_blob = alice
        .export_public_key(PublicKeyBlobFormat::X962Uncompressed)
        .expect("alice blob");
    let bob_blob = bob
        .export_public_key(PublicKeyBlobFormat::BCryptPublicKey)
        .expect("bob blob");

    let bob_seen_by_alice = crypto.ecdh().public_key_from_blob(&bob_blob).expect("import");
    let alice_seen_by_bob = crypto.ecdh().public_key_from_blob(&alice_blob).expect("import");

    let params = KeyDerivationParameters::build_for_pbkdf2(b"session", 1000);
    let alice_secret = crypto
        .ecdh()
        .derive_shared_secret(&alice, &bob_seen_by_alice)
        .expect("derive");
    let bob_secret = crypto
        .ecdh()
        .derive_shared_secret(&bob, &alice_seen_by_bob)
        .expect("derive");

    let alice_key = crypto
        .kdf()
        .derive_key(AlgorithmId::Pbkdf2Sha256, &alice_secret, &params, AlgorithmId::AesGcm, 256)
        .expect("alice key");
    let bob_key = crypto
        .kdf()
        .derive_key(AlgorithmId::Pbkdf2Sha256, &bob_secret, &params, AlgorithmId::AesGcm, 256)
        .expect("bob key");

    let nonce = crypto.random().generate(12).expect("nonce");
    let cipher = CipherParameters::new()
        .with_iv(&nonce)
        .with_associated_data(b"v1");
    let sealed = crypto
        .symmetric()
        .encrypt(&alice_key, &cipher, b"meet at noon")
        .expect("seal");
    let opened = crypto
        .symmetric()
        .decrypt(&bob_key, &cipher, &sealed)
        .expect("open");
    assert_eq!(opened, b"meet at noon");
}

#[test]
fn test_signed_stream() {
    let crypto = Crypto::global();
    let signer = crypto
        .asymmetric()
        .generate_key_pair(AlgorithmId::EcdsaP256Sha256, None)
        .expect("signer");
    let payload: Vec<u8> = (0..20_000u32).map(|i| (i * 7) as u8).collect();

    // Encrypt through a write stream.
    let aes = crypto
        .symmetric()
        .generate_key(AlgorithmId::AesCbcPkcs7, 128)
        .expect("aes");
    let iv = crypto.random().generate(16).expect("iv");
    let params = CipherParameters::new().with_iv(&iv);
    let encryptor = crypto.symmetric().create_encryptor(&aes, &params).expect("encryptor");
    let mut writer = CryptoStream::new(Vec::new(), encryptor, CryptoStreamMode::Write);
    for piece in payload.chunks(1000) {
        writer.write_all(piece).expect("write");
    }
    let ciphertext = writer.finish().expect("finish");

    let signature = crypto.asymmetric().sign(&signer, &ciphertext).expect("sign");
    let verifier = signer.public_key().expect("public");
    assert_eq!(
        crypto.asymmetric().verify(&verifier, &ciphertext, &signature),
        Ok(true)
    );

    // Decrypt through a read stream.
    let decryptor = crypto.symmetric().create_decryptor(&aes, &params).expect("decryptor");
    let mut reader = CryptoStream::new(ciphertext.as_slice(), decryptor, CryptoStreamMode::Read);
    let mut recovered = Vec::new();
    reader.read_to_end(&mut recovered).expect("read");
    assert_eq!(recovered, payload);
}

#[test]
fn test_keys_cross_instances_of_the_same_provider() {
    let strict = Crypto::new(CryptoConfig::default().with_key_export(false));
    let relaxed = Crypto::global();

    let key = strict
        .asymmetric()
        .generate_key_pair(AlgorithmId::RsaSignPkcs1Sha256, Some(1024))
        .expect("generate");
    let signature = strict.asymmetric().sign(&key, b"doc").expect("sign");

    // Usage is fixed at creation, whichever engine later sees the key.
    assert_eq!(
        relaxed
            .asymmetric()
            .export_private_key(&key, PrivateKeyBlobFormat::Pkcs8PrivateKeyInfo)
            .map(|_| ()),
        Err(CryptoError::NotExportable)
    );
    assert_eq!(relaxed.asymmetric().verify(&key, b"doc", &signature), Ok(true));
}

#[test]
fn test_errors_render() {
    assert_eq!(CryptoError::InvalidPadding.to_string(), "invalid padding");
    assert!(CryptoError::NativeFailure("boom".into())
        .to_string()
        .contains("boom"));
}

#[test]
fn test_names_resolve_through_registry() {
    let crypto = Crypto::global();
    let descriptor = crypto
        .registry()
        .resolve_name("aes-gcm")
        .expect("resolve");
    assert_eq!(descriptor.id(), AlgorithmId::AesGcm);
    assert_eq!(descriptor.mode(), Some(CipherMode::Gcm));
    assert!(crypto.registry().native_name(AlgorithmId::AesGcm).is_ok());
}
