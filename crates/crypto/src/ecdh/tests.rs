// Copyright (C) Microsoft Corporation. All rights reserved.

use test_with_tracing::test;

use super::*;

fn crypto() -> Crypto {
    Crypto::new(CryptoConfig::default())
}

#[test]
fn test_both_sides_agree() {
    let crypto = crypto();
    for curve in [EccCurve::P256, EccCurve::P384, EccCurve::P521] {
        let alice = crypto.ecdh().create_key_pair(curve).expect("alice");
        let bob = crypto.ecdh().create_key_pair(curve).expect("bob");
        let alice_public = alice.public_key().expect("alice public");
        let bob_public = bob.public_key().expect("bob public");

        let a = crypto
            .ecdh()
            .derive_shared_secret(&alice, &bob_public)
            .expect("alice derive");
        let b = crypto
            .ecdh()
            .derive_shared_secret(&bob, &alice_public)
            .expect("bob derive");

        assert_eq!(a, b, "{curve}");
        assert_eq!(a.len(), curve.point_size(), "{curve}");
    }
}

#[test]
fn test_peer_key_from_every_blob_format() {
    let crypto = crypto();
    let alice = crypto.ecdh().create_key_pair(EccCurve::P384).expect("alice");
    let bob = crypto.ecdh().create_key_pair(EccCurve::P384).expect("bob");
    let expected = crypto
        .ecdh()
        .derive_shared_secret(&alice, &bob.public_key().expect("public"))
        .expect("derive");

    for format in [
        PublicKeyBlobFormat::X962Uncompressed,
        PublicKeyBlobFormat::X509SubjectPublicKeyInfo,
        PublicKeyBlobFormat::BCryptPublicKey,
    ] {
        let blob = bob.export_public_key(format).expect("export");
        assert_eq!(blob.format(), format);

        let peer = crypto.ecdh().public_key_from_blob(&blob).expect("import");
        assert_eq!(peer.algorithm(), AlgorithmId::EcdhP384, "{format}");
        assert_eq!(peer.has_private_key(), Ok(false));

        let secret = crypto
            .ecdh()
            .derive_shared_secret(&alice, &peer)
            .expect("derive");
        assert_eq!(secret, expected, "{format}");
    }
}

#[test]
fn test_uncompressed_point_layout() {
    let crypto = crypto();
    let key = crypto.ecdh().create_key_pair(EccCurve::P256).expect("key");
    let blob = key
        .export_public_key(PublicKeyBlobFormat::X962Uncompressed)
        .expect("export");

    assert_eq!(blob.as_bytes().len(), 65);
    assert_eq!(blob.as_bytes()[0], 0x04);
}

#[test]
fn test_curve_mismatch() {
    let crypto = crypto();
    let p256 = crypto.ecdh().create_key_pair(EccCurve::P256).expect("p256");
    let p384 = crypto.ecdh().create_key_pair(EccCurve::P384).expect("p384");

    assert_eq!(
        crypto
            .ecdh()
            .derive_shared_secret(&p256, &p384.public_key().expect("public"))
            .map(|_| ()),
        Err(CryptoError::CurveMismatch)
    );
}

#[test]
fn test_public_key_cannot_derive() {
    let crypto = crypto();
    let alice = crypto.ecdh().create_key_pair(EccCurve::P256).expect("alice");
    let public = alice.public_key().expect("public");

    assert_eq!(
        crypto
            .ecdh()
            .derive_shared_secret(&public, &public)
            .map(|_| ()),
        Err(CryptoError::InvalidKeyUsage)
    );
}

#[test]
fn test_signing_key_cannot_derive() {
    let crypto = crypto();
    let signer = crypto
        .asymmetric()
        .generate_key_pair(AlgorithmId::EcdsaP256Sha256, None)
        .expect("ecdsa");
    let peer = crypto.ecdh().create_key_pair(EccCurve::P256).expect("peer");

    assert_eq!(
        crypto
            .ecdh()
            .derive_shared_secret(&signer, &peer.public_key().expect("public"))
            .map(|_| ()),
        Err(CryptoError::InvalidKeyUsage)
    );
}

#[test]
fn test_bad_blobs() {
    let crypto = crypto();

    let truncated = PublicKeyBlob::new(PublicKeyBlobFormat::X962Uncompressed, vec![0x04; 64]);
    assert!(crypto.ecdh().public_key_from_blob(&truncated).is_err());

    let compressed = PublicKeyBlob::new(PublicKeyBlobFormat::X962Uncompressed, vec![0x02; 65]);
    assert!(crypto.ecdh().public_key_from_blob(&compressed).is_err());

    let rsa = crypto
        .asymmetric()
        .generate_key_pair(AlgorithmId::RsaPkcs1, Some(1024))
        .expect("rsa");
    let rsa_blob = rsa
        .export_public_key(PublicKeyBlobFormat::X509SubjectPublicKeyInfo)
        .expect("export");
    assert_eq!(
        crypto.ecdh().public_key_from_blob(&rsa_blob).map(|_| ()),
        Err(CryptoError::InvalidParameter)
    );
}

#[test]
fn test_released_key() {
    let crypto = crypto();
    let alice = crypto.ecdh().create_key_pair(EccCurve::P256).expect("alice");
    let bob = crypto.ecdh().create_key_pair(EccCurve::P256).expect("bob");
    let bob_public = bob.public_key().expect("public");
    alice.release();

    assert_eq!(
        crypto
            .ecdh()
            .derive_shared_secret(&alice, &bob_public)
            .map(|_| ()),
        Err(CryptoError::InvalidState)
    );
}

#[test]
fn test_key_agrees_with_itself() {
    let crypto = crypto();
    let key = crypto.ecdh().create_key_pair(EccCurve::P384).expect("generate");
    let public = key.public_key().expect("public");

    let with_self = crypto
        .ecdh()
        .derive_shared_secret(&key, &key)
        .expect("derive with self");
    let with_clone = crypto
        .ecdh()
        .derive_shared_secret(&key, &key.clone())
        .expect("derive with clone");
    let with_public = crypto
        .ecdh()
        .derive_shared_secret(&key, &public)
        .expect("derive with public");

    assert_eq!(with_self, with_public);
    assert_eq!(with_clone, with_public);
}
