// Copyright (C) Microsoft Corporation. All rights reserved.

use test_with_tracing::test;

use super::*;

fn crypto() -> Crypto {
    Crypto::new(CryptoConfig::default())
}

fn generate(crypto: &Crypto, algorithm: AlgorithmId, bits: Option<usize>) -> CryptographicKey {
    crypto
        .asymmetric()
        .generate_key_pair(algorithm, bits)
        .expect("generate")
}

#[test]
fn test_sign_verify_round_trip() {
    let crypto = crypto();
    let cases = [
        (AlgorithmId::RsaSignPkcs1Sha1, Some(1024)),
        (AlgorithmId::RsaSignPkcs1Sha256, Some(1024)),
        (AlgorithmId::RsaSignPkcs1Sha512, Some(1024)),
        (AlgorithmId::RsaSignPssSha256, Some(1024)),
        (AlgorithmId::EcdsaP256Sha256, None),
        (AlgorithmId::EcdsaP384Sha384, None),
        (AlgorithmId::EcdsaP521Sha512, None),
    ];

    for (algorithm, bits) in cases {
        let key = generate(&crypto, algorithm, bits);
        let signature = crypto.asymmetric().sign(&key, b"message").expect("sign");

        assert_eq!(
            crypto.asymmetric().verify(&key, b"message", &signature),
            Ok(true),
            "{algorithm}"
        );
        assert_eq!(
            crypto.asymmetric().verify(&key, b"massage", &signature),
            Ok(false),
            "{algorithm}"
        );

        let public = key.public_key().expect("public");
        assert_eq!(
            crypto.asymmetric().verify(&public, b"message", &signature),
            Ok(true),
            "{algorithm}"
        );
    }
}

#[test]
fn test_rsa_2048_mutated_signature_is_rejected() {
    let crypto = crypto();
    let key = generate(&crypto, AlgorithmId::RsaSignPkcs1Sha256, Some(2048));
    assert_eq!(key.key_size(), 2048);

    let message = b"The quick brown fox jumps over the lazy dog";
    let mut signature = crypto.asymmetric().sign(&key, message).expect("sign");
    assert_eq!(signature.len(), 256);
    assert_eq!(crypto.asymmetric().verify(&key, message, &signature), Ok(true));

    signature[100] ^= 0x01;
    assert_eq!(crypto.asymmetric().verify(&key, message, &signature), Ok(false));
}

#[test]
fn test_rsa_pkcs1_signature_is_deterministic() {
    let crypto = crypto();
    let key = generate(&crypto, AlgorithmId::RsaSignPkcs1Sha256, Some(1024));
    let a = crypto.asymmetric().sign(&key, b"data").expect("sign");
    let b = crypto.asymmetric().sign(&key, b"data").expect("sign");
    assert_eq!(a, b);
    assert_eq!(a.len(), 128);
}

#[test]
fn test_malformed_signature_is_false() {
    let crypto = crypto();
    for algorithm in [AlgorithmId::RsaSignPssSha256, AlgorithmId::EcdsaP256Sha256] {
        let key = generate(&crypto, algorithm, Some(algorithm.descriptor().default_key_bits()));
        assert_eq!(crypto.asymmetric().verify(&key, b"data", &[]), Ok(false));
        assert_eq!(crypto.asymmetric().verify(&key, b"data", &[0x30; 7]), Ok(false));
    }
}

#[test]
fn test_public_key_cannot_sign() {
    let crypto = crypto();
    let key = generate(&crypto, AlgorithmId::EcdsaP256Sha256, None);
    let public = key.public_key().expect("public");
    assert_eq!(
        crypto.asymmetric().sign(&public, b"data"),
        Err(CryptoError::InvalidKeyUsage)
    );
}

#[test]
fn test_operation_must_match_algorithm() {
    let crypto = crypto();
    let signer = generate(&crypto, AlgorithmId::RsaSignPkcs1Sha256, Some(1024));
    assert_eq!(
        crypto.asymmetric().encrypt(&signer, b"data"),
        Err(CryptoError::InvalidKeyUsage)
    );

    let encryptor = generate(&crypto, AlgorithmId::RsaOaepSha256, Some(1024));
    assert_eq!(
        crypto.asymmetric().sign(&encryptor, b"data"),
        Err(CryptoError::InvalidKeyUsage)
    );
}

#[test]
fn test_rsa_encrypt_decrypt() {
    let crypto = crypto();
    for algorithm in [AlgorithmId::RsaPkcs1, AlgorithmId::RsaOaepSha1, AlgorithmId::RsaOaepSha256] {
        let key = generate(&crypto, algorithm, Some(1024));
        let public = key.public_key().expect("public");

        let ct = crypto.asymmetric().encrypt(&public, b"secret").expect("encrypt");
        assert_eq!(ct.len(), 128, "{algorithm}");
        let pt = crypto.asymmetric().decrypt(&key, &ct).expect("decrypt");
        assert_eq!(pt, b"secret", "{algorithm}");

        assert_eq!(
            crypto.asymmetric().decrypt(&public, &ct),
            Err(CryptoError::InvalidKeyUsage),
            "{algorithm}"
        );
    }
}

#[test]
fn test_rsa_plaintext_limits() {
    let crypto = crypto();

    let pkcs1 = generate(&crypto, AlgorithmId::RsaPkcs1, Some(1024));
    assert!(crypto.asymmetric().encrypt(&pkcs1, &[1u8; 117]).is_ok());
    assert_eq!(
        crypto.asymmetric().encrypt(&pkcs1, &[1u8; 118]),
        Err(CryptoError::InvalidParameter)
    );

    let oaep = generate(&crypto, AlgorithmId::RsaOaepSha256, Some(1024));
    assert!(crypto.asymmetric().encrypt(&oaep, &[1u8; 62]).is_ok());
    assert_eq!(
        crypto.asymmetric().encrypt(&oaep, &[1u8; 63]),
        Err(CryptoError::InvalidParameter)
    );
}

#[test]
fn test_rsa_decrypt_failures_are_uniform() {
    let crypto = crypto();
    let key = generate(&crypto, AlgorithmId::RsaOaepSha256, Some(1024));
    let other = generate(&crypto, AlgorithmId::RsaOaepSha256, Some(1024));
    let ct = crypto.asymmetric().encrypt(&key, b"secret").expect("encrypt");

    assert_eq!(
        crypto.asymmetric().decrypt(&other, &ct),
        Err(CryptoError::DecryptionFailed)
    );
    assert_eq!(
        crypto.asymmetric().decrypt(&key, &ct[..100]),
        Err(CryptoError::DecryptionFailed)
    );

    let mut tampered = ct.clone();
    tampered[64] ^= 1;
    assert_eq!(
        crypto.asymmetric().decrypt(&key, &tampered),
        Err(CryptoError::DecryptionFailed)
    );
}

#[test]
fn test_rsa_public_blob_round_trips() {
    let crypto = crypto();
    let key = generate(&crypto, AlgorithmId::RsaSignPkcs1Sha256, Some(1024));
    let signature = crypto.asymmetric().sign(&key, b"data").expect("sign");

    for format in [
        PublicKeyBlobFormat::X509SubjectPublicKeyInfo,
        PublicKeyBlobFormat::Pkcs1RsaPublicKey,
        PublicKeyBlobFormat::BCryptPublicKey,
    ] {
        let blob = crypto
            .asymmetric()
            .export_public_key(&key, format)
            .expect("export");
        let imported = crypto
            .asymmetric()
            .import_public_key(AlgorithmId::RsaSignPkcs1Sha256, blob.as_bytes(), format)
            .expect("import");

        assert_eq!(imported.key_size(), 1024, "{format}");
        assert_eq!(imported.has_private_key(), Ok(false));
        assert_eq!(
            crypto.asymmetric().verify(&imported, b"data", &signature),
            Ok(true),
            "{format}"
        );

        // Re-encoding gives back the same bytes.
        let again = imported.export_public_key(format).expect("re-export");
        assert_eq!(again, blob, "{format}");
    }
}

#[test]
fn test_bcrypt_rsa_blob_header() {
    let crypto = crypto();
    let key = generate(&crypto, AlgorithmId::RsaPkcs1, Some(1024));
    let blob = key
        .export_public_key(PublicKeyBlobFormat::BCryptPublicKey)
        .expect("export");
    let bytes = blob.as_bytes();

    assert_eq!(&bytes[..4], b"RSA1");
    assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 1024);
}

#[test]
fn test_private_blob_round_trips() {
    let crypto = crypto();
    let cases = [
        (AlgorithmId::RsaSignPssSha256, Some(1024), PrivateKeyBlobFormat::Pkcs8PrivateKeyInfo),
        (AlgorithmId::RsaSignPssSha256, Some(1024), PrivateKeyBlobFormat::Pkcs1RsaPrivateKey),
        (AlgorithmId::EcdsaP384Sha384, None, PrivateKeyBlobFormat::Pkcs8PrivateKeyInfo),
    ];

    for (algorithm, bits, format) in cases {
        let key = generate(&crypto, algorithm, bits);
        let blob = crypto
            .asymmetric()
            .export_private_key(&key, format)
            .expect("export");
        let imported = crypto
            .asymmetric()
            .import_key_pair(algorithm, &blob, format)
            .expect("import");

        assert_eq!(imported.has_private_key(), Ok(true));
        let signature = crypto.asymmetric().sign(&imported, b"data").expect("sign");
        assert_eq!(
            crypto.asymmetric().verify(&key, b"data", &signature),
            Ok(true),
            "{algorithm} {format}"
        );
    }
}

#[test]
fn test_import_checks_format_and_curve() {
    let crypto = crypto();
    let p384 = generate(&crypto, AlgorithmId::EcdsaP384Sha384, None);
    let spki = p384
        .export_public_key(PublicKeyBlobFormat::X509SubjectPublicKeyInfo)
        .expect("export");

    assert_eq!(
        crypto
            .asymmetric()
            .import_public_key(
                AlgorithmId::EcdsaP256Sha256,
                spki.as_bytes(),
                PublicKeyBlobFormat::X509SubjectPublicKeyInfo
            )
            .map(|_| ()),
        Err(CryptoError::CurveMismatch)
    );
    for format in [
        PublicKeyBlobFormat::X962Uncompressed,
        PublicKeyBlobFormat::BCryptPublicKey,
    ] {
        let blob = p384.export_public_key(format).expect("export");
        assert_eq!(
            crypto
                .asymmetric()
                .import_public_key(AlgorithmId::EcdsaP256Sha256, blob.as_bytes(), format)
                .map(|_| ()),
            Err(CryptoError::CurveMismatch),
            "{format}"
        );
    }
    assert_eq!(
        crypto
            .asymmetric()
            .import_public_key(
                AlgorithmId::EcdsaP384Sha384,
                spki.as_bytes(),
                PublicKeyBlobFormat::Pkcs1RsaPublicKey
            )
            .map(|_| ()),
        Err(CryptoError::InvalidParameter)
    );
    assert_eq!(
        crypto
            .asymmetric()
            .import_key_pair(AlgorithmId::EcdsaP384Sha384, &[0u8; 8], PrivateKeyBlobFormat::Pkcs1RsaPrivateKey)
            .map(|_| ()),
        Err(CryptoError::InvalidParameter)
    );
    assert_eq!(
        crypto
            .asymmetric()
            .import_public_key(
                AlgorithmId::RsaPkcs1,
                spki.as_bytes(),
                PublicKeyBlobFormat::X509SubjectPublicKeyInfo
            )
            .map(|_| ()),
        Err(CryptoError::InvalidParameter)
    );
    assert!(crypto
        .asymmetric()
        .import_public_key(
            AlgorithmId::RsaPkcs1,
            b"not der",
            PublicKeyBlobFormat::X509SubjectPublicKeyInfo
        )
        .is_err());
}

#[test]
fn test_x962_import() {
    let crypto = crypto();
    let key = generate(&crypto, AlgorithmId::EcdsaP256Sha256, None);
    let point = key
        .export_public_key(PublicKeyBlobFormat::X962Uncompressed)
        .expect("export");
    let signature = crypto.asymmetric().sign(&key, b"data").expect("sign");

    let imported = crypto
        .asymmetric()
        .import_public_key(
            AlgorithmId::EcdsaP256Sha256,
            point.as_bytes(),
            PublicKeyBlobFormat::X962Uncompressed,
        )
        .expect("import");
    assert_eq!(crypto.asymmetric().verify(&imported, b"data", &signature), Ok(true));
}

#[test]
fn test_key_size_policy() {
    let crypto = crypto();
    assert_eq!(
        crypto
            .asymmetric()
            .generate_key_pair(AlgorithmId::RsaPkcs1, Some(512))
            .map(|_| ()),
        Err(CryptoError::InvalidKeySize)
    );
    assert_eq!(
        crypto
            .asymmetric()
            .generate_key_pair(AlgorithmId::EcdsaP256Sha256, Some(384))
            .map(|_| ()),
        Err(CryptoError::InvalidKeySize)
    );
    assert_eq!(
        crypto
            .asymmetric()
            .generate_key_pair(AlgorithmId::AesCbc, Some(256))
            .map(|_| ()),
        Err(CryptoError::InvalidParameter)
    );

    let relaxed = Crypto::new(CryptoConfig::default().with_min_rsa_key_bits(512));
    let small = relaxed
        .asymmetric()
        .generate_key_pair(AlgorithmId::RsaPkcs1, Some(512))
        .expect("512-bit key");
    assert_eq!(small.key_size(), 512);

    // The stricter default refuses the same key on import.
    let blob = small
        .export_public_key(PublicKeyBlobFormat::X509SubjectPublicKeyInfo)
        .expect("export");
    assert_eq!(
        crypto
            .asymmetric()
            .import_public_key(
                AlgorithmId::RsaPkcs1,
                blob.as_bytes(),
                PublicKeyBlobFormat::X509SubjectPublicKeyInfo
            )
            .map(|_| ()),
        Err(CryptoError::InvalidKeySize)
    );
}

#[test]
fn test_set_key_size_through_engine() {
    let crypto = crypto();
    let key = generate(&crypto, AlgorithmId::RsaOaepSha256, Some(1024));
    crypto.asymmetric().set_key_size(&key, 1536).expect("resize");
    assert_eq!(key.key_size(), 1536);

    let ct = crypto.asymmetric().encrypt(&key, b"x").expect("encrypt");
    assert_eq!(ct.len(), 192);
}

#[test]
fn test_set_key_size_follows_engine_policy() {
    let relaxed = Crypto::new(CryptoConfig::default().with_min_rsa_key_bits(512));
    let strict = crypto();
    let key = generate(&strict, AlgorithmId::RsaPkcs1, Some(1024));

    assert_eq!(
        strict.asymmetric().set_key_size(&key, 512),
        Err(CryptoError::InvalidKeySize)
    );
    assert_eq!(key.key_size(), 1024);

    relaxed.asymmetric().set_key_size(&key, 512).expect("resize");
    assert_eq!(key.key_size(), 512);
}
