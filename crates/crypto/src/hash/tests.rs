// Copyright (C) Microsoft Corporation. All rights reserved.

use test_with_tracing::test;

use super::*;

const JEFE_KEY: &[u8] = b"Jefe";
const JEFE_DATA: &[u8] = b"what do ya want for nothing?";

fn crypto() -> Crypto {
    Crypto::new(CryptoConfig::default())
}

#[test]
fn test_digest_known_answers() {
    let crypto = crypto();
    let cases = [
        (AlgorithmId::Sha1, "", "da39a3ee5e6b4b0d3255bfef95601890afd80709"),
        (AlgorithmId::Sha1, "abc", "a9993e364706816aba3e25717850c26c9cd0d89d"),
        (
            AlgorithmId::Sha256,
            "",
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        ),
        (
            AlgorithmId::Sha256,
            "abc",
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        ),
        (
            AlgorithmId::Sha384,
            "abc",
            "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed\
             8086072ba1e7cc2358baeca134c825a7",
        ),
        (
            AlgorithmId::Sha512,
            "abc",
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
        ),
    ];

    for (algorithm, message, expected) in cases {
        let digest = crypto.hash().hash(algorithm, message.as_bytes()).expect("hash");
        assert_eq!(hex::encode(digest), expected, "{algorithm}({message:?})");
    }
}

#[test]
fn test_hash_lengths() {
    let crypto = crypto();
    assert_eq!(crypto.hash().hash_length(AlgorithmId::Sha1), Ok(20));
    assert_eq!(crypto.hash().hash_length(AlgorithmId::Sha384), Ok(48));
    assert_eq!(crypto.mac().mac_length(AlgorithmId::HmacSha512), Ok(64));
}

#[test]
fn test_incremental_matches_one_shot() {
    let crypto = crypto();
    let data = [0x5au8; 1000];
    let expected = crypto.hash().hash(AlgorithmId::Sha384, &data).expect("hash");

    let mut hash = crypto.hash().create_hash(AlgorithmId::Sha384).expect("create");
    assert_eq!(hash.algorithm(), AlgorithmId::Sha384);
    assert_eq!(hash.output_len(), 48);
    for piece in data.chunks(77) {
        hash.append(piece).expect("append");
    }
    assert_eq!(hash.finalize().expect("finalize"), expected);
    assert_eq!(hash.hash_value(), Some(expected.as_slice()));
}

#[test]
fn test_finalized_hash_is_invalid_state() {
    let crypto = crypto();
    let mut hash = crypto.hash().create_hash(AlgorithmId::Sha256).expect("create");
    hash.finalize().expect("finalize");

    assert_eq!(hash.append(b"late"), Err(CryptoError::InvalidState));
    assert_eq!(hash.finalize(), Err(CryptoError::InvalidState));
}

#[test]
fn test_hmac_known_answers() {
    let crypto = crypto();
    let cases = [
        (AlgorithmId::HmacSha1, "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"),
        (
            AlgorithmId::HmacSha256,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843",
        ),
        (
            AlgorithmId::HmacSha384,
            "af45d2e376484031617f78d2b58a6b1b9c7ef464f5a01b47e42ec3736322445e\
             8e2240ca5e69e2c78b3239ecfab21649",
        ),
        (
            AlgorithmId::HmacSha512,
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737",
        ),
    ];

    for (algorithm, expected) in cases {
        let key = crypto.mac().create_key(algorithm, JEFE_KEY).expect("key");
        let tag = crypto.mac().sign(&key, JEFE_DATA).expect("sign");
        assert_eq!(hex::encode(&tag), expected, "{algorithm}");
        assert_eq!(crypto.mac().verify(&key, JEFE_DATA, &tag), Ok(true));
    }
}

#[test]
fn test_hmac_verify_rejects() {
    let crypto = crypto();
    let key = crypto
        .mac()
        .create_key(AlgorithmId::HmacSha256, JEFE_KEY)
        .expect("key");
    let mut tag = crypto.mac().sign(&key, JEFE_DATA).expect("sign");

    assert_eq!(crypto.mac().verify(&key, b"other data", &tag), Ok(false));
    assert_eq!(crypto.mac().verify(&key, JEFE_DATA, &tag[..31]), Ok(false));
    tag[0] ^= 0x80;
    assert_eq!(crypto.mac().verify(&key, JEFE_DATA, &tag), Ok(false));
}

#[test]
fn test_incremental_hmac_and_reset() {
    let crypto = crypto();
    let key = crypto
        .mac()
        .create_key(AlgorithmId::HmacSha256, JEFE_KEY)
        .expect("key");
    let expected = crypto.mac().sign(&key, JEFE_DATA).expect("sign");

    let mut mac = crypto.mac().create_hash(&key).expect("create");
    mac.append(&JEFE_DATA[..10]).expect("append");
    mac.append(&JEFE_DATA[10..]).expect("append");
    assert_eq!(mac.finalize().expect("finalize"), expected);

    mac.reset().expect("reset");
    mac.append(JEFE_DATA).expect("append");
    assert_eq!(mac.finalize().expect("finalize"), expected);
}

#[test]
fn test_generated_mac_keys() {
    let crypto = crypto();
    let key = crypto
        .mac()
        .generate_key(AlgorithmId::HmacSha384, None)
        .expect("generate");
    assert_eq!(key.key_size(), 384);

    let short = crypto
        .mac()
        .generate_key(AlgorithmId::HmacSha384, Some(64))
        .expect("generate");
    assert_eq!(short.key_size(), 64);

    assert_eq!(
        crypto.mac().generate_key(AlgorithmId::HmacSha384, Some(12)).map(|_| ()),
        Err(CryptoError::InvalidKeySize)
    );
    assert_eq!(
        crypto.mac().create_key(AlgorithmId::HmacSha256, &[]).map(|_| ()),
        Err(CryptoError::InvalidKeySize)
    );
}

#[test]
fn test_mac_rejects_foreign_keys() {
    let crypto = crypto();
    let aes = crypto
        .symmetric()
        .generate_key(AlgorithmId::AesCbc, 128)
        .expect("aes");
    assert_eq!(crypto.mac().sign(&aes, b"data"), Err(CryptoError::InvalidKeyUsage));
}

#[test]
fn test_released_mac_key() {
    let crypto = crypto();
    let key = crypto
        .mac()
        .create_key(AlgorithmId::HmacSha1, b"k")
        .expect("key");
    let mut mac = crypto.mac().create_hash(&key).expect("create");
    key.release();

    // Running computations keep their own native context.
    mac.append(b"data").expect("append");
    assert_eq!(mac.finalize().map(|tag| tag.len()), Ok(20));
    assert_eq!(mac.reset(), Err(CryptoError::InvalidState));
}
