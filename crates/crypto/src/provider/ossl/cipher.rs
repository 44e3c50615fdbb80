// Copyright (C) Microsoft Corporation. All rights reserved.

use openssl::cipher::Cipher as EvpCipher;
use openssl::cipher::CipherRef;
use openssl::cipher_ctx::CipherCtx;
use openssl::symm::Cipher;
use openssl::symm::Crypter;
use openssl::symm::Mode;

use super::*;

fn block_cipher(mode: CipherMode, key_len: usize) -> NativeResult<Cipher> {
    match (mode, key_len) {
        (CipherMode::Cbc, 16) => Ok(Cipher::aes_128_cbc()),
        (CipherMode::Cbc, 24) => Ok(Cipher::aes_192_cbc()),
        (CipherMode::Cbc, 32) => Ok(Cipher::aes_256_cbc()),
        (CipherMode::Ecb, 16) => Ok(Cipher::aes_128_ecb()),
        (CipherMode::Ecb, 24) => Ok(Cipher::aes_192_ecb()),
        (CipherMode::Ecb, 32) => Ok(Cipher::aes_256_ecb()),
        (CipherMode::Ctr, 16) => Ok(Cipher::aes_128_ctr()),
        (CipherMode::Ctr, 24) => Ok(Cipher::aes_192_ctr()),
        (CipherMode::Ctr, 32) => Ok(Cipher::aes_256_ctr()),
        (CipherMode::Gcm, _) => Err(unsupported("cipher", "GCM has no block interface")),
        _ => Err(invalid_key("cipher", "unsupported AES key length")),
    }
}

fn gcm_cipher(key_len: usize) -> NativeResult<&'static CipherRef> {
    match key_len {
        16 => Ok(EvpCipher::aes_128_gcm()),
        24 => Ok(EvpCipher::aes_192_gcm()),
        32 => Ok(EvpCipher::aes_256_gcm()),
        _ => Err(invalid_key("gcm", "unsupported AES key length")),
    }
}

/// OpenSSL cipher context with native padding turned off.
pub(super) struct OsslCipher {
    crypter: Crypter,
    block_size: usize,
}

impl OsslCipher {
    pub(super) fn new(
        mode: CipherMode,
        key: &[u8],
        direction: Direction,
        iv: Option<&[u8]>,
    ) -> NativeResult<Self> {
        let cipher = block_cipher(mode, key.len())?;
        let mode = match direction {
            Direction::Encrypt => Mode::Encrypt,
            Direction::Decrypt => Mode::Decrypt,
        };
        let mut crypter = Crypter::new(cipher, mode, key, iv).native("cipher init")?;
        crypter.pad(false);

        Ok(Self {
            crypter,
            block_size: cipher.block_size(),
        })
    }
}

impl NativeCipher for OsslCipher {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn update(&mut self, input: &[u8], output: &mut Vec<u8>) -> NativeResult<()> {
        let start = output.len();
        output.resize(start + input.len() + self.block_size, 0);
        let count = self
            .crypter
            .update(input, &mut output[start..])
            .native("cipher update")?;
        output.truncate(start + count);
        Ok(())
    }

    fn finish(&mut self, output: &mut Vec<u8>) -> NativeResult<()> {
        let start = output.len();
        output.resize(start + self.block_size, 0);
        let count = self
            .crypter
            .finalize(&mut output[start..])
            .native("cipher finalize")?;
        output.truncate(start + count);
        Ok(())
    }
}

pub(super) fn gcm_encrypt(key: &[u8], nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> NativeResult<Vec<u8>> {
    let cipher = gcm_cipher(key.len())?;
    let mut ctx = CipherCtx::new().native("gcm encrypt")?;
    ctx.encrypt_init(Some(cipher), Some(key), Some(nonce))
        .native("gcm encrypt")?;
    if !aad.is_empty() {
        ctx.cipher_update(aad, None).native("gcm encrypt")?;
    }

    let mut output = vec![0u8; plaintext.len() + cipher.block_size()];
    let mut count = ctx
        .cipher_update(plaintext, Some(&mut output[..]))
        .native("gcm encrypt")?;
    count += ctx
        .cipher_final(&mut output[count..])
        .native("gcm encrypt")?;
    output.truncate(count);

    let mut tag = [0u8; GCM_TAG_LEN];
    ctx.tag(&mut tag).native("gcm encrypt")?;
    output.extend_from_slice(&tag);
    Ok(output)
}

pub(super) fn gcm_decrypt(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> NativeResult<Vec<u8>> {
    let cipher = gcm_cipher(key.len())?;
    let mut ctx = CipherCtx::new().native("gcm decrypt")?;
    ctx.decrypt_init(Some(cipher), Some(key), Some(nonce))
        .native("gcm decrypt")?;
    ctx.set_tag(tag).native("gcm decrypt")?;
    if !aad.is_empty() {
        ctx.cipher_update(aad, None).native_decrypt("gcm decrypt")?;
    }

    let mut output = vec![0u8; ciphertext.len() + cipher.block_size()];
    let mut count = ctx
        .cipher_update(ciphertext, Some(&mut output[..]))
        .native_decrypt("gcm decrypt")?;
    count += ctx
        .cipher_final(&mut output[count..])
        .native_decrypt("gcm decrypt")?;
    output.truncate(count);
    Ok(output)
}
