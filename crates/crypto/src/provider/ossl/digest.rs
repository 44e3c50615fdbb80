// Copyright (C) Microsoft Corporation. All rights reserved.

use openssl::hash::Hasher;
use openssl::hash::MessageDigest;
use openssl::md::Md;
use openssl::md::MdRef;
use openssl::md_ctx::MdCtx;
use openssl::pkey::PKey;

use super::*;

pub(super) fn message_digest(hash: Option<AlgorithmId>) -> NativeResult<MessageDigest> {
    match hash {
        Some(AlgorithmId::Sha1) => Ok(MessageDigest::sha1()),
        Some(AlgorithmId::Sha256) => Ok(MessageDigest::sha256()),
        Some(AlgorithmId::Sha384) => Ok(MessageDigest::sha384()),
        Some(AlgorithmId::Sha512) => Ok(MessageDigest::sha512()),
        _ => Err(unsupported("digest", "no digest for algorithm")),
    }
}

fn md(hash: Option<AlgorithmId>) -> NativeResult<&'static MdRef> {
    match hash {
        Some(AlgorithmId::Sha1) => Ok(Md::sha1()),
        Some(AlgorithmId::Sha256) => Ok(Md::sha256()),
        Some(AlgorithmId::Sha384) => Ok(Md::sha384()),
        Some(AlgorithmId::Sha512) => Ok(Md::sha512()),
        _ => Err(unsupported("digest", "no digest for algorithm")),
    }
}

pub(super) struct OsslDigest {
    hasher: Hasher,
}

impl OsslDigest {
    pub(super) fn new(algo: &AlgorithmDescriptor) -> NativeResult<Self> {
        let digest = message_digest(Some(algo.id()))?;
        let hasher = Hasher::new(digest).native("digest init")?;
        Ok(Self { hasher })
    }
}

impl NativeDigest for OsslDigest {
    fn update(&mut self, data: &[u8]) -> NativeResult<()> {
        self.hasher.update(data).native("digest update")
    }

    fn finish(&mut self) -> NativeResult<Vec<u8>> {
        let digest = self.hasher.finish().native("digest finish")?;
        Ok(digest.to_vec())
    }
}

/// HMAC through an `EVP_DigestSign` context over an HMAC `PKey`.
pub(super) struct OsslHmac {
    ctx: MdCtx,
    len: usize,
}

impl OsslHmac {
    pub(super) fn new(algo: &AlgorithmDescriptor, secret: &[u8]) -> NativeResult<Self> {
        let md = md(algo.hash())?;
        let pkey = PKey::hmac(secret).native("hmac init")?;
        let mut ctx = MdCtx::new().native("hmac init")?;
        ctx.digest_sign_init(Some(md), &pkey).native("hmac init")?;
        Ok(Self {
            ctx,
            len: algo.output_len(),
        })
    }
}

impl NativeDigest for OsslHmac {
    fn update(&mut self, data: &[u8]) -> NativeResult<()> {
        self.ctx.digest_sign_update(data).native("hmac update")
    }

    fn finish(&mut self) -> NativeResult<Vec<u8>> {
        let mut tag = vec![0u8; self.len];
        let count = self
            .ctx
            .digest_sign_final(Some(&mut tag[..]))
            .native("hmac finish")?;
        tag.truncate(count);
        Ok(tag)
    }
}
