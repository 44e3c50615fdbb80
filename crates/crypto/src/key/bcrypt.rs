// Copyright (C) Microsoft Corporation. All rights reserved.

//! Public key layouts used by Windows CNG (`BCRYPT_RSAKEY_BLOB`,
//! `BCRYPT_ECCKEY_BLOB`). Every field is little-endian `u32`; key
//! components follow the header as big-endian integers.

use super::*;

const BCRYPT_RSAPUBLIC_MAGIC: u32 = 0x3141_5352;

const BCRYPT_ECDH_PUBLIC_P256_MAGIC: u32 = 0x314B_4345;
const BCRYPT_ECDH_PUBLIC_P384_MAGIC: u32 = 0x334B_4345;
const BCRYPT_ECDH_PUBLIC_P521_MAGIC: u32 = 0x354B_4345;
const BCRYPT_ECDSA_PUBLIC_P256_MAGIC: u32 = 0x3153_4345;
const BCRYPT_ECDSA_PUBLIC_P384_MAGIC: u32 = 0x3353_4345;
const BCRYPT_ECDSA_PUBLIC_P521_MAGIC: u32 = 0x3553_4345;

const RSA_HEADER_LEN: usize = 6 * 4;
const ECC_HEADER_LEN: usize = 2 * 4;

/// Decoded BCrypt public key blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BcryptPublicBlob {
    Rsa {
        /// Public exponent, big-endian.
        exponent: Vec<u8>,
        /// Modulus, big-endian.
        modulus: Vec<u8>,
    },
    Ecc {
        curve: EccCurve,
        /// ECDH (`true`) or ECDSA magic.
        agreement: bool,
        x: Vec<u8>,
        y: Vec<u8>,
    },
}

fn read_u32(blob: &[u8], offset: usize) -> CryptoResult<u32> {
    blob.get(offset..offset + 4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(CryptoError::InvalidParameter)
}

fn ecc_magic(curve: EccCurve, agreement: bool) -> u32 {
    match (curve, agreement) {
        (EccCurve::P256, true) => BCRYPT_ECDH_PUBLIC_P256_MAGIC,
        (EccCurve::P384, true) => BCRYPT_ECDH_PUBLIC_P384_MAGIC,
        (EccCurve::P521, true) => BCRYPT_ECDH_PUBLIC_P521_MAGIC,
        (EccCurve::P256, false) => BCRYPT_ECDSA_PUBLIC_P256_MAGIC,
        (EccCurve::P384, false) => BCRYPT_ECDSA_PUBLIC_P384_MAGIC,
        (EccCurve::P521, false) => BCRYPT_ECDSA_PUBLIC_P521_MAGIC,
    }
}

impl BcryptPublicBlob {
    pub fn parse(blob: &[u8]) -> CryptoResult<Self> {
        let magic = read_u32(blob, 0)?;

        if magic == BCRYPT_RSAPUBLIC_MAGIC {
            let exponent_len = read_u32(blob, 8)? as usize;
            let modulus_len = read_u32(blob, 12)? as usize;
            let prime1_len = read_u32(blob, 16)?;
            let prime2_len = read_u32(blob, 20)?;

            if prime1_len != 0 || prime2_len != 0 || exponent_len == 0 || modulus_len == 0 {
                Err(CryptoError::InvalidParameter)?;
            }
            if blob.len() != RSA_HEADER_LEN + exponent_len + modulus_len {
                Err(CryptoError::InvalidParameter)?;
            }

            let (exponent, modulus) = blob[RSA_HEADER_LEN..].split_at(exponent_len);
            return Ok(BcryptPublicBlob::Rsa {
                exponent: exponent.to_vec(),
                modulus: modulus.to_vec(),
            });
        }

        let (curve, agreement) = [EccCurve::P256, EccCurve::P384, EccCurve::P521]
            .into_iter()
            .flat_map(|curve| [(curve, true), (curve, false)])
            .find(|(curve, agreement)| ecc_magic(*curve, *agreement) == magic)
            .ok_or(CryptoError::InvalidParameter)?;

        let coord_len = read_u32(blob, 4)? as usize;
        if coord_len != curve.point_size() || blob.len() != ECC_HEADER_LEN + 2 * coord_len {
            Err(CryptoError::InvalidParameter)?;
        }

        let (x, y) = blob[ECC_HEADER_LEN..].split_at(coord_len);
        Ok(BcryptPublicBlob::Ecc {
            curve,
            agreement,
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut blob = Vec::new();
        match self {
            BcryptPublicBlob::Rsa { exponent, modulus } => {
                let bits = (modulus.len() * 8) as u32;
                for field in [
                    BCRYPT_RSAPUBLIC_MAGIC,
                    bits,
                    exponent.len() as u32,
                    modulus.len() as u32,
                    0,
                    0,
                ] {
                    blob.extend_from_slice(&field.to_le_bytes());
                }
                blob.extend_from_slice(exponent);
                blob.extend_from_slice(modulus);
            }
            BcryptPublicBlob::Ecc {
                curve,
                agreement,
                x,
                y,
            } => {
                blob.extend_from_slice(&ecc_magic(*curve, *agreement).to_le_bytes());
                blob.extend_from_slice(&(curve.point_size() as u32).to_le_bytes());
                blob.extend_from_slice(x);
                blob.extend_from_slice(y);
            }
        }
        blob
    }
}
