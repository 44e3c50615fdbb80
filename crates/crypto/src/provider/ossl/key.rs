// Copyright (C) Microsoft Corporation. All rights reserved.

use openssl::bn::BigNum;
use openssl::bn::BigNumContext;
use openssl::ec::EcGroup;
use openssl::ec::EcKey;
use openssl::ec::EcPoint;
use openssl::ec::PointConversionForm;
use openssl::nid::Nid;
use openssl::pkey::HasParams;
use openssl::pkey::HasPublic;
use openssl::pkey::Id;
use openssl::pkey::PKey;
use openssl::pkey::PKeyRef;
use openssl::pkey::Private;
use openssl::pkey::Public;
use openssl::rsa::Rsa;

use super::*;

/// Key handle owned by the OpenSSL provider.
pub(crate) enum OsslKey {
    Secret(Zeroizing<Vec<u8>>),
    Private {
        pkey: PKey<Private>,
        curve: Option<EccCurve>,
    },
    Public {
        pkey: PKey<Public>,
        curve: Option<EccCurve>,
    },
}

/// Runs `$body` with `$pkey` bound to the public-capable `PKeyRef` of an
/// asymmetric key, whichever half it holds.
macro_rules! with_public_pkey {
    ($key:expr, $pkey:ident => $body:expr) => {
        match $key {
            OsslKey::Private { pkey: $pkey, .. } => $body,
            OsslKey::Public { pkey: $pkey, .. } => $body,
            OsslKey::Secret(_) => Err(invalid_key("key", "expected an asymmetric key")),
        }
    };
}
pub(super) use with_public_pkey;

impl std::fmt::Debug for OsslKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsslKey::Secret(bytes) => f.debug_tuple("Secret").field(&(bytes.len() * 8)).finish(),
            OsslKey::Private { pkey, curve } => f
                .debug_struct("Private")
                .field("id", &pkey.id())
                .field("curve", curve)
                .finish(),
            OsslKey::Public { pkey, curve } => f
                .debug_struct("Public")
                .field("id", &pkey.id())
                .field("curve", curve)
                .finish(),
        }
    }
}

impl NativeKey for OsslKey {
    fn bits(&self) -> usize {
        match self {
            OsslKey::Secret(bytes) => bytes.len() * 8,
            OsslKey::Private { pkey, curve } => {
                curve.map_or(pkey.bits() as usize, |curve| curve.bit_size())
            }
            OsslKey::Public { pkey, curve } => {
                curve.map_or(pkey.bits() as usize, |curve| curve.bit_size())
            }
        }
    }

    fn has_private(&self) -> bool {
        !matches!(self, OsslKey::Public { .. })
    }

    fn curve(&self) -> Option<EccCurve> {
        match self {
            OsslKey::Secret(_) => None,
            OsslKey::Private { curve, .. } | OsslKey::Public { curve, .. } => *curve,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Recovers the provider's key type from a core handle.
pub(super) fn ossl_key(key: &dyn NativeKey) -> NativeResult<&OsslKey> {
    key.as_any()
        .downcast_ref::<OsslKey>()
        .ok_or_else(|| invalid_key("key", "key was created by a different provider"))
}

impl OsslKey {
    pub(super) fn secret(&self) -> NativeResult<&[u8]> {
        match self {
            OsslKey::Secret(bytes) => Ok(bytes),
            _ => Err(invalid_key("key", "expected a secret key")),
        }
    }

    pub(super) fn private(&self) -> NativeResult<&PKeyRef<Private>> {
        match self {
            OsslKey::Private { pkey, .. } => Ok(pkey),
            _ => Err(invalid_key("key", "expected a private key")),
        }
    }
}

pub(super) fn curve_nid(curve: EccCurve) -> Nid {
    match curve {
        EccCurve::P256 => Nid::X9_62_PRIME256V1,
        EccCurve::P384 => Nid::SECP384R1,
        EccCurve::P521 => Nid::SECP521R1,
    }
}

fn curve_from_nid(nid: Nid) -> Option<EccCurve> {
    match nid {
        Nid::X9_62_PRIME256V1 => Some(EccCurve::P256),
        Nid::SECP384R1 => Some(EccCurve::P384),
        Nid::SECP521R1 => Some(EccCurve::P521),
        _ => None,
    }
}

fn group(curve: EccCurve) -> NativeResult<EcGroup> {
    EcGroup::from_curve_name(curve_nid(curve)).native("ec group")
}

/// Checks that `pkey` is the key type `algo` needs and returns its curve.
fn key_family<T: HasParams>(algo: &AlgorithmDescriptor, pkey: &PKeyRef<T>) -> NativeResult<Option<EccCurve>> {
    match pkey.id() {
        Id::RSA if algo.is_rsa() => Ok(None),
        Id::EC if algo.is_ecc() => {
            let ec = pkey.ec_key().native("ec key")?;
            let curve = ec
                .group()
                .curve_name()
                .and_then(curve_from_nid)
                .ok_or_else(|| unsupported("ec key", "curve is not supported"))?;
            Ok(Some(curve))
        }
        _ => Err(invalid_key("key import", "key type does not match the algorithm")),
    }
}

pub(super) fn generate(algo: &AlgorithmDescriptor, bits: usize) -> NativeResult<OsslKey> {
    let pkey = if algo.is_rsa() {
        let bits = u32::try_from(bits).map_err(|_| invalid_key("rsa generate", "bad size"))?;
        let rsa = Rsa::generate(bits).native("rsa generate")?;
        PKey::from_rsa(rsa).native("rsa generate")?
    } else if let Some(curve) = algo.curve() {
        let group = group(curve)?;
        let ec = EcKey::generate(&group).native("ec generate")?;
        PKey::from_ec_key(ec).native("ec generate")?
    } else {
        Err(unsupported("generate key pair", "not an asymmetric algorithm"))?
    };

    Ok(OsslKey::Private {
        pkey,
        curve: algo.curve(),
    })
}

fn ec_public_from_point(curve: EccCurve, point: &[u8]) -> NativeResult<PKey<Public>> {
    if point.first() != Some(&0x04) || point.len() != 1 + 2 * curve.point_size() {
        Err(invalid_key("x9.62 import", "expected an uncompressed point"))?;
    }
    let group = group(curve)?;
    let mut ctx = BigNumContext::new().native("x9.62 import")?;
    let point = EcPoint::from_bytes(&group, point, &mut ctx).native("x9.62 import")?;
    let ec = EcKey::from_public_key(&group, &point).native("x9.62 import")?;
    ec.check_key().native("x9.62 import")?;
    PKey::from_ec_key(ec).native("x9.62 import")
}

fn ec_public_from_coordinates(curve: EccCurve, x: &[u8], y: &[u8]) -> NativeResult<PKey<Public>> {
    let group = group(curve)?;
    let x = BigNum::from_slice(x).native("bcrypt import")?;
    let y = BigNum::from_slice(y).native("bcrypt import")?;
    let ec = EcKey::from_public_key_affine_coordinates(&group, &x, &y).native("bcrypt import")?;
    PKey::from_ec_key(ec).native("bcrypt import")
}

pub(super) fn import_public(
    algo: &AlgorithmDescriptor,
    blob: &[u8],
    format: PublicKeyBlobFormat,
) -> NativeResult<OsslKey> {
    let pkey = match format {
        PublicKeyBlobFormat::X509SubjectPublicKeyInfo => {
            PKey::public_key_from_der(blob).native("spki import")?
        }
        PublicKeyBlobFormat::Pkcs1RsaPublicKey => {
            let rsa = Rsa::public_key_from_der_pkcs1(blob).native("pkcs1 import")?;
            PKey::from_rsa(rsa).native("pkcs1 import")?
        }
        PublicKeyBlobFormat::BCryptPublicKey => {
            match BcryptPublicBlob::parse(blob)
                .map_err(|_| invalid_key("bcrypt import", "malformed blob"))?
            {
                BcryptPublicBlob::Rsa { exponent, modulus } => {
                    let n = BigNum::from_slice(&modulus).native("bcrypt import")?;
                    let e = BigNum::from_slice(&exponent).native("bcrypt import")?;
                    let rsa = Rsa::from_public_components(n, e).native("bcrypt import")?;
                    PKey::from_rsa(rsa).native("bcrypt import")?
                }
                BcryptPublicBlob::Ecc { curve, x, y, .. } => {
                    ec_public_from_coordinates(curve, &x, &y)?
                }
            }
        }
        PublicKeyBlobFormat::X962Uncompressed => {
            let curve = algo
                .curve()
                .ok_or_else(|| invalid_key("x9.62 import", "algorithm has no curve"))?;
            ec_public_from_point(curve, blob)?
        }
    };

    let curve = key_family(algo, &pkey)?;
    Ok(OsslKey::Public { pkey, curve })
}

pub(super) fn import_private(
    algo: &AlgorithmDescriptor,
    blob: &[u8],
    format: PrivateKeyBlobFormat,
) -> NativeResult<OsslKey> {
    let pkey = match format {
        PrivateKeyBlobFormat::Pkcs8PrivateKeyInfo => {
            PKey::private_key_from_pkcs8(blob).native("pkcs8 import")?
        }
        PrivateKeyBlobFormat::Pkcs1RsaPrivateKey => {
            let rsa = Rsa::private_key_from_der(blob).native("pkcs1 import")?;
            PKey::from_rsa(rsa).native("pkcs1 import")?
        }
    };

    let curve = key_family(algo, &pkey)?;
    Ok(OsslKey::Private { pkey, curve })
}

fn ec_coordinates<T: HasPublic>(
    pkey: &PKeyRef<T>,
    curve: EccCurve,
) -> NativeResult<(Vec<u8>, Vec<u8>)> {
    let ec = pkey.ec_key().native("ec export")?;
    let mut ctx = BigNumContext::new().native("ec export")?;
    let mut x = BigNum::new().native("ec export")?;
    let mut y = BigNum::new().native("ec export")?;
    ec.public_key()
        .affine_coordinates_gfp(ec.group(), &mut x, &mut y, &mut ctx)
        .native("ec export")?;

    let size = curve.point_size() as i32;
    Ok((
        x.to_vec_padded(size).native("ec export")?,
        y.to_vec_padded(size).native("ec export")?,
    ))
}

pub(super) fn export_public<T: HasPublic>(
    algo: &AlgorithmDescriptor,
    pkey: &PKeyRef<T>,
    curve: Option<EccCurve>,
    format: PublicKeyBlobFormat,
) -> NativeResult<Vec<u8>> {
    match format {
        PublicKeyBlobFormat::X509SubjectPublicKeyInfo => {
            pkey.public_key_to_der().native("spki export")
        }
        PublicKeyBlobFormat::Pkcs1RsaPublicKey => pkey
            .rsa()
            .and_then(|rsa| rsa.public_key_to_der_pkcs1())
            .native("pkcs1 export"),
        PublicKeyBlobFormat::BCryptPublicKey => {
            let blob = match curve {
                None => {
                    let rsa = pkey.rsa().native("bcrypt export")?;
                    BcryptPublicBlob::Rsa {
                        exponent: rsa.e().to_vec(),
                        modulus: rsa.n().to_vec(),
                    }
                }
                Some(curve) => {
                    let (x, y) = ec_coordinates(pkey, curve)?;
                    BcryptPublicBlob::Ecc {
                        curve,
                        agreement: algo.category() == AlgorithmCategory::KeyAgreement,
                        x,
                        y,
                    }
                }
            };
            Ok(blob.to_bytes())
        }
        PublicKeyBlobFormat::X962Uncompressed => {
            let ec = pkey.ec_key().native("x9.62 export")?;
            let mut ctx = BigNumContext::new().native("x9.62 export")?;
            ec.public_key()
                .to_bytes(ec.group(), PointConversionForm::UNCOMPRESSED, &mut ctx)
                .native("x9.62 export")
        }
    }
}

pub(super) fn export_private(
    pkey: &PKeyRef<Private>,
    format: PrivateKeyBlobFormat,
) -> NativeResult<Zeroizing<Vec<u8>>> {
    let der = match format {
        PrivateKeyBlobFormat::Pkcs8PrivateKeyInfo => {
            pkey.private_key_to_pkcs8().native("pkcs8 export")?
        }
        PrivateKeyBlobFormat::Pkcs1RsaPrivateKey => pkey
            .rsa()
            .and_then(|rsa| rsa.private_key_to_der())
            .native("pkcs1 export")?,
    };
    Ok(Zeroizing::new(der))
}

pub(super) fn public_half(key: &OsslKey) -> NativeResult<OsslKey> {
    match key {
        OsslKey::Private { pkey, curve } => {
            let der = pkey.public_key_to_der().native("public key")?;
            let pkey = PKey::public_key_from_der(&der).native("public key")?;
            Ok(OsslKey::Public {
                pkey,
                curve: *curve,
            })
        }
        OsslKey::Public { pkey, curve } => Ok(OsslKey::Public {
            pkey: pkey.clone(),
            curve: *curve,
        }),
        OsslKey::Secret(_) => Err(invalid_key("public key", "symmetric keys have no public half")),
    }
}

pub(super) fn blob_curve(blob: &[u8], format: PublicKeyBlobFormat) -> NativeResult<Option<EccCurve>> {
    match format {
        PublicKeyBlobFormat::X962Uncompressed => EccCurve::from_uncompressed_point_len(blob.len())
            .map(Some)
            .ok_or_else(|| invalid_key("blob curve", "length matches no supported curve")),
        PublicKeyBlobFormat::BCryptPublicKey => match BcryptPublicBlob::parse(blob) {
            Ok(BcryptPublicBlob::Ecc { curve, .. }) => Ok(Some(curve)),
            Ok(BcryptPublicBlob::Rsa { .. }) => Ok(None),
            Err(_) => Err(invalid_key("blob curve", "malformed blob")),
        },
        PublicKeyBlobFormat::X509SubjectPublicKeyInfo => {
            let pkey = PKey::public_key_from_der(blob).native("blob curve")?;
            if pkey.id() != Id::EC {
                return Ok(None);
            }
            let ec = pkey.ec_key().native("blob curve")?;
            ec.group()
                .curve_name()
                .and_then(curve_from_nid)
                .map(Some)
                .ok_or_else(|| unsupported("blob curve", "curve is not supported"))
        }
        PublicKeyBlobFormat::Pkcs1RsaPublicKey => Ok(None),
    }
}
