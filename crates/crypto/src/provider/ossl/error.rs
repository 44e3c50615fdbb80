// Copyright (C) Microsoft Corporation. All rights reserved.

use std::ffi::c_int;

use openssl::error::ErrorStack;

use super::*;

// Library codes from `err.h`.
const LIB_RSA: c_int = 4;
const LIB_EVP: c_int = 6;
const LIB_PEM: c_int = 9;
const LIB_X509: c_int = 11;
const LIB_ASN1: c_int = 13;
const LIB_EC: c_int = 16;
const LIB_PROV: c_int = 57;
const LIB_DECODER: c_int = 60;

/// `(library, reason)` pairs with a known meaning.
const REASONS: &[(c_int, c_int, NativeErrorKind)] = &[
    // EVP_R_BAD_DECRYPT, PROV_R_BAD_DECRYPT
    (LIB_EVP, 100, NativeErrorKind::BadDecrypt),
    (LIB_PROV, 100, NativeErrorKind::BadDecrypt),
    // RSA_R_BLOCK_TYPE_IS_NOT_02, PADDING_CHECK_FAILED, OAEP_DECODING_ERROR, PKCS_DECODING_ERROR
    (LIB_RSA, 107, NativeErrorKind::BadDecrypt),
    (LIB_RSA, 114, NativeErrorKind::BadDecrypt),
    (LIB_RSA, 121, NativeErrorKind::BadDecrypt),
    (LIB_RSA, 159, NativeErrorKind::BadDecrypt),
    // RSA_R_DATA_TOO_LARGE_FOR_KEY_SIZE, DIGEST_TOO_BIG_FOR_RSA_KEY, KEY_SIZE_TOO_SMALL,
    // DATA_TOO_LARGE_FOR_MODULUS
    (LIB_RSA, 110, NativeErrorKind::InvalidInput),
    (LIB_RSA, 112, NativeErrorKind::InvalidInput),
    (LIB_RSA, 120, NativeErrorKind::InvalidInput),
    (LIB_RSA, 132, NativeErrorKind::InvalidInput),
    // EVP_R_WRONG_FINAL_BLOCK_LENGTH, DATA_NOT_MULTIPLE_OF_BLOCK_LENGTH
    (LIB_EVP, 109, NativeErrorKind::InvalidInput),
    (LIB_EVP, 138, NativeErrorKind::InvalidInput),
    // PROV_R_WRONG_FINAL_BLOCK_LENGTH
    (LIB_PROV, 107, NativeErrorKind::InvalidInput),
    // EVP_R_INVALID_KEY_LENGTH
    (LIB_EVP, 130, NativeErrorKind::InvalidKey),
    // EC_R_INVALID_ENCODING, POINT_IS_NOT_ON_CURVE, INVALID_COMPRESSED_POINT
    (LIB_EC, 102, NativeErrorKind::InvalidKey),
    (LIB_EC, 107, NativeErrorKind::InvalidKey),
    (LIB_EC, 110, NativeErrorKind::InvalidKey),
    // EVP_R_UNSUPPORTED_CIPHER, UNSUPPORTED_ALGORITHM
    (LIB_EVP, 107, NativeErrorKind::Unsupported),
    (LIB_EVP, 156, NativeErrorKind::Unsupported),
];

fn error_kind(library: c_int, reason: c_int) -> NativeErrorKind {
    let known = REASONS
        .iter()
        .find(|(lib, code, _)| *lib == library && *code == reason)
        .map(|(_, _, kind)| *kind);

    match (known, library) {
        (Some(kind), _) => kind,
        // Anything raised while decoding a blob means the blob is bad.
        (None, LIB_ASN1 | LIB_DECODER | LIB_PEM | LIB_X509) => NativeErrorKind::InvalidKey,
        (None, _) => NativeErrorKind::Other,
    }
}

/// Maps an OpenSSL error queue onto a [`NativeError`].
///
/// The first entry with a recognized library and reason code decides the
/// kind.
pub(super) fn classify(operation: &'static str, stack: &ErrorStack) -> NativeError {
    let kind = stack
        .errors()
        .iter()
        .map(|error| error_kind(error.library_code(), error.reason_code()))
        .find(|kind| *kind != NativeErrorKind::Other)
        .unwrap_or(NativeErrorKind::Other);

    let message = if stack.errors().is_empty() {
        "no error detail reported".to_string()
    } else {
        stack.to_string()
    };
    NativeError::new(kind, operation, message)
}

pub(super) fn invalid_key(operation: &'static str, message: &str) -> NativeError {
    NativeError::new(NativeErrorKind::InvalidKey, operation, message)
}

pub(super) fn unsupported(operation: &'static str, message: &str) -> NativeError {
    NativeError::new(NativeErrorKind::Unsupported, operation, message)
}

pub(super) trait OsslResultExt<T> {
    /// Logs and classifies an OpenSSL failure.
    fn native(self, operation: &'static str) -> NativeResult<T>;

    /// Uniform failure for decrypt paths. The OpenSSL reason is not logged.
    fn native_decrypt(self, operation: &'static str) -> NativeResult<T>;
}

impl<T> OsslResultExt<T> for Result<T, ErrorStack> {
    fn native(self, operation: &'static str) -> NativeResult<T> {
        self.map_err(|openssl_error_stack| {
            tracing::error!(operation, ?openssl_error_stack);
            classify(operation, &openssl_error_stack)
        })
    }

    fn native_decrypt(self, operation: &'static str) -> NativeResult<T> {
        self.map_err(|_| {
            tracing::debug!(operation, "decryption rejected");
            NativeError::new(NativeErrorKind::BadDecrypt, operation, "decryption failed")
        })
    }
}

#[cfg(test)]
mod tests {
    use test_with_tracing::test;

    use super::*;

    #[test]
    fn test_code_classification() {
        assert_eq!(error_kind(LIB_EVP, 100), NativeErrorKind::BadDecrypt);
        assert_eq!(error_kind(LIB_RSA, 121), NativeErrorKind::BadDecrypt);
        assert_eq!(error_kind(LIB_RSA, 110), NativeErrorKind::InvalidInput);
        assert_eq!(error_kind(LIB_EC, 107), NativeErrorKind::InvalidKey);
        assert_eq!(error_kind(LIB_EVP, 156), NativeErrorKind::Unsupported);
        assert_eq!(error_kind(LIB_ASN1, 1), NativeErrorKind::InvalidKey);
        // Same reason number, different library.
        assert_eq!(error_kind(LIB_EC, 100), NativeErrorKind::Other);
        assert_eq!(error_kind(LIB_EVP, 1), NativeErrorKind::Other);
    }

    #[test]
    fn test_real_stack_is_classified() {
        let err = openssl::pkey::PKey::public_key_from_der(&[0x30, 0x03, 0x02, 0x01])
            .err()
            .expect("truncated DER must fail");
        let native = classify("import", &err);
        assert_eq!(native.operation(), "import");
        assert_ne!(native.kind(), NativeErrorKind::BadDecrypt);
    }
}
