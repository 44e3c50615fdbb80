// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Provider-side classification of a native failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeErrorKind {
    /// Algorithm, mode or key type the provider cannot handle.
    Unsupported,
    /// Key material or blob the provider rejected.
    InvalidKey,
    /// Other caller-supplied input the provider rejected.
    InvalidInput,
    /// Decryption or tag verification failure.
    BadDecrypt,
    /// Anything the provider could not classify.
    Other,
}

/// Failure reported by a native provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation}: {message}")]
pub struct NativeError {
    kind: NativeErrorKind,
    operation: &'static str,
    message: String,
}

/// Result alias for provider calls.
pub type NativeResult<T> = Result<T, NativeError>;

impl NativeError {
    pub fn new(kind: NativeErrorKind, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> NativeErrorKind {
        self.kind
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Normalization for decrypt paths: every rejection looks the same.
    pub(crate) fn into_decrypt_error(self) -> CryptoError {
        match self.kind {
            NativeErrorKind::Unsupported => CryptoError::UnsupportedAlgorithm,
            _ => CryptoError::DecryptionFailed,
        }
    }
}

impl From<NativeError> for CryptoError {
    fn from(err: NativeError) -> Self {
        match err.kind {
            NativeErrorKind::Unsupported => CryptoError::UnsupportedAlgorithm,
            NativeErrorKind::InvalidKey | NativeErrorKind::InvalidInput => {
                CryptoError::InvalidParameter
            }
            NativeErrorKind::BadDecrypt => CryptoError::DecryptionFailed,
            NativeErrorKind::Other => CryptoError::NativeFailure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_with_tracing::test;

    use super::*;

    #[test]
    fn test_normalize_kinds() {
        let cases = [
            (NativeErrorKind::Unsupported, CryptoError::UnsupportedAlgorithm),
            (NativeErrorKind::InvalidKey, CryptoError::InvalidParameter),
            (NativeErrorKind::InvalidInput, CryptoError::InvalidParameter),
            (NativeErrorKind::BadDecrypt, CryptoError::DecryptionFailed),
        ];
        for (kind, expected) in cases {
            let err = NativeError::new(kind, "op", "detail");
            assert_eq!(CryptoError::from(err), expected);
        }
    }

    #[test]
    fn test_unclassified_keeps_message() {
        let err = NativeError::new(NativeErrorKind::Other, "digest update", "engine fault");
        assert_eq!(
            CryptoError::from(err),
            CryptoError::NativeFailure("digest update: engine fault".to_string())
        );
    }

    #[test]
    fn test_decrypt_errors_are_uniform() {
        for kind in [
            NativeErrorKind::InvalidKey,
            NativeErrorKind::InvalidInput,
            NativeErrorKind::BadDecrypt,
            NativeErrorKind::Other,
        ] {
            let err = NativeError::new(kind, "decrypt", "oaep decoding error");
            assert_eq!(err.into_decrypt_error(), CryptoError::DecryptionFailed);
        }
    }
}
