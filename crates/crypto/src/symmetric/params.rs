// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Per-operation cipher settings.
///
/// Mode and padding default to the algorithm's own; setting them is
/// required only for the mode-less `AES` identifier and must otherwise
/// agree with the algorithm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CipherParameters {
    mode: Option<CipherMode>,
    padding: Option<PaddingMode>,
    iv: Option<Vec<u8>>,
    associated_data: Option<Vec<u8>>,
}

/// Parameters checked against one algorithm.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedCipher<'a> {
    pub mode: CipherMode,
    pub padding: PaddingMode,
    pub iv: Option<&'a [u8]>,
    pub aad: &'a [u8],
}

impl CipherParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: CipherMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Initialization vector for CBC and CTR, nonce for GCM.
    pub fn with_iv(mut self, iv: &[u8]) -> Self {
        self.iv = Some(iv.to_vec());
        self
    }

    /// Additional authenticated data (GCM only).
    pub fn with_associated_data(mut self, aad: &[u8]) -> Self {
        self.associated_data = Some(aad.to_vec());
        self
    }

    pub fn mode(&self) -> Option<CipherMode> {
        self.mode
    }

    pub fn padding(&self) -> Option<PaddingMode> {
        self.padding
    }

    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    pub fn associated_data(&self) -> Option<&[u8]> {
        self.associated_data.as_deref()
    }

    pub(crate) fn resolve(&self, descriptor: &AlgorithmDescriptor) -> CryptoResult<ResolvedCipher<'_>> {
        let mode = match (descriptor.mode(), self.mode) {
            (Some(fixed), Some(requested)) if fixed != requested => {
                tracing::debug!(algorithm = %descriptor.id(), %requested, "cipher mode does not match algorithm");
                Err(CryptoError::InvalidParameter)?
            }
            (Some(fixed), _) => fixed,
            (None, Some(requested)) => requested,
            (None, None) => Err(CryptoError::InvalidParameter)?,
        };

        let padding = match (descriptor.mode(), self.padding) {
            (Some(_), Some(requested)) if requested != descriptor.padding() => {
                tracing::debug!(algorithm = %descriptor.id(), ?requested, "padding does not match algorithm");
                Err(CryptoError::InvalidParameter)?
            }
            (_, Some(requested)) => requested,
            (_, None) => descriptor.padding(),
        };
        if mode.is_stream() && padding != PaddingMode::None {
            Err(CryptoError::InvalidParameter)?;
        }

        let iv_len = mode.iv_len(descriptor.block_size());
        let iv = match (iv_len, self.iv.as_deref()) {
            (0, None) => None,
            (len, Some(iv)) if len > 0 && iv.len() == len => Some(iv),
            (_, iv) => {
                tracing::debug!(%mode, expected = iv_len, actual = ?iv.map(<[u8]>::len), "bad IV length");
                Err(CryptoError::InvalidParameter)?
            }
        };

        if self.associated_data.is_some() && mode != CipherMode::Gcm {
            Err(CryptoError::InvalidParameter)?;
        }

        Ok(ResolvedCipher {
            mode,
            padding,
            iv,
            aad: self.associated_data.as_deref().unwrap_or_default(),
        })
    }
}
