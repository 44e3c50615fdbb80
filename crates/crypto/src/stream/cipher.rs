// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Streaming cipher over a native block cipher.
///
/// Padding is applied here, never by the provider. When decrypting with
/// PKCS#7 the last decrypted block is withheld until the final call so the
/// padding can be stripped from it.
pub struct CipherTransform {
    key: CryptographicKey,
    direction: Direction,
    mode: CipherMode,
    padding: PaddingMode,
    block_size: usize,
    native: Box<dyn NativeCipher>,
    buffer: BlockBuffer,
    held: Option<Zeroizing<Vec<u8>>>,
    finalized: bool,
}

impl CipherTransform {
    pub(crate) fn new(
        key: &CryptographicKey,
        cipher: &ResolvedCipher<'_>,
        direction: Direction,
    ) -> CryptoResult<Self> {
        if cipher.mode == CipherMode::Gcm {
            tracing::debug!("GCM is one-shot only");
            Err(CryptoError::InvalidParameter)?;
        }

        let capability = match direction {
            Direction::Encrypt => KeyCapability::Encrypt,
            Direction::Decrypt => KeyCapability::Decrypt,
        };
        let (native, block_size) = {
            let live = key.live_for(capability)?;
            let native =
                live.provider()
                    .create_cipher(cipher.mode, live.native(), direction, cipher.iv)?;
            (native, live.descriptor().block_size())
        };
        let buffer = BlockBuffer::new(block_size, native.can_process_multiple_blocks());

        Ok(Self {
            key: key.clone(),
            direction,
            mode: cipher.mode,
            padding: cipher.padding,
            block_size,
            native,
            buffer,
            held: None,
            finalized: false,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn ensure_usable(&self) -> CryptoResult<()> {
        if self.finalized || self.key.is_released() {
            Err(CryptoError::InvalidState)?;
        }
        Ok(())
    }

    fn process(&mut self, input: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() + self.block_size);
        let hold_last =
            self.direction == Direction::Decrypt && self.padding == PaddingMode::Pkcs7;
        let block_size = self.block_size;
        let native = &mut self.native;
        let held = &mut self.held;

        self.buffer.update(input, |blocks| {
            if !hold_last {
                return Ok(native.update(blocks, &mut output)?);
            }

            let mut plain = Zeroizing::new(Vec::with_capacity(blocks.len()));
            native.update(blocks, &mut plain)?;
            let split = plain.len().saturating_sub(block_size);
            if let Some(previous) = held.take() {
                output.extend_from_slice(&previous);
            }
            output.extend_from_slice(&plain[..split]);
            *held = Some(Zeroizing::new(plain[split..].to_vec()));
            Ok(())
        })?;

        Ok(output)
    }

    fn finish(&mut self, input: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut output = self.process(input)?;
        let tail = self.buffer.take_pending();

        match (self.direction, self.padding) {
            (Direction::Encrypt, PaddingMode::Pkcs7) => {
                let padded = pad(&tail, self.block_size);
                self.native.update(&padded, &mut output)?;
            }
            (Direction::Decrypt, PaddingMode::Pkcs7) => {
                if !tail.is_empty() {
                    Err(CryptoError::InvalidPadding)?;
                }
                let last = self.held.take().ok_or(CryptoError::InvalidPadding)?;
                output.extend_from_slice(unpad(&last)?);
            }
            (_, PaddingMode::None) if !tail.is_empty() => {
                if !self.mode.is_stream() {
                    tracing::debug!(mode = %self.mode, tail = tail.len(), "input is not block aligned");
                    Err(CryptoError::InvalidParameter)?;
                }
                self.native.update(&tail, &mut output)?;
            }
            (_, PaddingMode::None) => {}
        }

        self.native.finish(&mut output)?;
        Ok(output)
    }
}

impl CryptoTransform for CipherTransform {
    fn input_block_size(&self) -> usize {
        self.block_size
    }

    fn output_block_size(&self) -> usize {
        self.block_size
    }

    fn can_transform_multiple_blocks(&self) -> bool {
        self.native.can_process_multiple_blocks()
    }

    fn can_reuse_transform(&self) -> bool {
        false
    }

    fn transform_block(&mut self, input: &[u8]) -> CryptoResult<Vec<u8>> {
        self.ensure_usable()?;
        self.process(input)
    }

    fn transform_final_block(&mut self, input: &[u8]) -> CryptoResult<Vec<u8>> {
        self.ensure_usable()?;
        let result = self.finish(input);
        self.finalized = true;
        self.held = None;
        self.buffer.clear();
        result
    }

    fn reset(&mut self) -> CryptoResult<()> {
        Err(CryptoError::InvalidState)
    }
}

impl std::fmt::Debug for CipherTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherTransform")
            .field("direction", &self.direction)
            .field("mode", &self.mode)
            .field("padding", &self.padding)
            .field("finalized", &self.finalized)
            .finish()
    }
}
