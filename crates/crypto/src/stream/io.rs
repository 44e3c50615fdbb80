// Copyright (C) Microsoft Corporation. All rights reserved.

use std::io;
use std::io::Read;
use std::io::Write;

use super::*;

const READ_CHUNK: usize = 4096;

/// Direction data flows through a [`CryptoStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoStreamMode {
    /// Reads pull from the inner reader and return transformed bytes.
    Read,
    /// Writes are transformed and pushed to the inner writer.
    Write,
}

/// `std::io` adapter that runs data through a [`CryptoTransform`].
///
/// In write mode the final block is emitted only by
/// [`CryptoStream::flush_final_block`] (or [`CryptoStream::finish`]);
/// dropping the stream without it loses the tail. In read mode the final
/// block is produced when the inner reader reports end of input.
///
/// Transform failures surface as [`io::ErrorKind::InvalidData`] wrapping a
/// [`CryptoError`]; see [`CryptoError::from_io_error`].
pub struct CryptoStream<S, T> {
    inner: S,
    transform: T,
    mode: CryptoStreamMode,
    output: Vec<u8>,
    position: usize,
    finalized: bool,
}

fn to_io(err: CryptoError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

impl CryptoError {
    /// Recovers the crypto failure carried by an error from [`CryptoStream`].
    pub fn from_io_error(err: &io::Error) -> Option<&CryptoError> {
        err.get_ref()
            .and_then(|inner| inner.downcast_ref::<CryptoError>())
    }
}

impl<S, T: CryptoTransform> CryptoStream<S, T> {
    pub fn new(inner: S, transform: T, mode: CryptoStreamMode) -> Self {
        Self {
            inner,
            transform,
            mode,
            output: Vec::new(),
            position: 0,
            finalized: false,
        }
    }

    pub fn mode(&self) -> CryptoStreamMode {
        self.mode
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    pub fn has_flushed_final_block(&self) -> bool {
        self.finalized
    }

    pub fn into_inner(self) -> (S, T) {
        (self.inner, self.transform)
    }

    fn check_mode(&self, mode: CryptoStreamMode) -> io::Result<()> {
        if self.mode != mode {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("stream was opened in {:?} mode", self.mode),
            ));
        }
        Ok(())
    }
}

impl<W: Write, T: CryptoTransform> CryptoStream<W, T> {
    /// Finalizes the transform and writes its remaining output.
    ///
    /// Fails with [`CryptoError::InvalidState`] if called twice.
    pub fn flush_final_block(&mut self) -> io::Result<()> {
        self.check_mode(CryptoStreamMode::Write)?;
        if self.finalized {
            return Err(to_io(CryptoError::InvalidState));
        }
        self.finalized = true;
        let tail = self.transform.transform_final_block(&[]).map_err(to_io)?;
        self.inner.write_all(&tail)?;
        self.inner.flush()
    }

    /// Flushes the final block if needed and returns the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.finalized {
            self.flush_final_block()?;
        }
        Ok(self.inner)
    }
}

impl<W: Write, T: CryptoTransform> Write for CryptoStream<W, T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_mode(CryptoStreamMode::Write)?;
        if self.finalized {
            return Err(to_io(CryptoError::InvalidState));
        }
        let out = self.transform.transform_block(buf).map_err(to_io)?;
        self.inner.write_all(&out)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<R: Read, T: CryptoTransform> Read for CryptoStream<R, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_mode(CryptoStreamMode::Read)?;
        if buf.is_empty() {
            return Ok(0);
        }

        while self.position == self.output.len() {
            if self.finalized {
                return Ok(0);
            }

            let mut chunk = [0u8; READ_CHUNK];
            let count = self.inner.read(&mut chunk)?;
            let produced = if count == 0 {
                self.finalized = true;
                self.transform.transform_final_block(&[])
            } else {
                self.transform.transform_block(&chunk[..count])
            };
            self.output = produced.map_err(to_io)?;
            self.position = 0;
        }

        let count = buf.len().min(self.output.len() - self.position);
        buf[..count].copy_from_slice(&self.output[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

impl<S, T> std::fmt::Debug for CryptoStream<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoStream")
            .field("mode", &self.mode)
            .field("buffered", &(self.output.len() - self.position))
            .field("finalized", &self.finalized)
            .finish()
    }
}
