//! Byte-oriented stream traits.
//!
//! The codec reads and writes one byte at a time. These traits are the only
//! I/O surface it sees, so any `Read`/`Write` implementation (slices,
//! vectors, files, buffered wrappers) can be plugged in directly.
//!
//! Per-byte calls on an unbuffered file are slow; wrap files in
//! `BufReader`/`BufWriter` before handing them to a codec.

use crate::error::Result;
use std::io::{ErrorKind, Read, Write};

/// A sequential source of bytes with end-of-stream signaling.
pub trait ByteSource {
    /// Read the next byte, or `None` once the stream is exhausted.
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

/// A sequential sink of bytes.
pub trait ByteSink {
    /// Write a single byte.
    fn write_byte(&mut self, byte: u8) -> Result<()>;
}

impl<R: Read + ?Sized> ByteSource for R {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<W: Write + ?Sized> ByteSink for W {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write_all(&[byte])?;
        Ok(())
    }
}

/// Read a big-endian `u64`, failing with `UnexpectedEof` on a short read.
pub fn read_u64_be<S: ByteSource + ?Sized>(source: &mut S) -> Result<u64> {
    let mut value = 0u64;
    for i in 0..8 {
        let byte = source
            .read_byte()?
            .ok_or_else(|| crate::error::OxiLzpError::unexpected_eof(8 - i))?;
        value = (value << 8) | u64::from(byte);
    }
    Ok(value)
}

/// Write a big-endian `u64`.
pub fn write_u64_be<S: ByteSink + ?Sized>(sink: &mut S, value: u64) -> Result<()> {
    for byte in value.to_be_bytes() {
        sink.write_byte(byte)?;
    }
    Ok(())
}
