//! LZP decompression.
//!
//! Mirrors [`crate::encoder`]: the same [`Model`] evolves in lockstep, with
//! flags and symbols read from the range decoder instead of the input.

use crate::model::{Model, PpmModel, SymbolCoder};
use crate::options::Options;
use crate::range_coder::RangeDecoder;
use oxilzp_core::error::{OxiLzpError, Result};
use oxilzp_core::io::{ByteSink, ByteSource};

impl<R: ByteSource> SymbolCoder for RangeDecoder<R> {
    fn code_flag(&mut self, probability: u16, _matched: bool) -> Result<bool> {
        self.decode_flag(probability)
    }

    fn code_symbol(&mut self, ppm: &PpmModel, context: usize, _symbol: u8, excluded: u8) -> Result<u8> {
        let total = ppm.total(context) - ppm.frequency(context, excluded);
        let target = self.decode_frequency(total)?;
        let (symbol, cumulative) = ppm
            .find_symbol(context, target, excluded)
            .ok_or_else(|| {
                OxiLzpError::corrupted(
                    self.position(),
                    format!("cumulative frequency {target} outside total {total}"),
                )
            })?;
        self.decode_update(cumulative, ppm.frequency(context, symbol));
        Ok(symbol)
    }
}

/// Streaming LZP decoder.
pub struct Decoder<R: ByteSource, W: ByteSink> {
    rc: RangeDecoder<R>,
    output: W,
    model: Model,
    bytes_decoded: u64,
    finished: bool,
}

impl<R: ByteSource, W: ByteSink> Decoder<R, W> {
    /// Create a decoder for a raw payload (no header).
    ///
    /// Reads the first four payload bytes immediately.
    pub fn new(input: R, output: W, options: &Options) -> Result<Self> {
        Ok(Self {
            rc: RangeDecoder::new(input)?,
            output,
            model: Model::new(options),
            bytes_decoded: 0,
            finished: false,
        })
    }

    /// Decode up to `limit` bytes.
    ///
    /// Returns `true` once the end marker has been read.
    pub fn decode(&mut self, limit: u64) -> Result<bool> {
        if self.finished {
            return Ok(true);
        }

        for _ in 0..limit {
            if !self.rc.decode_skewed()? {
                self.finished = true;
                return Ok(true);
            }
            let byte = self.model.code_byte(&mut self.rc, 0)?;
            self.output.write_byte(byte)?;
            self.bytes_decoded += 1;
        }

        Ok(false)
    }

    /// Number of bytes decoded so far.
    pub fn bytes_decoded(&self) -> u64 {
        self.bytes_decoded
    }

    /// Number of payload bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.rc.position()
    }

    /// Whether the end marker has been read.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume the decoder and return the source and the sink.
    pub fn into_parts(self) -> (R, W) {
        (self.rc.into_inner(), self.output)
    }
}
