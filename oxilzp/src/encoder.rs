//! LZP compression.
//!
//! Every input byte is preceded by a skewed continuation flag. The byte
//! itself is coded as an LZP match flag and, when the prediction fails, as a
//! PPM symbol with the mispredicted byte excluded. The end of the stream is
//! a skewed `false` written by [`Encoder::finish`].

use crate::model::{Model, PpmModel, SymbolCoder};
use crate::options::Options;
use crate::range_coder::RangeEncoder;
use oxilzp_core::error::Result;
use oxilzp_core::io::{ByteSink, ByteSource};

impl<W: ByteSink> SymbolCoder for RangeEncoder<W> {
    fn code_flag(&mut self, probability: u16, matched: bool) -> Result<bool> {
        self.encode_flag(probability, matched)?;
        Ok(matched)
    }

    fn code_symbol(&mut self, ppm: &PpmModel, context: usize, symbol: u8, excluded: u8) -> Result<u8> {
        debug_assert_ne!(symbol, excluded, "excluded symbol cannot be coded");
        let cumulative = ppm.cumulative_frequency(context, symbol, excluded);
        let total = ppm.total(context) - ppm.frequency(context, excluded);
        self.encode_frequency(cumulative, ppm.frequency(context, symbol), total)?;
        Ok(symbol)
    }
}

/// Streaming LZP encoder.
pub struct Encoder<R: ByteSource, W: ByteSink> {
    input: R,
    rc: RangeEncoder<W>,
    model: Model,
    bytes_processed: u64,
    exhausted: bool,
}

impl<R: ByteSource, W: ByteSink> Encoder<R, W> {
    /// Create an encoder writing a raw payload (no header) to `output`.
    pub fn new(input: R, output: W, options: &Options) -> Self {
        Self {
            input,
            rc: RangeEncoder::new(output),
            model: Model::new(options),
            bytes_processed: 0,
            exhausted: false,
        }
    }

    /// Encode up to `limit` input bytes.
    ///
    /// Returns `true` once the input is exhausted; the stream is only
    /// complete after [`Encoder::finish`].
    pub fn encode(&mut self, limit: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(true);
        }

        for _ in 0..limit {
            let Some(byte) = self.input.read_byte()? else {
                self.exhausted = true;
                return Ok(true);
            };
            self.rc.encode_skewed(true)?;
            self.model.code_byte(&mut self.rc, byte)?;
            self.bytes_processed += 1;
        }

        Ok(false)
    }

    /// Number of input bytes encoded so far.
    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed
    }

    /// Number of payload bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.rc.bytes_written()
    }

    /// Whether recent literals were expensive to code.
    pub fn use_fixed_probabilities(&self) -> bool {
        self.model.ppm().use_fixed_probabilities()
    }

    /// Write the end marker, flush the range coder and return the sink.
    ///
    /// Bytes not yet consumed by [`Encoder::encode`] are left in the input.
    pub fn finish(mut self) -> Result<W> {
        self.rc.flush()?;
        Ok(self.rc.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{LzpConfig, PpmConfig};

    fn single_level() -> Options {
        Options::new(
            LzpConfig::new(3, 16),
            LzpConfig::new(3, 16),
            PpmConfig::new(1, 2, 20, 10000),
        )
        .unwrap()
    }

    fn encode_all(data: &[u8], options: &Options) -> Vec<u8> {
        let mut encoder = Encoder::new(data, Vec::new(), options);
        assert!(encoder.encode(u64::MAX).unwrap());
        assert_eq!(encoder.bytes_processed(), data.len() as u64);
        encoder.finish().unwrap()
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode_all(b"", &single_level()), vec![0xFF, 0xFF, 0xFF, 0xFC]);
    }

    #[test]
    fn test_encode_single_level_vector() {
        let out = encode_all(b"abracadabra abracadabra", &single_level());
        assert_eq!(
            out,
            vec![
                0xb1, 0x09, 0x81, 0x55, 0x41, 0x6a, 0xd5, 0xd5, 0x17, 0x0d, 0xa9, 0x85, 0x7e, 0x97,
                0x9a, 0xb4, 0xdb, 0x7f, 0xfe
            ]
        );
    }

    #[test]
    fn test_encode_in_intervals_matches_single_pass() {
        let data: Vec<u8> = b"interval boundaries must not change the output. ".repeat(20);
        let options = single_level();
        let expected = encode_all(&data, &options);

        let mut encoder = Encoder::new(data.as_slice(), Vec::new(), &options);
        let mut calls = 0;
        while !encoder.encode(7).unwrap() {
            calls += 1;
            assert_eq!(encoder.bytes_processed(), calls * 7);
        }
        assert_eq!(encoder.bytes_processed(), data.len() as u64);
        // repeated calls after exhaustion are harmless
        assert!(encoder.encode(7).unwrap());
        assert_eq!(encoder.finish().unwrap(), expected);
    }

    #[test]
    fn test_encode_exact_interval_multiple() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut encoder = Encoder::new(&data[..], Vec::new(), &single_level());
        assert!(!encoder.encode(3).unwrap());
        assert!(!encoder.encode(3).unwrap());
        assert!(encoder.encode(3).unwrap());
        assert_eq!(encoder.bytes_processed(), 6);
    }

    #[test]
    fn test_encode_compresses_repetition() {
        let data = vec![b'z'; 10_000];
        let out = encode_all(&data, &single_level());
        assert!(out.len() < 200, "compressed to {} bytes", out.len());
    }

    #[test]
    fn test_encode_deterministic() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i * i % 251) as u8).collect();
        let options = single_level();
        assert_eq!(encode_all(&data, &options), encode_all(&data, &options));
    }
}
