//! Range coder with carry propagation.
//!
//! Both registers are 31 bits wide. The encoder renormalizes by emitting
//! bits 30..23 of its buffer whenever the range drops below 2^23; a carry out
//! of bit 30 has to ripple into bytes that were already produced, so output
//! passes through a one-byte delay stage followed by a counted run of 0xFF
//! bytes, which turn into 0x00 when the carry arrives.
//!
//! The decoder sees the stream shifted right by one bit: its register starts
//! with an implicit zero bit and every input byte is split across two
//! register bytes.
//!
//! Supported decisions:
//! - flags with a 15-bit probability
//! - maximally skewed flags (the continuation / end marker)
//! - symbols from a cumulative frequency table with total below 2^15

use oxilzp_core::error::{OxiLzpError, Result};
use oxilzp_core::io::{ByteSink, ByteSource};

/// Mask of the 31-bit range and buffer registers.
pub const REGISTER_MASK: u32 = 0x7FFF_FFFF;

/// Renormalization threshold.
pub const TOP_VALUE: u32 = 1 << 23;

/// Bits of precision in flag probabilities.
pub const FLAG_PROBABILITY_BITS: u32 = 15;

/// Number of bytes the decoder reads before the first decision.
pub const DECODER_INIT_BYTES: usize = 4;

/// Number of bytes emitted when flushing the encoder.
const FLUSH_BYTES: usize = 5;

/// Range encoder writing to a byte sink.
#[derive(Debug)]
pub struct RangeEncoder<W: ByteSink> {
    output: W,
    buffer: u32,
    range: u32,
    /// Pending 0xFF bytes that a carry would turn into 0x00.
    ff_run: u64,
    /// Last non-0xFF byte, not yet written.
    last_byte: u8,
    delay: bool,
    carry: bool,
    bytes_written: u64,
}

impl<W: ByteSink> RangeEncoder<W> {
    /// Create a new range encoder.
    pub fn new(output: W) -> Self {
        Self {
            output,
            buffer: 0,
            range: REGISTER_MASK,
            ff_run: 0,
            last_byte: 0,
            delay: false,
            carry: false,
            bytes_written: 0,
        }
    }

    /// Number of bytes written to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn write(&mut self, byte: u8) -> Result<()> {
        self.output.write_byte(byte)?;
        self.bytes_written += 1;
        Ok(())
    }

    fn output_byte(&mut self, octet: u8) -> Result<()> {
        if octet == 0xFF {
            self.ff_run += 1;
            return Ok(());
        }

        if self.delay {
            self.write(self.last_byte.wrapping_add(u8::from(self.carry)))?;
        }
        let run_byte = if self.carry { 0x00 } else { 0xFF };
        while self.ff_run > 0 {
            self.ff_run -= 1;
            self.write(run_byte)?;
        }
        self.last_byte = octet;
        self.delay = true;
        self.carry = false;
        Ok(())
    }

    fn normalize(&mut self) -> Result<()> {
        while self.range < TOP_VALUE {
            self.output_byte((self.buffer >> 23) as u8)?;
            self.buffer = (self.buffer << 8) & REGISTER_MASK;
            self.range <<= 8;
        }
        Ok(())
    }

    fn add_with_carry(&mut self, value: u32) {
        self.buffer += value;
        if self.buffer > REGISTER_MASK {
            self.carry = true;
            self.buffer &= REGISTER_MASK;
        }
    }

    /// Encode a flag whose probability of being `true` is `probability / 2^15`.
    pub fn encode_flag(&mut self, probability: u16, flag: bool) -> Result<()> {
        self.normalize()?;
        let bound = (self.range >> FLAG_PROBABILITY_BITS) * u32::from(probability);
        if flag {
            self.range = bound;
        } else {
            self.add_with_carry(bound);
            self.range -= bound;
        }
        Ok(())
    }

    /// Encode a flag that is almost always `true`; `false` takes a single
    /// unit of range.
    pub fn encode_skewed(&mut self, flag: bool) -> Result<()> {
        self.normalize()?;
        if flag {
            self.range -= 1;
        } else {
            self.add_with_carry(self.range - 1);
            self.range = 1;
        }
        Ok(())
    }

    /// Encode the interval `[cumulative, cumulative + frequency)` out of `total`.
    pub fn encode_frequency(&mut self, cumulative: u32, frequency: u32, total: u32) -> Result<()> {
        self.normalize()?;
        let unit = self.range / total;
        self.add_with_carry(unit * cumulative);
        self.range = unit * frequency;
        Ok(())
    }

    /// Code the end marker and drain the buffer.
    ///
    /// The final drained byte is always zero and stays in the delay stage;
    /// the decoder never needs it.
    pub fn flush(&mut self) -> Result<()> {
        self.encode_skewed(false)?;
        for _ in 0..FLUSH_BYTES {
            self.output_byte((self.buffer >> 23) as u8)?;
            self.buffer = (self.buffer << 8) & REGISTER_MASK;
        }
        Ok(())
    }

    /// Get a reference to the sink.
    pub fn get_ref(&self) -> &W {
        &self.output
    }

    /// Consume the encoder and return the sink.
    pub fn into_inner(self) -> W {
        self.output
    }
}

/// Range decoder reading from a byte source.
#[derive(Debug)]
pub struct RangeDecoder<R: ByteSource> {
    input: R,
    buffer: u32,
    range: u32,
    next_high_bit: u8,
    position: u64,
}

impl<R: ByteSource> RangeDecoder<R> {
    /// Create a new range decoder, reading the first four bytes.
    pub fn new(input: R) -> Result<Self> {
        let mut decoder = Self {
            input,
            buffer: 0,
            range: REGISTER_MASK,
            next_high_bit: 0,
            position: 0,
        };
        for _ in 0..DECODER_INIT_BYTES {
            decoder.buffer = (decoder.buffer << 8) | u32::from(decoder.input_byte()?);
        }
        Ok(decoder)
    }

    /// Number of compressed bytes consumed.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn input_byte(&mut self) -> Result<u8> {
        let byte = self
            .input
            .read_byte()?
            .ok_or_else(|| OxiLzpError::unexpected_eof(1))?;
        self.position += 1;
        let current = (byte >> 1) | (self.next_high_bit << 7);
        self.next_high_bit = byte & 1;
        Ok(current)
    }

    fn normalize(&mut self) -> Result<()> {
        while self.range < TOP_VALUE {
            self.buffer = (self.buffer << 8) | u32::from(self.input_byte()?);
            self.range <<= 8;
        }
        Ok(())
    }

    /// Decode a flag coded with [`RangeEncoder::encode_flag`].
    pub fn decode_flag(&mut self, probability: u16) -> Result<bool> {
        self.normalize()?;
        let bound = (self.range >> FLAG_PROBABILITY_BITS) * u32::from(probability);
        if bound > self.buffer {
            self.range = bound;
            Ok(true)
        } else {
            self.range -= bound;
            self.buffer -= bound;
            Ok(false)
        }
    }

    /// Decode a flag coded with [`RangeEncoder::encode_skewed`].
    pub fn decode_skewed(&mut self) -> Result<bool> {
        self.normalize()?;
        if self.buffer < self.range - 1 {
            self.range -= 1;
            Ok(true)
        } else {
            self.buffer = 0;
            self.range = 1;
            Ok(false)
        }
    }

    /// Start decoding a symbol out of `total`; returns the target cumulative
    /// frequency. Must be followed by [`RangeDecoder::decode_update`].
    ///
    /// On a damaged stream the target can reach or exceed `total`.
    pub fn decode_frequency(&mut self, total: u32) -> Result<u32> {
        self.normalize()?;
        self.range /= total;
        Ok(self.buffer / self.range)
    }

    /// Finish decoding the symbol occupying `[cumulative, cumulative + frequency)`.
    pub fn decode_update(&mut self, cumulative: u32, frequency: u32) {
        self.buffer -= cumulative * self.range;
        self.range *= frequency;
    }

    /// Consume the decoder and return the source.
    pub fn into_inner(self) -> R {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random stream for test data.
    fn lcg(seed: &mut u32) -> u32 {
        *seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
        *seed >> 16
    }

    #[test]
    fn test_constants() {
        assert_eq!(REGISTER_MASK, (1 << 31) - 1);
        assert_eq!(TOP_VALUE, 0x0080_0000);
    }

    #[test]
    fn test_empty_flush() {
        let mut encoder = RangeEncoder::new(Vec::new());
        encoder.flush().unwrap();
        assert_eq!(encoder.bytes_written(), 4);
        assert_eq!(encoder.into_inner(), vec![0xFF, 0xFF, 0xFF, 0xFC]);
    }

    #[test]
    fn test_empty_decode() {
        let data = [0xFF, 0xFF, 0xFF, 0xFC];
        let mut decoder = RangeDecoder::new(&data[..]).unwrap();
        assert!(!decoder.decode_skewed().unwrap());
        assert_eq!(decoder.position(), 4);
    }

    #[test]
    fn test_decoder_truncated_init() {
        let data = [0x00, 0x01];
        let err = RangeDecoder::new(&data[..]).unwrap_err();
        assert!(matches!(err, OxiLzpError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_carry_ripples_through_ff_run() {
        let mut encoder = RangeEncoder::new(Vec::new());
        encoder.output_byte(0x12).unwrap();
        for _ in 0..5 {
            encoder.output_byte(0xFF).unwrap();
        }
        assert!(encoder.get_ref().is_empty());

        encoder.buffer = 0x7FFF_FFF0;
        encoder.add_with_carry(0x20);
        assert!(encoder.carry);
        assert_eq!(encoder.buffer, 0x10);

        encoder.output_byte(0x34).unwrap();
        assert_eq!(encoder.get_ref(), &vec![0x13, 0, 0, 0, 0, 0]);
        assert!(!encoder.carry);
        assert_eq!(encoder.last_byte, 0x34);
    }

    #[test]
    fn test_ff_run_without_carry() {
        let mut encoder = RangeEncoder::new(Vec::new());
        encoder.output_byte(0x12).unwrap();
        encoder.output_byte(0xFF).unwrap();
        encoder.output_byte(0xFF).unwrap();
        encoder.output_byte(0x00).unwrap();
        assert_eq!(encoder.get_ref(), &vec![0x12, 0xFF, 0xFF]);
    }

    #[test]
    fn test_carry_from_flag_coding() {
        // Buffer near the top of the register with pending 0xFF bytes: a
        // mismatch flag overflows and must clear the run.
        let mut encoder = RangeEncoder::new(Vec::new());
        encoder.output_byte(0x40).unwrap();
        encoder.output_byte(0xFF).unwrap();
        encoder.output_byte(0xFF).unwrap();
        encoder.buffer = 0x7FFF_FF00;
        encoder.range = TOP_VALUE;
        encoder.encode_flag(0x4000, false).unwrap();
        assert!(encoder.carry);
        encoder.flush().unwrap();
        let out = encoder.into_inner();
        assert_eq!(&out[..3], &[0x41, 0x00, 0x00]);
    }

    #[test]
    fn test_flag_roundtrip() {
        let mut seed = 7;
        let decisions: Vec<(u16, bool)> = (0..20_000)
            .map(|_| {
                let p = (lcg(&mut seed) % 32767 + 1) as u16;
                let flag = lcg(&mut seed) % 32768 < u32::from(p);
                (p, flag)
            })
            .collect();

        let mut encoder = RangeEncoder::new(Vec::new());
        for &(p, flag) in &decisions {
            encoder.encode_skewed(true).unwrap();
            encoder.encode_flag(p, flag).unwrap();
        }
        encoder.flush().unwrap();
        let data = encoder.into_inner();

        let mut decoder = RangeDecoder::new(data.as_slice()).unwrap();
        for &(p, flag) in &decisions {
            assert!(decoder.decode_skewed().unwrap());
            assert_eq!(decoder.decode_flag(p).unwrap(), flag);
        }
        assert!(!decoder.decode_skewed().unwrap());
        assert_eq!(decoder.position(), data.len() as u64);
    }

    #[test]
    fn test_frequency_roundtrip() {
        let frequencies: Vec<u32> = (0..64).map(|i| 1 + (i * 37) % 300).collect();
        let total: u32 = frequencies.iter().sum();
        let cumulative: Vec<u32> = frequencies
            .iter()
            .scan(0, |acc, &f| {
                let start = *acc;
                *acc += f;
                Some(start)
            })
            .collect();

        let mut seed = 99;
        let symbols: Vec<usize> = (0..10_000).map(|_| lcg(&mut seed) as usize % 64).collect();

        let mut encoder = RangeEncoder::new(Vec::new());
        for &s in &symbols {
            encoder.encode_frequency(cumulative[s], frequencies[s], total).unwrap();
        }
        encoder.flush().unwrap();
        let data = encoder.into_inner();

        let mut decoder = RangeDecoder::new(data.as_slice()).unwrap();
        for &s in &symbols {
            let target = decoder.decode_frequency(total).unwrap();
            assert!(target < total);
            let found = cumulative.iter().rposition(|&c| c <= target).unwrap();
            assert_eq!(found, s);
            decoder.decode_update(cumulative[found], frequencies[found]);
        }
        assert!(!decoder.decode_skewed().unwrap());
    }
}
