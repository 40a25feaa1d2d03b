//! # OxiLZP
//!
//! LZP (Lempel-Ziv Prediction) compression with a PPM literal coder.
//!
//! Each byte is first predicted from a hash of its preceding context. A
//! correct prediction costs a single binary flag; a wrong one falls back to
//! an order-1 or order-2 PPM model that codes the byte with the mispredicted
//! value excluded. Two LZP levels with different context lengths compete per
//! byte, and SEE (secondary estimation) turns the slot state and recent
//! match history into the flag probability.
//!
//! ## Features
//!
//! - **Pure Rust** implementation
//! - Streaming encoder and decoder over any `Read`/`Write`
//! - Bounded intervals with progress callbacks
//! - Self-describing streams (magic number + packed options)
//! - Raw payloads for embedding in other formats
//!
//! ## Usage
//!
//! ```no_run
//! use oxilzp::{Options, compress, decompress};
//!
//! let data = b"hello hello hello hello";
//! let compressed = compress(data, &Options::default())?;
//! let decompressed = decompress(&compressed)?;
//! assert_eq!(decompressed, data);
//! # Ok::<(), oxilzp::OxiLzpError>(())
//! ```
//!
//! ### Custom options
//!
//! ```rust
//! use oxilzp::{LzpConfig, Options, PpmConfig};
//!
//! let options = Options::new(
//!     LzpConfig::new(3, 20),
//!     LzpConfig::new(6, 22),
//!     PpmConfig::new(1, 2, 40, 16000),
//! )?;
//! let compressed = oxilzp::compress(b"abcabcabc", &options)?;
//! assert_eq!(oxilzp::inspect(&compressed)?, options);
//! # Ok::<(), oxilzp::OxiLzpError>(())
//! ```
//!
//! ## Memory
//!
//! Each LZP level allocates `2 << mask_size` bytes and order-2 PPM about
//! 34 MB. The default options need close to 300 MB; smaller mask sizes trade
//! prediction quality for memory.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coder;
pub mod decoder;
pub mod encoder;
pub mod fsm;
pub mod model;
pub mod options;
pub mod range_coder;

// Re-exports
pub use coder::{
    DEFAULT_INTERVAL, HEADER_MAGIC, compress, decode, decode_raw, decompress, encode, encode_raw,
    inspect, read_options, read_options_headerless,
};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use model::{Model, SymbolCoder};
pub use options::{LzpConfig, Options, PpmConfig};
pub use oxilzp_core::error::{OxiLzpError, Result};
pub use range_coder::{RangeDecoder, RangeEncoder};

/// Compress data to a Vec using default options.
///
/// This is a convenience wrapper around [`compress`] with [`Options::default`].
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    compress(data, &Options::default())
}

/// Decompress a framed stream to a Vec.
///
/// This is a convenience wrapper around [`decompress`].
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    decompress(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_options() -> Options {
        Options::new(
            LzpConfig::new(4, 18),
            LzpConfig::new(7, 19),
            PpmConfig::new(2, 1, 60, 30000),
        )
        .unwrap()
    }

    #[test]
    fn test_compress_decompress_single_byte() {
        let original = b"A";
        let compressed = compress(original, &small_options()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_compress_decompress_empty() {
        let original: &[u8] = b"";
        let compressed = compress(original, &small_options()).unwrap();
        assert_eq!(compressed.len(), 20);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_compress_decompress_roundtrip() {
        let original = b"Hello, LZP World! This is a test of compression and decompression.";
        let compressed = compress(original, &small_options()).unwrap();
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_compress_decompress_repeated() {
        let original = vec![b'A'; 1000];
        let compressed = compress(&original, &small_options()).unwrap();
        assert!(compressed.len() < 100);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_text_compresses() {
        let mut data = Vec::new();
        for _ in 0..50 {
            data.extend_from_slice(b"The quick brown fox jumps over the lazy dog. ");
        }
        let compressed = compress(&data, &small_options()).unwrap();
        assert!(compressed.len() < data.len() / 4);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }
}
