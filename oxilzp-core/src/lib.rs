//! # OxiLZP Core
//!
//! Core components for the OxiLZP compressor.
//!
//! This crate provides the building blocks the codec is written against:
//!
//! - [`io`]: Byte source/sink traits over `Read`/`Write`
//! - [`lg2`]: Fixed-point base-2 logarithm for cost tracking
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Container                                               │
//! │     magic header, packed options, progress intervals   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec                                                   │
//! │     LZP + SEE + PPM model, range encoder/decoder       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     ByteSource/ByteSink, lg2, errors                   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxilzp_core::io::{ByteSink, ByteSource};
//! use oxilzp_core::lg2::nlog2;
//!
//! let mut input: &[u8] = &[0x42];
//! assert_eq!(input.read_byte().unwrap(), Some(0x42));
//! assert_eq!(input.read_byte().unwrap(), None);
//!
//! let mut output = Vec::new();
//! output.write_byte(0x42).unwrap();
//! assert_eq!(output, vec![0x42]);
//!
//! assert_eq!(nlog2(1024), 10 << 14);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod io;
pub mod lg2;

// Re-exports for convenience
pub use error::{OxiLzpError, Result};
pub use io::{ByteSink, ByteSource};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{OxiLzpError, Result};
    pub use crate::io::{ByteSink, ByteSource};
}
