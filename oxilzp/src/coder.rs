//! Stream container.
//!
//! A framed stream is laid out as:
//!
//! ```text
//! ┌──────────────────┬──────────────────┬─────────────────────────┐
//! │ magic (8, BE)    │ options (8, BE)  │ range coded payload ... │
//! └──────────────────┴──────────────────┴─────────────────────────┘
//! ```
//!
//! The raw variants skip the magic but still expect options for decoding,
//! which lets the payload be embedded in another format. Encoding and
//! decoding run in intervals of a caller-chosen number of bytes, reporting
//! the cumulative count to an optional progress callback after each one.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::options::Options;
use oxilzp_core::error::{OxiLzpError, Result};
use oxilzp_core::io::{ByteSink, ByteSource, read_u64_be, write_u64_be};
use tracing::{debug, trace};

/// Magic number opening every framed stream.
pub const HEADER_MAGIC: u64 = 0x208b_bb9f_5b12_98be;

/// Size of the magic plus packed options.
pub const HEADER_SIZE: usize = 16;

/// Default number of bytes between progress reports.
pub const DEFAULT_INTERVAL: u64 = 65536;

/// Read and validate the magic number and options of a framed stream.
pub fn read_options<R: ByteSource + ?Sized>(input: &mut R) -> Result<Options> {
    let magic = read_u64_be(input)?;
    if magic != HEADER_MAGIC {
        return Err(OxiLzpError::invalid_magic(HEADER_MAGIC, magic));
    }
    read_options_headerless(input)
}

/// Read and validate packed options not preceded by the magic number.
pub fn read_options_headerless<R: ByteSource + ?Sized>(input: &mut R) -> Result<Options> {
    let packed = read_u64_be(input)?;
    let options = Options::from_packed(packed).ok_or_else(|| OxiLzpError::invalid_options(packed))?;
    debug!("Parsed options {:#018x}: {:?}", packed, options);
    Ok(options)
}

/// Write the magic number and packed options.
pub fn write_header<W: ByteSink + ?Sized>(output: &mut W, options: &Options) -> Result<()> {
    write_u64_be(output, HEADER_MAGIC)?;
    write_u64_be(output, options.to_packed())
}

fn check_interval(interval: u64) -> Result<()> {
    if interval == 0 {
        return Err(OxiLzpError::invalid_interval(interval));
    }
    Ok(())
}

/// Run `step` until it reports completion, reporting progress after every
/// call. `step` returns whether it finished and the cumulative byte count.
fn run_intervals<F>(interval: u64, mut progress: Option<&mut dyn FnMut(u64)>, mut step: F) -> Result<u64>
where
    F: FnMut(u64) -> Result<(bool, u64)>,
{
    loop {
        let (done, processed) = step(interval)?;
        trace!("Interval complete: {} bytes processed", processed);
        if let Some(callback) = progress.as_deref_mut() {
            callback(processed);
        }
        if done {
            return Ok(processed);
        }
    }
}

/// Compress `input` into a framed stream.
///
/// Returns the number of input bytes compressed.
pub fn encode<R: ByteSource, W: ByteSink>(
    input: R,
    mut output: W,
    options: &Options,
    interval: u64,
    progress: Option<&mut dyn FnMut(u64)>,
) -> Result<u64> {
    check_interval(interval)?;
    write_header(&mut output, options)?;
    encode_payload(input, output, options, interval, progress)
}

/// Compress `input` into a bare payload without magic or options.
pub fn encode_raw<R: ByteSource, W: ByteSink>(
    input: R,
    output: W,
    options: &Options,
    interval: u64,
    progress: Option<&mut dyn FnMut(u64)>,
) -> Result<u64> {
    check_interval(interval)?;
    encode_payload(input, output, options, interval, progress)
}

fn encode_payload<R: ByteSource, W: ByteSink>(
    input: R,
    output: W,
    options: &Options,
    interval: u64,
    progress: Option<&mut dyn FnMut(u64)>,
) -> Result<u64> {
    debug!("Starting compression with {:?}", options);
    let mut encoder = Encoder::new(input, output, options);
    let processed = run_intervals(interval, progress, |limit| {
        let done = encoder.encode(limit)?;
        Ok((done, encoder.bytes_processed()))
    })?;

    debug!(
        "Compressed {} bytes, {} payload bytes before flush (literal cost high: {})",
        processed,
        encoder.bytes_written(),
        encoder.use_fixed_probabilities()
    );
    encoder.finish()?;
    Ok(processed)
}

/// Decompress a framed stream.
///
/// Returns the number of bytes decompressed.
pub fn decode<R: ByteSource, W: ByteSink>(
    mut input: R,
    output: W,
    interval: u64,
    progress: Option<&mut dyn FnMut(u64)>,
) -> Result<u64> {
    check_interval(interval)?;
    let options = read_options(&mut input)?;
    decode_payload(input, output, &options, interval, progress).map(|(processed, _)| processed)
}

/// Decompress a bare payload produced with [`encode_raw`].
pub fn decode_raw<R: ByteSource, W: ByteSink>(
    input: R,
    output: W,
    options: &Options,
    interval: u64,
    progress: Option<&mut dyn FnMut(u64)>,
) -> Result<u64> {
    check_interval(interval)?;
    decode_payload(input, output, options, interval, progress).map(|(processed, _)| processed)
}

/// Returns the bytes decoded and the payload bytes consumed.
fn decode_payload<R: ByteSource, W: ByteSink>(
    input: R,
    output: W,
    options: &Options,
    interval: u64,
    progress: Option<&mut dyn FnMut(u64)>,
) -> Result<(u64, u64)> {
    debug!("Starting decompression with {:?}", options);
    let mut decoder = Decoder::new(input, output, options)?;
    let processed = run_intervals(interval, progress, |limit| {
        let done = decoder.decode(limit)?;
        Ok((done, decoder.bytes_decoded()))
    })?;
    debug!(
        "Decompressed {} bytes from {} payload bytes",
        processed,
        decoder.position()
    );
    Ok((processed, decoder.position()))
}

/// Compress a byte slice into a framed stream.
pub fn compress(data: &[u8], options: &Options) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(HEADER_SIZE + data.len() / 2 + 8);
    encode(data, &mut output, options, DEFAULT_INTERVAL, None)?;
    Ok(output)
}

/// Decompress a framed stream held in a byte slice.
///
/// Fails with [`OxiLzpError::CorruptedData`] if bytes follow the end of
/// the payload.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut input = data;
    let options = read_options(&mut input)?;
    let mut output = Vec::new();
    let (_, consumed) = decode_payload(&mut input, &mut output, &options, DEFAULT_INTERVAL, None)?;
    if !input.is_empty() {
        return Err(OxiLzpError::corrupted(
            consumed,
            format!("{} trailing bytes after end of stream", input.len()),
        ));
    }
    Ok(output)
}

/// Read the options of a framed stream without decoding it.
pub fn inspect(data: &[u8]) -> Result<Options> {
    let mut input = data;
    read_options(&mut input)
}
