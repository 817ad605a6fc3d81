//! Payload inflation
//!
//! Compressed payloads are DEFLATE streams in one of two wrappings, selected by
//! the header's compression tag. The devices' firmware expresses the choice as
//! a zlib window-bits value: 15 for a zlib-wrapped stream, 31 (15 + 16) for a
//! gzip-wrapped stream. Both are inflated here into a buffer bounded by the
//! size the header implies.

use crate::types::{Compression, DecoderError, Result, SizeContext};
use flate2::read::GzDecoder;
use flate2::{Decompress, FlushDecompress, Status};
use std::io::Read;

/// DEFLATE wrapping of a compressed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateMode {
    /// zlib header and Adler-32 trailer (window bits 15)
    Zlib,
    /// gzip header and CRC-32 trailer (window bits 31)
    Gzip,
}

impl InflateMode {
    /// zlib `windowBits` value that selects this wrapping
    pub fn window_bits(self) -> i32 {
        match self {
            InflateMode::Zlib => 15,
            InflateMode::Gzip => 31,
        }
    }

    /// Map a zlib `windowBits` value back to a wrapping
    pub fn from_window_bits(window_bits: i32) -> Option<Self> {
        match window_bits {
            15 => Some(InflateMode::Zlib),
            31 => Some(InflateMode::Gzip),
            _ => None,
        }
    }

    /// Select the inflate mode for a header compression tag.
    ///
    /// Returns `Ok(None)` for uncompressed payloads, which bypass inflation.
    pub fn for_compression(compression: Compression) -> Result<Option<Self>> {
        match compression {
            Compression::None => Ok(None),
            Compression::Zlib => Ok(Some(InflateMode::Zlib)),
            Compression::Gzip => Ok(Some(InflateMode::Gzip)),
            other => Err(DecoderError::UnsupportedCompressionMode(other)),
        }
    }
}

/// Inflate `compressed` and check that exactly `expected_len` bytes come out.
///
/// Corrupt or truncated streams and streams that need a preset dictionary
/// yield [`DecoderError::DecompressionFailure`]. A stream that inflates to a
/// different length yields [`DecoderError::SizeMismatch`]. At most
/// `expected_len + 1` bytes are ever produced.
pub fn inflate(compressed: &[u8], expected_len: usize, mode: InflateMode) -> Result<Vec<u8>> {
    log::trace!(
        "Inflating {} bytes (window bits {}), expecting {} bytes",
        compressed.len(),
        mode.window_bits(),
        expected_len
    );

    let output = match mode {
        InflateMode::Zlib => inflate_zlib(compressed, expected_len)?,
        InflateMode::Gzip => inflate_gzip(compressed, expected_len)?,
    };

    if output.len() != expected_len {
        return Err(DecoderError::size_mismatch(
            SizeContext::Decompressed,
            expected_len as u64,
            output.len() as u64,
        ));
    }

    Ok(output)
}

fn inflate_zlib(compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    // One spare byte so an overlong stream shows up as a length mismatch.
    let mut output = Vec::with_capacity(expected_len.saturating_add(1));

    let status = inflater
        .decompress_vec(compressed, &mut output, FlushDecompress::Finish)
        .map_err(|e| DecoderError::DecompressionFailure(e.to_string()))?;

    match status {
        Status::StreamEnd => Ok(output),
        Status::Ok | Status::BufError if output.len() == output.capacity() => Ok(output),
        Status::Ok | Status::BufError => Err(DecoderError::DecompressionFailure(format!(
            "truncated zlib stream after {} of {} input bytes",
            inflater.total_in(),
            compressed.len()
        ))),
    }
}

fn inflate_gzip(compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let limit = (expected_len as u64).saturating_add(1);
    let mut output = Vec::with_capacity(expected_len);

    GzDecoder::new(compressed)
        .take(limit)
        .read_to_end(&mut output)
        .map_err(|e| DecoderError::DecompressionFailure(e.to_string()))?;

    Ok(output)
}
