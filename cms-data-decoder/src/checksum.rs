//! 16-bit XOR fold checksum
//!
//! Both the header checksum and the data checksum of every container use the
//! same fold: the byte range is read as little-endian 16-bit words which are
//! XORed together. A trailing odd byte is XORed in zero-extended.

use crate::types::{DecoderError, Result};

/// Compute the fold checksum over `bytes`
pub fn fold_checksum(bytes: &[u8]) -> u16 {
    let mut words = bytes.chunks_exact(2);
    let mut checksum = words
        .by_ref()
        .fold(0u16, |acc, word| acc ^ u16::from_le_bytes([word[0], word[1]]));

    if let [last] = words.remainder() {
        checksum ^= u16::from(*last);
    }

    checksum
}

/// Verify a header checksum stored in the last two bytes of `header`
///
/// The checksum covers every header byte except the stored value itself.
pub(crate) fn verify_header(header: &[u8], stored: u16) -> Result<()> {
    let covered = header.len().saturating_sub(2);
    let computed = fold_checksum(&header[..covered]);
    if computed != stored {
        log::debug!(
            "Header checksum mismatch over {} bytes: stored 0x{:04X}, computed 0x{:04X}",
            covered,
            stored,
            computed
        );
        return Err(DecoderError::HeaderChecksumMismatch { stored, computed });
    }
    Ok(())
}

/// Verify a data checksum over the payload exactly as stored
pub(crate) fn verify_data(payload: &[u8], stored: u16) -> Result<()> {
    let computed = fold_checksum(payload);
    if computed != stored {
        return Err(DecoderError::DataChecksumMismatch { stored, computed });
    }
    Ok(())
}
