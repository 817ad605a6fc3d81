//! Container header formats
//!
//! Each container kind has its own header layout and schema history. A
//! format resolves the raw header bytes into its canonical header record
//! (migrating legacy layouts on the way), and knows how to turn the validated
//! payload bytes into a typed [`DecodedPayload`].

use crate::types::{Compression, ContainerKind, DecodedPayload, DecoderError, Result};
use serde::Serialize;
use std::fmt;

pub mod classification;
mod layout;
pub mod timesignal;
pub mod trend;

pub use classification::{
    ClassificationDimension, ClassificationFormat, ClassificationHeader, ClassificationVersion,
};
pub use layout::read_preamble;
pub use timesignal::{TimeSignalFormat, TimeSignalHeader, TimeSignalVersion};
pub use trend::{TrendFormat, TrendHeader, TrendVersion};

/// Fields every canonical container header exposes to the decode pipeline
pub trait ContainerHeader: fmt::Debug + Clone + Serialize {
    /// Schema version as stored (legacy versions are kept after migration)
    fn version(&self) -> u16;

    /// Declared header size; the payload starts at this offset
    fn header_size(&self) -> u16;

    fn compression(&self) -> Compression;

    /// Number of stored (possibly compressed) payload bytes
    fn byte_count(&self) -> u64;

    fn checksum_data(&self) -> u16;

    fn checksum_header(&self) -> u16;

    /// Fixed size of the layout this header was parsed from
    fn layout_len(&self) -> usize;

    /// Canonical byte image of this header, stored header checksum last
    fn encode(&self) -> Vec<u8>;
}

/// A container kind: header schema plus payload interpretation
pub trait ContainerFormat {
    type Header: ContainerHeader;

    const KIND: ContainerKind;

    /// Parse the header at the front of `bytes` into its canonical form.
    ///
    /// Legacy layouts are verified against their own checksum and migrated;
    /// the returned header always carries a checksum that matches its
    /// canonical encoding.
    fn resolve_header(bytes: &[u8]) -> Result<Self::Header>;

    /// Payload size in bytes once inflated, as implied by the header
    fn decoded_len(header: &Self::Header) -> Result<u64>;

    /// Reinterpret the validated, uncompressed payload
    fn decode_payload(header: &Self::Header, payload: &[u8]) -> Result<DecodedPayload>;
}

impl ContainerKind {
    /// Sniff the container kind from the header preamble.
    ///
    /// The `(version, header_size)` pair identifies the layout: classification
    /// (1, 480) and (2, 488), time signal (3, 120) and (4, 200), trend (3, 96).
    pub fn detect(bytes: &[u8]) -> Result<Self> {
        let (version, header_size) = read_preamble(bytes)?;
        let size = usize::from(header_size);

        let kind = if ClassificationVersion::try_from(version)
            .is_ok_and(|v| v.layout_len() == size)
        {
            ContainerKind::Classification
        } else if TimeSignalVersion::try_from(version).is_ok_and(|v| v.layout_len() == size) {
            ContainerKind::TimeSignal
        } else if TrendVersion::try_from(version).is_ok_and(|v| v.layout_len() == size) {
            ContainerKind::Trend
        } else {
            return Err(DecoderError::UnknownContainerKind {
                version,
                header_size,
            });
        };

        log::debug!(
            "Detected {} container (version {}, header size {})",
            kind,
            version,
            header_size
        );
        Ok(kind)
    }
}
