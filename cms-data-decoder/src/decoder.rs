//! Main decoder API
//!
//! [`ContainerDecoder`] runs one container buffer through a fixed sequence of
//! checks and transformations:
//!
//! 1. resolve the header (migrating legacy layouts)
//! 2. verify the header checksum over the canonical encoding
//! 3. verify `header_size + byte_count` against the buffer length
//! 4. verify the data checksum over the stored payload
//! 5. inflate the payload if the header says it is compressed
//! 6. reinterpret the payload as typed samples, counters or trend entries
//!
//! The first failing step ends the decode. There are no retries and no
//! partial results.

use crate::checksum;
use crate::compression::{self, InflateMode};
use crate::config::DecoderConfig;
use crate::formats::{
    ClassificationFormat, ClassificationHeader, ContainerFormat, ContainerHeader,
    TimeSignalFormat, TimeSignalHeader, TrendFormat, TrendHeader,
};
use crate::types::{ContainerKind, DecodedPayload, DecoderError, Result, SizeContext};
use serde::Serialize;
use std::borrow::Cow;

/// Progress of a single decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    RawInput,
    HeaderResolved,
    HeaderVerified,
    SizeVerified,
    DataVerified,
    Decompressed,
    /// Payload was stored uncompressed
    Unchanged,
    SamplesDecoded,
    Done,
}

struct Progress {
    kind: ContainerKind,
    stage: DecodeStage,
}

impl Progress {
    fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            stage: DecodeStage::RawInput,
        }
    }

    fn advance(&mut self, next: DecodeStage) {
        log::trace!("{} container: {:?} -> {:?}", self.kind, self.stage, next);
        self.stage = next;
    }
}

/// A decoded container: canonical header plus typed payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoded<H> {
    pub header: H,
    pub payload: DecodedPayload,
}

/// A decoded container of any kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedContainer {
    Classification(Decoded<ClassificationHeader>),
    TimeSignal(Decoded<TimeSignalHeader>),
    Trend(Decoded<TrendHeader>),
}

impl DecodedContainer {
    pub fn kind(&self) -> ContainerKind {
        match self {
            DecodedContainer::Classification(_) => ContainerKind::Classification,
            DecodedContainer::TimeSignal(_) => ContainerKind::TimeSignal,
            DecodedContainer::Trend(_) => ContainerKind::Trend,
        }
    }

    pub fn payload(&self) -> &DecodedPayload {
        match self {
            DecodedContainer::Classification(decoded) => &decoded.payload,
            DecodedContainer::TimeSignal(decoded) => &decoded.payload,
            DecodedContainer::Trend(decoded) => &decoded.payload,
        }
    }
}

/// The main decoder struct - entry point for all decoding operations
///
/// A decoder holds only its configuration. Every call works on its own input
/// and returns independently owned results, so one decoder can be shared
/// freely.
#[derive(Debug, Clone, Default)]
pub struct ContainerDecoder {
    config: DecoderConfig,
}

impl ContainerDecoder {
    /// Create a decoder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a container whose kind is known at compile time
    ///
    /// # Example
    /// ```no_run
    /// use cms_data_decoder::{ContainerDecoder, TimeSignalFormat};
    ///
    /// let bytes = std::fs::read("signal.bin").unwrap();
    /// let decoded = ContainerDecoder::new()
    ///     .decode::<TimeSignalFormat>(&bytes)
    ///     .unwrap();
    /// println!("{} samples", decoded.header.sample_count);
    /// ```
    pub fn decode<F: ContainerFormat>(&self, bytes: &[u8]) -> Result<Decoded<F::Header>> {
        log::debug!("Decoding {} container ({} bytes)", F::KIND, bytes.len());

        let mut progress = Progress::new(F::KIND);
        let result = self.run::<F>(bytes, &mut progress);
        if let Err(e) = &result {
            log::debug!(
                "{} container failed after {:?}: {}",
                F::KIND,
                progress.stage,
                e
            );
        }
        result
    }

    /// Decode a container whose kind is chosen at runtime
    pub fn decode_kind(&self, kind: ContainerKind, bytes: &[u8]) -> Result<DecodedContainer> {
        match kind {
            ContainerKind::Classification => self
                .decode::<ClassificationFormat>(bytes)
                .map(DecodedContainer::Classification),
            ContainerKind::TimeSignal => self
                .decode::<TimeSignalFormat>(bytes)
                .map(DecodedContainer::TimeSignal),
            ContainerKind::Trend => self
                .decode::<TrendFormat>(bytes)
                .map(DecodedContainer::Trend),
        }
    }

    /// Detect the container kind from the header preamble, then decode
    pub fn decode_auto(&self, bytes: &[u8]) -> Result<DecodedContainer> {
        let kind = ContainerKind::detect(bytes)?;
        self.decode_kind(kind, bytes)
    }

    fn run<F: ContainerFormat>(
        &self,
        bytes: &[u8],
        progress: &mut Progress,
    ) -> Result<Decoded<F::Header>> {
        let header = F::resolve_header(bytes)?;
        progress.advance(DecodeStage::HeaderResolved);

        checksum::verify_header(&header.encode(), header.checksum_header())?;
        progress.advance(DecodeStage::HeaderVerified);

        let payload = self.stored_payload(&header, bytes)?;
        progress.advance(DecodeStage::SizeVerified);

        checksum::verify_data(payload, header.checksum_data())?;
        progress.advance(DecodeStage::DataVerified);

        let data = match InflateMode::for_compression(header.compression())? {
            Some(mode) => {
                let expected = self.inflated_len::<F>(&header)?;
                let inflated = compression::inflate(payload, expected, mode)?;
                progress.advance(DecodeStage::Decompressed);
                Cow::Owned(inflated)
            }
            None => {
                progress.advance(DecodeStage::Unchanged);
                Cow::Borrowed(payload)
            }
        };

        let payload = F::decode_payload(&header, &data)?;
        progress.advance(DecodeStage::SamplesDecoded);
        progress.advance(DecodeStage::Done);

        Ok(Decoded { header, payload })
    }

    /// Check the declared sizes against the buffer and slice out the payload.
    ///
    /// Header bytes past the fixed layout (up to `header_size`) are skipped
    /// and covered by neither checksum.
    fn stored_payload<'a, H: ContainerHeader>(
        &self,
        header: &H,
        bytes: &'a [u8],
    ) -> Result<&'a [u8]> {
        let header_size = usize::from(header.header_size());
        if header_size < header.layout_len() {
            return Err(DecoderError::size_mismatch(
                SizeContext::Header,
                header.layout_len() as u64,
                header_size as u64,
            ));
        }
        if header_size > header.layout_len() {
            log::warn!(
                "{} bytes of header padding after the {}-byte layout are not checksummed",
                header_size - header.layout_len(),
                header.layout_len()
            );
        }

        // An overflowing sum can never match a buffer length.
        let expected = (header_size as u64)
            .checked_add(header.byte_count())
            .unwrap_or(u64::MAX);
        if expected != bytes.len() as u64 {
            return Err(DecoderError::size_mismatch(
                SizeContext::Container,
                expected,
                bytes.len() as u64,
            ));
        }

        Ok(&bytes[header_size..])
    }

    fn inflated_len<F: ContainerFormat>(&self, header: &F::Header) -> Result<usize> {
        let declared = F::decoded_len(header)?;
        if !self.config.allows_payload(declared) {
            return Err(DecoderError::PayloadTooLarge {
                declared,
                limit: self.config.max_payload_len,
            });
        }
        usize::try_from(declared).map_err(|_| DecoderError::PayloadTooLarge {
            declared,
            limit: usize::MAX as u64,
        })
    }
}
