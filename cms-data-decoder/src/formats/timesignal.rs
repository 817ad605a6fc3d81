//! Time signal container header
//!
//! Version 4 is current (200 bytes). Version 3 (120 bytes) ends after the
//! rotational frequency and is migrated on read.

use super::layout::{FieldReader, FieldWriter};
use super::{ContainerFormat, ContainerHeader};
use crate::checksum::{fold_checksum, verify_header};
use crate::samples;
use crate::types::{
    micros_to_timestamp, Compression, ContainerKind, ContentId, DecodedPayload, DecoderError,
    Result, SampleType, SignalType, SizeContext, Timestamp,
};
use serde::Serialize;

const UNUSED_LEN: usize = 68;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSignalVersion {
    /// Legacy layout without the order-domain fields
    V3,
    V4,
}

impl TimeSignalVersion {
    pub const CURRENT: TimeSignalVersion = TimeSignalVersion::V4;

    pub fn layout_len(self) -> usize {
        match self {
            TimeSignalVersion::V3 => 120,
            TimeSignalVersion::V4 => 200,
        }
    }
}

impl TryFrom<u16> for TimeSignalVersion {
    type Error = DecoderError;

    fn try_from(version: u16) -> Result<Self> {
        match version {
            3 => Ok(TimeSignalVersion::V3),
            4 => Ok(TimeSignalVersion::V4),
            _ => Err(DecoderError::UnsupportedSchemaVersion {
                kind: ContainerKind::TimeSignal,
                version,
            }),
        }
    }
}

/// Canonical (version 4) time signal header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSignalHeader {
    pub version: u16,
    pub header_size: u16,
    pub signal_type: SignalType,
    pub uuid_config: ContentId,
    pub uuid_measurement: ContentId,
    /// Distance between samples on the x axis (seconds, Hz or orders)
    pub delta_x: f64,
    pub scaling_factor: f64,
    pub offset: f64,
    /// Acquisition time, microseconds since epoch
    pub timestamp: i64,
    pub unit: ContentId,
    pub compression: Compression,
    /// Raw sample type tag; validated when the payload is decoded
    pub sample_type: u32,
    pub sample_count: u64,
    pub byte_count: u64,
    /// Shaft speed in Hz during acquisition
    pub rotational_frequency: f32,
    pub order_domain_filter_delay_revolutions: f32,
    /// Time of the first sample, 0 when unset
    pub timestamp_first_sample: i64,
    #[serde(skip)]
    pub(crate) unused: [u8; UNUSED_LEN],
    pub checksum_data: u16,
    pub checksum_header: u16,
}

impl TimeSignalHeader {
    /// Size of the canonical layout
    pub const LEN: usize = 200;

    pub fn time(&self) -> Option<Timestamp> {
        micros_to_timestamp(self.timestamp)
    }

    pub fn first_sample_time(&self) -> Option<Timestamp> {
        micros_to_timestamp(self.timestamp_first_sample)
    }

    /// Scale a raw sample value into engineering units
    pub fn scale(&self, raw: f64) -> f64 {
        (raw - self.offset) * self.scaling_factor
    }

    fn read(bytes: &[u8], version: TimeSignalVersion) -> Result<Self> {
        let layout_len = version.layout_len();
        let mut reader = FieldReader::new(bytes, layout_len)?;

        let mut header = Self {
            version: reader.u16()?,
            header_size: reader.u16()?,
            signal_type: SignalType::from(reader.u32()?),
            uuid_config: reader.content_id()?,
            uuid_measurement: reader.content_id()?,
            delta_x: reader.f64()?,
            scaling_factor: reader.f64()?,
            offset: reader.f64()?,
            timestamp: reader.i64()?,
            unit: reader.content_id()?,
            compression: Compression::from(reader.u32()?),
            sample_type: reader.u32()?,
            sample_count: reader.u64()?,
            byte_count: reader.u64()?,
            rotational_frequency: reader.f32()?,
            order_domain_filter_delay_revolutions: 0.0,
            timestamp_first_sample: 0,
            unused: [0; UNUSED_LEN],
            checksum_data: 0,
            checksum_header: 0,
        };

        if version == TimeSignalVersion::V4 {
            header.order_domain_filter_delay_revolutions = reader.f32()?;
            header.timestamp_first_sample = reader.i64()?;
            header.unused = reader.array()?;
        }
        header.checksum_data = reader.u16()?;
        header.checksum_header = reader.u16()?;

        debug_assert_eq!(reader.position(), layout_len);
        Ok(header)
    }

    fn migrate_v3(bytes: &[u8]) -> Result<Self> {
        let mut header = Self::read(bytes, TimeSignalVersion::V3)?;
        verify_header(
            &bytes[..TimeSignalVersion::V3.layout_len()],
            header.checksum_header,
        )?;

        header.checksum_header = fold_checksum(&header.encode()[..Self::LEN - 2]);
        log::debug!(
            "Migrated time signal header v3 -> {:?} (checksum 0x{:04X})",
            TimeSignalVersion::CURRENT,
            header.checksum_header
        );
        Ok(header)
    }
}

impl ContainerHeader for TimeSignalHeader {
    fn version(&self) -> u16 {
        self.version
    }

    fn header_size(&self) -> u16 {
        self.header_size
    }

    fn compression(&self) -> Compression {
        self.compression
    }

    fn byte_count(&self) -> u64 {
        self.byte_count
    }

    fn checksum_data(&self) -> u16 {
        self.checksum_data
    }

    fn checksum_header(&self) -> u16 {
        self.checksum_header
    }

    fn layout_len(&self) -> usize {
        TimeSignalVersion::try_from(self.version)
            .map(TimeSignalVersion::layout_len)
            .unwrap_or(Self::LEN)
    }

    fn encode(&self) -> Vec<u8> {
        let mut writer = FieldWriter::with_capacity(Self::LEN);
        writer
            .u16(self.version)
            .u16(self.header_size)
            .u32(self.signal_type.into())
            .bytes(self.uuid_config.as_bytes())
            .bytes(self.uuid_measurement.as_bytes())
            .f64(self.delta_x)
            .f64(self.scaling_factor)
            .f64(self.offset)
            .i64(self.timestamp)
            .bytes(self.unit.as_bytes())
            .u32(self.compression.tag())
            .u32(self.sample_type)
            .u64(self.sample_count)
            .u64(self.byte_count)
            .f32(self.rotational_frequency)
            .f32(self.order_domain_filter_delay_revolutions)
            .i64(self.timestamp_first_sample)
            .bytes(&self.unused)
            .u16(self.checksum_data)
            .u16(self.checksum_header);
        writer.finish()
    }
}

/// Time signals, spectra and order analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignalFormat;

impl ContainerFormat for TimeSignalFormat {
    type Header = TimeSignalHeader;

    const KIND: ContainerKind = ContainerKind::TimeSignal;

    fn resolve_header(bytes: &[u8]) -> Result<TimeSignalHeader> {
        let (version, _) = super::read_preamble(bytes)?;
        match TimeSignalVersion::try_from(version)? {
            TimeSignalVersion::V4 => TimeSignalHeader::read(bytes, TimeSignalVersion::V4),
            TimeSignalVersion::V3 => TimeSignalHeader::migrate_v3(bytes),
        }
    }

    fn decoded_len(header: &TimeSignalHeader) -> Result<u64> {
        let width = SampleType::try_from(header.sample_type)?.width() as u64;
        header.sample_count.checked_mul(width).ok_or_else(|| {
            DecoderError::size_mismatch(SizeContext::Payload, u64::MAX, header.byte_count)
        })
    }

    fn decode_payload(header: &TimeSignalHeader, payload: &[u8]) -> Result<DecodedPayload> {
        samples::decode_time_signal(payload, header.sample_type, header.sample_count)
    }
}
