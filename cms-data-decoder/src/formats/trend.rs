//! Trend container header (version 3, 96 bytes, no legacy layouts)

use super::layout::{FieldReader, FieldWriter};
use super::{ContainerFormat, ContainerHeader};
use crate::samples;
use crate::types::{
    micros_to_timestamp, Compression, ContainerKind, ContentId, DecodedPayload, DecoderError,
    Result, SizeContext, Timestamp, TrendEntry,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendVersion {
    V3,
}

impl TrendVersion {
    pub const CURRENT: TrendVersion = TrendVersion::V3;

    pub fn layout_len(self) -> usize {
        match self {
            TrendVersion::V3 => 96,
        }
    }
}

impl TryFrom<u16> for TrendVersion {
    type Error = DecoderError;

    fn try_from(version: u16) -> Result<Self> {
        match version {
            3 => Ok(TrendVersion::V3),
            _ => Err(DecoderError::UnsupportedSchemaVersion {
                kind: ContainerKind::Trend,
                version,
            }),
        }
    }
}

/// Trend container header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendHeader {
    pub version: u16,
    pub header_size: u16,
    pub compression: Compression,
    pub uuid_cv_config: ContentId,
    pub uuid_trend: ContentId,
    pub first_timestamp: i64,
    pub last_timestamp: i64,
    pub unit: ContentId,
    pub lower_pre_alarm_level: f32,
    pub lower_main_alarm_level: f32,
    /// Number of trend entries; signed on the wire
    pub value_count: i32,
    pub byte_count: i32,
    #[serde(skip)]
    pub(crate) unused: [u8; 4],
    pub checksum_data: u16,
    pub checksum_header: u16,
}

impl TrendHeader {
    pub const LEN: usize = 96;

    pub fn first_time(&self) -> Option<Timestamp> {
        micros_to_timestamp(self.first_timestamp)
    }

    pub fn last_time(&self) -> Option<Timestamp> {
        micros_to_timestamp(self.last_timestamp)
    }

    /// Entry count, rejecting negative values
    pub fn entry_count(&self) -> Result<u64> {
        u64::try_from(self.value_count).map_err(|_| {
            DecoderError::size_mismatch(SizeContext::Payload, 0, self.byte_count())
        })
    }

    fn read(bytes: &[u8]) -> Result<Self> {
        let mut reader = FieldReader::new(bytes, Self::LEN)?;
        let header = Self {
            version: reader.u16()?,
            header_size: reader.u16()?,
            compression: Compression::from(reader.u32()?),
            uuid_cv_config: reader.content_id()?,
            uuid_trend: reader.content_id()?,
            first_timestamp: reader.i64()?,
            last_timestamp: reader.i64()?,
            unit: reader.content_id()?,
            lower_pre_alarm_level: reader.f32()?,
            lower_main_alarm_level: reader.f32()?,
            value_count: reader.i32()?,
            byte_count: reader.i32()?,
            unused: reader.array()?,
            checksum_data: reader.u16()?,
            checksum_header: reader.u16()?,
        };
        debug_assert_eq!(reader.position(), Self::LEN);
        Ok(header)
    }
}

impl ContainerHeader for TrendHeader {
    fn version(&self) -> u16 {
        self.version
    }

    fn header_size(&self) -> u16 {
        self.header_size
    }

    fn compression(&self) -> Compression {
        self.compression
    }

    /// Negative byte counts can never match a buffer length
    fn byte_count(&self) -> u64 {
        u64::try_from(self.byte_count).unwrap_or(u64::MAX)
    }

    fn checksum_data(&self) -> u16 {
        self.checksum_data
    }

    fn checksum_header(&self) -> u16 {
        self.checksum_header
    }

    fn layout_len(&self) -> usize {
        Self::LEN
    }

    fn encode(&self) -> Vec<u8> {
        let mut writer = FieldWriter::with_capacity(Self::LEN);
        writer
            .u16(self.version)
            .u16(self.header_size)
            .u32(self.compression.tag())
            .bytes(self.uuid_cv_config.as_bytes())
            .bytes(self.uuid_trend.as_bytes())
            .i64(self.first_timestamp)
            .i64(self.last_timestamp)
            .bytes(self.unit.as_bytes())
            .f32(self.lower_pre_alarm_level)
            .f32(self.lower_main_alarm_level)
            .i32(self.value_count)
            .i32(self.byte_count)
            .bytes(&self.unused)
            .u16(self.checksum_data)
            .u16(self.checksum_header);
        writer.finish()
    }
}

/// Trend logs of a single characteristic value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendFormat;

impl ContainerFormat for TrendFormat {
    type Header = TrendHeader;

    const KIND: ContainerKind = ContainerKind::Trend;

    fn resolve_header(bytes: &[u8]) -> Result<TrendHeader> {
        let (version, _) = super::read_preamble(bytes)?;
        match TrendVersion::try_from(version)? {
            TrendVersion::V3 => TrendHeader::read(bytes),
        }
    }

    fn decoded_len(header: &TrendHeader) -> Result<u64> {
        header
            .entry_count()?
            .checked_mul(TrendEntry::LEN as u64)
            .ok_or_else(|| {
                DecoderError::size_mismatch(SizeContext::Payload, u64::MAX, header.byte_count())
            })
    }

    fn decode_payload(header: &TrendHeader, payload: &[u8]) -> Result<DecodedPayload> {
        samples::decode_trend(payload, header.entry_count()?)
    }
}
