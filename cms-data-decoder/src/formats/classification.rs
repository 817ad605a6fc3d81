//! Classification container header
//!
//! Version 2 is current (488 bytes). Version 1 (480 bytes) lacks the close
//! timestamp and is migrated on read.

use super::layout::{FieldReader, FieldWriter};
use super::{ContainerFormat, ContainerHeader};
use crate::checksum::{fold_checksum, verify_header};
use crate::samples::{self, CLASSIFICATION_COUNTER_LEN};
use crate::types::{
    micros_to_timestamp, ClassificationDataType, ClassificationPeriod, Compression, ContainerKind,
    ContentId, DecodedPayload, DecoderError, FixedText, Result, SizeContext, Timestamp,
};
use serde::Serialize;

/// Classification header schema versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationVersion {
    /// Legacy layout without `close_timestamp`
    V1,
    V2,
}

impl ClassificationVersion {
    pub const CURRENT: ClassificationVersion = ClassificationVersion::V2;

    /// Fixed size of this version's header layout
    pub fn layout_len(self) -> usize {
        match self {
            ClassificationVersion::V1 => 480,
            ClassificationVersion::V2 => 488,
        }
    }
}

impl TryFrom<u16> for ClassificationVersion {
    type Error = DecoderError;

    fn try_from(version: u16) -> Result<Self> {
        match version {
            1 => Ok(ClassificationVersion::V1),
            2 => Ok(ClassificationVersion::V2),
            _ => Err(DecoderError::UnsupportedSchemaVersion {
                kind: ContainerKind::Classification,
                version,
            }),
        }
    }
}

/// One axis of a classification matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationDimension {
    pub unit: FixedText<16>,
    pub unit_uuid: ContentId,
    pub num_classes: u32,
    pub lower_border: f32,
    pub upper_border: f32,
    #[serde(skip)]
    pub(crate) unused: [u8; 4],
}

impl ClassificationDimension {
    /// Encoded size of one dimension record
    pub const LEN: usize = 48;

    /// Width of one class, `None` for an unused axis
    pub fn class_width(&self) -> Option<f32> {
        if self.num_classes == 0 {
            return None;
        }
        Some((self.upper_border - self.lower_border) / self.num_classes as f32)
    }

    fn read(reader: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            unit: reader.text()?,
            unit_uuid: reader.content_id()?,
            num_classes: reader.u32()?,
            lower_border: reader.f32()?,
            upper_border: reader.f32()?,
            unused: reader.array()?,
        })
    }

    fn write(&self, writer: &mut FieldWriter) {
        writer
            .bytes(self.unit.as_bytes())
            .bytes(self.unit_uuid.as_bytes())
            .u32(self.num_classes)
            .f32(self.lower_border)
            .f32(self.upper_border)
            .bytes(&self.unused);
    }
}

/// Canonical (version 2) classification header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationHeader {
    pub version: u16,
    pub header_size: u16,
    pub serial_number: FixedText<32>,
    pub comment: FixedText<256>,
    pub compression: Compression,
    pub uuid_cv_config: ContentId,
    pub uuid_classification_data: ContentId,
    pub data_type: ClassificationDataType,
    pub period_type: ClassificationPeriod,
    /// Start of the accumulation period, microseconds since epoch
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub modified_timestamp: i64,
    /// -1 when the matrix has not been closed (always for migrated headers)
    pub close_timestamp: i64,
    pub dimensions: [ClassificationDimension; 2],
    pub sample_rate: u32,
    #[serde(skip)]
    pub(crate) unused: [u8; 4],
    pub sample_count: u64,
    pub byte_count: u32,
    pub checksum_data: u16,
    pub checksum_header: u16,
}

impl ClassificationHeader {
    /// Size of the canonical layout
    pub const LEN: usize = 488;

    /// Class counts of both axes; a zero second entry means one-dimensional
    pub fn num_classes(&self) -> [u32; 2] {
        [
            self.dimensions[0].num_classes,
            self.dimensions[1].num_classes,
        ]
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        micros_to_timestamp(self.start_timestamp)
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        micros_to_timestamp(self.end_timestamp)
    }

    pub fn modified_time(&self) -> Option<Timestamp> {
        micros_to_timestamp(self.modified_timestamp)
    }

    pub fn close_time(&self) -> Option<Timestamp> {
        micros_to_timestamp(self.close_timestamp)
    }

    /// Parse a layout, reading `close_timestamp` only if the layout has it
    fn read(bytes: &[u8], version: ClassificationVersion) -> Result<Self> {
        let layout_len = version.layout_len();
        let mut reader = FieldReader::new(bytes, layout_len)?;

        let version_raw = reader.u16()?;
        let header_size = reader.u16()?;
        let serial_number = reader.text()?;
        let comment = reader.text()?;
        let compression = Compression::from(reader.u32()?);
        let uuid_cv_config = reader.content_id()?;
        let uuid_classification_data = reader.content_id()?;
        let data_type = ClassificationDataType::from(reader.u32()?);
        let period_type = ClassificationPeriod::from(reader.u32()?);
        let start_timestamp = reader.i64()?;
        let end_timestamp = reader.i64()?;
        let modified_timestamp = reader.i64()?;
        let close_timestamp = match version {
            ClassificationVersion::V1 => -1,
            ClassificationVersion::V2 => reader.i64()?,
        };

        let header = Self {
            version: version_raw,
            header_size,
            serial_number,
            comment,
            compression,
            uuid_cv_config,
            uuid_classification_data,
            data_type,
            period_type,
            start_timestamp,
            end_timestamp,
            modified_timestamp,
            close_timestamp,
            dimensions: [
                ClassificationDimension::read(&mut reader)?,
                ClassificationDimension::read(&mut reader)?,
            ],
            sample_rate: reader.u32()?,
            unused: reader.array()?,
            sample_count: reader.u64()?,
            byte_count: reader.u32()?,
            checksum_data: reader.u16()?,
            checksum_header: reader.u16()?,
        };
        debug_assert_eq!(reader.position(), layout_len);
        Ok(header)
    }

    /// Migrate a version 1 header.
    ///
    /// The legacy checksum is verified over the legacy layout first; the
    /// migrated header gets a fresh checksum over its canonical encoding.
    fn migrate_v1(bytes: &[u8]) -> Result<Self> {
        let mut header = Self::read(bytes, ClassificationVersion::V1)?;
        let legacy_len = ClassificationVersion::V1.layout_len();
        verify_header(&bytes[..legacy_len], header.checksum_header)?;

        let image = header.encode();
        header.checksum_header = fold_checksum(&image[..Self::LEN - 2]);
        log::debug!(
            "Migrated classification header v1 -> {:?} (checksum 0x{:04X})",
            ClassificationVersion::CURRENT,
            header.checksum_header
        );
        Ok(header)
    }
}

impl ContainerHeader for ClassificationHeader {
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
        u64::from(self.byte_count)
    }

    fn checksum_data(&self) -> u16 {
        self.checksum_data
    }

    fn checksum_header(&self) -> u16 {
        self.checksum_header
    }

    fn layout_len(&self) -> usize {
        ClassificationVersion::try_from(self.version)
            .map(ClassificationVersion::layout_len)
            .unwrap_or(Self::LEN)
    }

    fn encode(&self) -> Vec<u8> {
        let mut writer = FieldWriter::with_capacity(Self::LEN);
        writer
            .u16(self.version)
            .u16(self.header_size)
            .bytes(self.serial_number.as_bytes())
            .bytes(self.comment.as_bytes())
            .u32(self.compression.tag())
            .bytes(self.uuid_cv_config.as_bytes())
            .bytes(self.uuid_classification_data.as_bytes())
            .u32(self.data_type.into())
            .u32(self.period_type.into())
            .i64(self.start_timestamp)
            .i64(self.end_timestamp)
            .i64(self.modified_timestamp)
            .i64(self.close_timestamp);
        for dimension in &self.dimensions {
            dimension.write(&mut writer);
        }
        writer
            .u32(self.sample_rate)
            .bytes(&self.unused)
            .u64(self.sample_count)
            .u32(self.byte_count)
            .u16(self.checksum_data)
            .u16(self.checksum_header);
        writer.finish()
    }
}

/// Classification matrices of `u64` counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationFormat;

impl ContainerFormat for ClassificationFormat {
    type Header = ClassificationHeader;

    const KIND: ContainerKind = ContainerKind::Classification;

    fn resolve_header(bytes: &[u8]) -> Result<ClassificationHeader> {
        let (version, _) = super::read_preamble(bytes)?;
        match ClassificationVersion::try_from(version)? {
            ClassificationVersion::V2 => ClassificationHeader::read(bytes, ClassificationVersion::V2),
            ClassificationVersion::V1 => ClassificationHeader::migrate_v1(bytes),
        }
    }

    fn decoded_len(header: &ClassificationHeader) -> Result<u64> {
        samples::matrix_len(header.num_classes())
            .and_then(|count| count.checked_mul(CLASSIFICATION_COUNTER_LEN as u64))
            .ok_or_else(|| {
                DecoderError::size_mismatch(SizeContext::Payload, u64::MAX, header.byte_count())
            })
    }

    fn decode_payload(header: &ClassificationHeader, payload: &[u8]) -> Result<DecodedPayload> {
        samples::decode_classification(payload, header.num_classes())
    }
}
