//! Core types for the container decoder library
//!
//! This module defines the error taxonomy, the raw tag enumerations shared by
//! all container headers, and the decoded payload types the decoder hands back
//! to the caller. Everything here is plain owned data: a decoded result has no
//! ties to the input buffer it came from.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Timestamp type used for converted header and trend timestamps
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Convert a microsecond timestamp to `DateTime<Utc>`.
///
/// Values `<= 0` are the devices' "not set" markers and map to `None`.
pub fn micros_to_timestamp(micros: i64) -> Option<Timestamp> {
    if micros <= 0 {
        return None;
    }
    let secs = micros.div_euclid(1_000_000);
    let nsecs = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nsecs)
}

/// The three container kinds understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Load-duration / rainflow / temperature classification matrix
    Classification,
    /// Time signal, spectrum or order analysis sample array
    TimeSignal,
    /// Trend entry log of a characteristic value
    Trend,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Classification => write!(f, "classification"),
            ContainerKind::TimeSignal => write!(f, "time signal"),
            ContainerKind::Trend => write!(f, "trend"),
        }
    }
}

/// Which size relation was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeContext {
    /// Buffer shorter than the header layout being parsed, or a declared
    /// header size smaller than that layout
    Header,
    /// Declared header size + byte count vs. actual buffer length
    Container,
    /// Inflated byte count vs. the size implied by the header
    Decompressed,
    /// Payload bytes vs. declared element count × element width
    Payload,
}

impl fmt::Display for SizeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeContext::Header => write!(f, "header"),
            SizeContext::Container => write!(f, "container"),
            SizeContext::Decompressed => write!(f, "decompressed payload"),
            SizeContext::Payload => write!(f, "payload"),
        }
    }
}

/// Errors that can occur during decoding
///
/// Every variant is fatal for the buffer being decoded. The decoder never
/// attempts recovery or returns partial results.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Header checksum mismatch: stored 0x{stored:04X}, computed 0x{computed:04X}")]
    HeaderChecksumMismatch { stored: u16, computed: u16 },

    #[error("Data checksum mismatch: stored 0x{stored:04X}, computed 0x{computed:04X}")]
    DataChecksumMismatch { stored: u16, computed: u16 },

    #[error("Data size mismatch ({context}): expected {expected} bytes, got {actual}")]
    SizeMismatch {
        context: SizeContext,
        expected: u64,
        actual: u64,
    },

    #[error("Unsupported {kind} header version {version}")]
    UnsupportedSchemaVersion { kind: ContainerKind, version: u16 },

    #[error("Unsupported compression mode: {0}")]
    UnsupportedCompressionMode(Compression),

    #[error("Could not uncompress data: {0}")]
    DecompressionFailure(String),

    #[error("Unsupported sample type tag {0}")]
    UnsupportedSampleType(u32),

    #[error("Cannot determine container kind (version {version}, header size {header_size})")]
    UnknownContainerKind { version: u16, header_size: u16 },

    #[error("Declared payload of {declared} bytes exceeds the configured limit of {limit} bytes")]
    PayloadTooLarge { declared: u64, limit: u64 },
}

impl DecoderError {
    pub(crate) fn size_mismatch(context: SizeContext, expected: u64, actual: u64) -> Self {
        DecoderError::SizeMismatch {
            context,
            expected,
            actual,
        }
    }
}

/// Opaque 16-byte content identifier (uuid) as stored in a header
///
/// The decoder does not interpret or render the bytes; the presentation layer
/// decides how to display them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ContentId(pub [u8; 16]);

impl ContentId {
    /// Raw identifier bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// True if every byte is zero
    pub fn is_nil(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

/// Fixed-size, NUL-terminated text field kept byte-exact
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedText<const N: usize>(pub [u8; N]);

impl<const N: usize> FixedText<N> {
    /// Raw field bytes including padding
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Text up to the first NUL, with invalid UTF-8 replaced
    pub fn to_string_lossy(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl<const N: usize> Default for FixedText<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl<const N: usize> Serialize for FixedText<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

/// Payload compression tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    NotDefined,
    None,
    Zlib,
    /// Reserved by the device firmware, never produced
    Int24,
    Gzip,
    Unknown(u32),
}

impl Compression {
    /// Raw tag as stored in the header
    pub fn tag(self) -> u32 {
        match self {
            Compression::NotDefined => 0,
            Compression::None => 1,
            Compression::Zlib => 2,
            Compression::Int24 => 3,
            Compression::Gzip => 4,
            Compression::Unknown(tag) => tag,
        }
    }
}

impl From<u32> for Compression {
    fn from(tag: u32) -> Self {
        match tag {
            0 => Compression::NotDefined,
            1 => Compression::None,
            2 => Compression::Zlib,
            3 => Compression::Int24,
            4 => Compression::Gzip,
            other => Compression::Unknown(other),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::NotDefined => write!(f, "not defined (0)"),
            Compression::None => write!(f, "no compression (1)"),
            Compression::Zlib => write!(f, "zlib (2)"),
            Compression::Int24 => write!(f, "int24 (3)"),
            Compression::Gzip => write!(f, "gzip (4)"),
            Compression::Unknown(tag) => write!(f, "unknown ({})", tag),
        }
    }
}

/// Element encoding of time-signal samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl SampleType {
    /// Width of one element in bytes
    pub fn width(self) -> usize {
        match self {
            SampleType::Int8 | SampleType::Uint8 => 1,
            SampleType::Int16 | SampleType::Uint16 => 2,
            SampleType::Int32 | SampleType::Uint32 | SampleType::Float32 => 4,
            SampleType::Int64 | SampleType::Uint64 | SampleType::Float64 => 8,
        }
    }

    /// Raw tag as stored in the header
    pub fn tag(self) -> u32 {
        match self {
            SampleType::Int8 => 1,
            SampleType::Int16 => 2,
            SampleType::Int32 => 3,
            SampleType::Int64 => 4,
            SampleType::Float32 => 5,
            SampleType::Float64 => 6,
            SampleType::Uint8 => 7,
            SampleType::Uint16 => 8,
            SampleType::Uint32 => 9,
            SampleType::Uint64 => 10,
        }
    }
}

impl TryFrom<u32> for SampleType {
    type Error = DecoderError;

    fn try_from(tag: u32) -> Result<Self> {
        match tag {
            1 => Ok(SampleType::Int8),
            2 => Ok(SampleType::Int16),
            3 => Ok(SampleType::Int32),
            4 => Ok(SampleType::Int64),
            5 => Ok(SampleType::Float32),
            6 => Ok(SampleType::Float64),
            7 => Ok(SampleType::Uint8),
            8 => Ok(SampleType::Uint16),
            9 => Ok(SampleType::Uint32),
            10 => Ok(SampleType::Uint64),
            other => Err(DecoderError::UnsupportedSampleType(other)),
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleType::Int8 => "signed int 8",
            SampleType::Int16 => "signed int 16",
            SampleType::Int32 => "signed int 32",
            SampleType::Int64 => "signed int 64",
            SampleType::Float32 => "float 32",
            SampleType::Float64 => "float 64",
            SampleType::Uint8 => "unsigned int 8",
            SampleType::Uint16 => "unsigned int 16",
            SampleType::Uint32 => "unsigned int 32",
            SampleType::Uint64 => "unsigned int 64",
        };
        write!(f, "{} ({})", name, self.tag())
    }
}

/// Kind of signal stored in a time-signal container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    NotDefined,
    RawTimeSignal,
    DemodulatedTimeSignal,
    RawSpectrum,
    DemodulatedSpectrum,
    RawOrderAnalysis,
    DemodulatedOrderAnalysis,
    RawTimeSynchronousAverage,
    DemodulatedTimeSynchronousAverage,
    Unknown(u32),
}

impl SignalType {
    /// Order-domain signals carry a meaningful filter delay
    pub fn is_order_domain(self) -> bool {
        matches!(
            self,
            SignalType::RawOrderAnalysis
                | SignalType::DemodulatedOrderAnalysis
                | SignalType::RawTimeSynchronousAverage
                | SignalType::DemodulatedTimeSynchronousAverage
        )
    }
}

impl From<u32> for SignalType {
    fn from(tag: u32) -> Self {
        match tag {
            0 => SignalType::NotDefined,
            1 => SignalType::RawTimeSignal,
            2 => SignalType::DemodulatedTimeSignal,
            3 => SignalType::RawSpectrum,
            4 => SignalType::DemodulatedSpectrum,
            5 => SignalType::RawOrderAnalysis,
            6 => SignalType::DemodulatedOrderAnalysis,
            7 => SignalType::RawTimeSynchronousAverage,
            8 => SignalType::DemodulatedTimeSynchronousAverage,
            other => SignalType::Unknown(other),
        }
    }
}

impl From<SignalType> for u32 {
    fn from(value: SignalType) -> Self {
        match value {
            SignalType::NotDefined => 0,
            SignalType::RawTimeSignal => 1,
            SignalType::DemodulatedTimeSignal => 2,
            SignalType::RawSpectrum => 3,
            SignalType::DemodulatedSpectrum => 4,
            SignalType::RawOrderAnalysis => 5,
            SignalType::DemodulatedOrderAnalysis => 6,
            SignalType::RawTimeSynchronousAverage => 7,
            SignalType::DemodulatedTimeSynchronousAverage => 8,
            SignalType::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalType::NotDefined => "not defined",
            SignalType::RawTimeSignal => "raw time signal",
            SignalType::DemodulatedTimeSignal => "demodulated time signal",
            SignalType::RawSpectrum => "raw spectrum",
            SignalType::DemodulatedSpectrum => "demodulated spectrum",
            SignalType::RawOrderAnalysis => "order analysis",
            SignalType::DemodulatedOrderAnalysis => "demodulated order analysis",
            SignalType::RawTimeSynchronousAverage => "raw time synchronous average",
            SignalType::DemodulatedTimeSynchronousAverage => {
                "demodulated time synchronous average"
            }
            SignalType::Unknown(tag) => return write!(f, "unknown ({})", tag),
        };
        write!(f, "{}", name)
    }
}

/// What a classification matrix counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationDataType {
    Unknown,
    LoadDurationDistribution,
    Rainflow,
    Temperature,
    Other(u32),
}

impl From<u32> for ClassificationDataType {
    fn from(tag: u32) -> Self {
        match tag {
            0 => ClassificationDataType::Unknown,
            1 => ClassificationDataType::LoadDurationDistribution,
            2 => ClassificationDataType::Rainflow,
            3 => ClassificationDataType::Temperature,
            other => ClassificationDataType::Other(other),
        }
    }
}

impl From<ClassificationDataType> for u32 {
    fn from(value: ClassificationDataType) -> Self {
        match value {
            ClassificationDataType::Unknown => 0,
            ClassificationDataType::LoadDurationDistribution => 1,
            ClassificationDataType::Rainflow => 2,
            ClassificationDataType::Temperature => 3,
            ClassificationDataType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ClassificationDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationDataType::Unknown => write!(f, "unknown (0)"),
            ClassificationDataType::LoadDurationDistribution => write!(f, "ldd (1)"),
            ClassificationDataType::Rainflow => write!(f, "rfc (2)"),
            ClassificationDataType::Temperature => write!(f, "temperature (3)"),
            ClassificationDataType::Other(tag) => write!(f, "unknown ({})", tag),
        }
    }
}

/// Accumulation period of a classification matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationPeriod {
    Unknown,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Continuous,
    UserDefined,
    InitialData,
    Other(u32),
}

impl From<u32> for ClassificationPeriod {
    fn from(tag: u32) -> Self {
        match tag {
            0 => ClassificationPeriod::Unknown,
            1 => ClassificationPeriod::Hourly,
            2 => ClassificationPeriod::Daily,
            3 => ClassificationPeriod::Weekly,
            4 => ClassificationPeriod::Monthly,
            5 => ClassificationPeriod::Yearly,
            6 => ClassificationPeriod::Continuous,
            7 => ClassificationPeriod::UserDefined,
            8 => ClassificationPeriod::InitialData,
            other => ClassificationPeriod::Other(other),
        }
    }
}

impl From<ClassificationPeriod> for u32 {
    fn from(value: ClassificationPeriod) -> Self {
        match value {
            ClassificationPeriod::Unknown => 0,
            ClassificationPeriod::Hourly => 1,
            ClassificationPeriod::Daily => 2,
            ClassificationPeriod::Weekly => 3,
            ClassificationPeriod::Monthly => 4,
            ClassificationPeriod::Yearly => 5,
            ClassificationPeriod::Continuous => 6,
            ClassificationPeriod::UserDefined => 7,
            ClassificationPeriod::InitialData => 8,
            ClassificationPeriod::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ClassificationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassificationPeriod::Unknown => "unknown",
            ClassificationPeriod::Hourly => "hourly",
            ClassificationPeriod::Daily => "daily",
            ClassificationPeriod::Weekly => "weekly",
            ClassificationPeriod::Monthly => "monthly",
            ClassificationPeriod::Yearly => "yearly",
            ClassificationPeriod::Continuous => "continuous",
            ClassificationPeriod::UserDefined => "user defined",
            ClassificationPeriod::InitialData => "initial",
            ClassificationPeriod::Other(_) => "unknown",
        };
        write!(f, "{} ({})", name, u32::from(*self))
    }
}

/// Alarm status of a single trend value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmStatus {
    Unknown,
    NoAlarm,
    PreAlarm,
    MainAlarm,
    CharvalError,
    Other(u8),
}

impl From<u8> for AlarmStatus {
    fn from(raw: u8) -> Self {
        match raw {
            0 => AlarmStatus::Unknown,
            1 => AlarmStatus::NoAlarm,
            2 => AlarmStatus::PreAlarm,
            3 => AlarmStatus::MainAlarm,
            4 => AlarmStatus::CharvalError,
            other => AlarmStatus::Other(other),
        }
    }
}

impl From<AlarmStatus> for u8 {
    fn from(value: AlarmStatus) -> Self {
        match value {
            AlarmStatus::Unknown => 0,
            AlarmStatus::NoAlarm => 1,
            AlarmStatus::PreAlarm => 2,
            AlarmStatus::MainAlarm => 3,
            AlarmStatus::CharvalError => 4,
            AlarmStatus::Other(raw) => raw,
        }
    }
}

/// One timestamped trend measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendEntry {
    /// Measurement time in microseconds since epoch
    pub timestamp: i64,
    /// Characteristic value
    pub value: f64,
    /// Main alarm level in effect at `timestamp`
    pub main_alarm_level: f32,
    /// Pre-alarm level in effect at `timestamp`
    pub pre_alarm_level: f32,
    /// Position in the alarm map (0 if none exists)
    pub alarm_map_index: u8,
    pub alarm_status: AlarmStatus,
    /// Value was used for learning new alarm limits
    pub learning_mode_active: bool,
    /// Speed in Hz, NaN when not available
    pub speed: f32,
}

impl TrendEntry {
    /// Size of one encoded entry in bytes
    pub const LEN: usize = 32;

    /// Measurement time, `None` if unset
    pub fn time(&self) -> Option<Timestamp> {
        micros_to_timestamp(self.timestamp)
    }

    /// Speed in Hz, `None` if the device reported NaN
    pub fn speed_hz(&self) -> Option<f32> {
        if self.speed.is_nan() {
            None
        } else {
            Some(self.speed)
        }
    }
}

/// Typed time-signal samples, one variant per element encoding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum SampleArray {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Uint64(Vec<u64>),
}

impl SampleArray {
    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            SampleArray::Int8(v) => v.len(),
            SampleArray::Int16(v) => v.len(),
            SampleArray::Int32(v) => v.len(),
            SampleArray::Int64(v) => v.len(),
            SampleArray::Float32(v) => v.len(),
            SampleArray::Float64(v) => v.len(),
            SampleArray::Uint8(v) => v.len(),
            SampleArray::Uint16(v) => v.len(),
            SampleArray::Uint32(v) => v.len(),
            SampleArray::Uint64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element encoding of this array
    pub fn sample_type(&self) -> SampleType {
        match self {
            SampleArray::Int8(_) => SampleType::Int8,
            SampleArray::Int16(_) => SampleType::Int16,
            SampleArray::Int32(_) => SampleType::Int32,
            SampleArray::Int64(_) => SampleType::Int64,
            SampleArray::Float32(_) => SampleType::Float32,
            SampleArray::Float64(_) => SampleType::Float64,
            SampleArray::Uint8(_) => SampleType::Uint8,
            SampleArray::Uint16(_) => SampleType::Uint16,
            SampleArray::Uint32(_) => SampleType::Uint32,
            SampleArray::Uint64(_) => SampleType::Uint64,
        }
    }

    /// Sample at `index` widened to f64 (64-bit integers may lose precision)
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            SampleArray::Int8(v) => v.get(index).map(|&x| x as f64),
            SampleArray::Int16(v) => v.get(index).map(|&x| x as f64),
            SampleArray::Int32(v) => v.get(index).map(|&x| x as f64),
            SampleArray::Int64(v) => v.get(index).map(|&x| x as f64),
            SampleArray::Float32(v) => v.get(index).map(|&x| x as f64),
            SampleArray::Float64(v) => v.get(index).copied(),
            SampleArray::Uint8(v) => v.get(index).map(|&x| x as f64),
            SampleArray::Uint16(v) => v.get(index).map(|&x| x as f64),
            SampleArray::Uint32(v) => v.get(index).map(|&x| x as f64),
            SampleArray::Uint64(v) => v.get(index).map(|&x| x as f64),
        }
    }

    /// Iterate over all samples widened to f64
    pub fn iter_f64(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).filter_map(move |i| self.get_f64(i))
    }
}

/// Classification counters laid out row-major with axis 0 varying fastest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationMatrix {
    num_classes: [u32; 2],
    values: Vec<u64>,
}

impl ClassificationMatrix {
    /// Build a matrix from its dimensions and flat counters.
    ///
    /// Callers must ensure `values.len()` equals the product of the non-zero
    /// class counts; the sample decoder checks this before construction.
    pub(crate) fn new(num_classes: [u32; 2], values: Vec<u64>) -> Self {
        Self {
            num_classes,
            values,
        }
    }

    /// Class counts per axis; `[n0, 0]` for a one-dimensional matrix
    pub fn num_classes(&self) -> [u32; 2] {
        self.num_classes
    }

    pub fn is_two_dimensional(&self) -> bool {
        self.num_classes[1] > 0
    }

    /// `(columns, rows)`: axis-0 classes and axis-1 classes (1 for 1-D)
    pub fn shape(&self) -> (usize, usize) {
        let rows = if self.is_two_dimensional() {
            self.num_classes[1] as usize
        } else {
            1
        };
        (self.num_classes[0] as usize, rows)
    }

    /// Counter at axis-0 class `i` and axis-1 class `j`
    pub fn get(&self, i: usize, j: usize) -> Option<u64> {
        let (columns, rows) = self.shape();
        if i >= columns || j >= rows {
            return None;
        }
        self.values.get(i + columns * j).copied()
    }

    /// Flat counters in storage order
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Iterate over rows (one per axis-1 class)
    pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
        let (columns, _) = self.shape();
        self.values.chunks(columns.max(1))
    }

    /// Sum of all counters
    pub fn total(&self) -> u128 {
        self.values.iter().map(|&v| v as u128).sum()
    }
}

/// Decoded container payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodedPayload {
    /// Time-signal samples
    Samples(SampleArray),
    /// Classification counters
    Matrix(ClassificationMatrix),
    /// Trend entries
    Trend(Vec<TrendEntry>),
}

impl DecodedPayload {
    pub fn as_samples(&self) -> Option<&SampleArray> {
        match self {
            DecodedPayload::Samples(samples) => Some(samples),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&ClassificationMatrix> {
        match self {
            DecodedPayload::Matrix(matrix) => Some(matrix),
            _ => None,
        }
    }

    pub fn as_trend(&self) -> Option<&[TrendEntry]> {
        match self {
            DecodedPayload::Trend(entries) => Some(entries),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_tags() {
        assert_eq!(Compression::from(1), Compression::None);
        assert_eq!(Compression::from(4), Compression::Gzip);
        assert_eq!(Compression::from(9), Compression::Unknown(9));
        assert_eq!(Compression::from(9).tag(), 9);
        assert_eq!(format!("{}", Compression::Zlib), "zlib (2)");
    }

    #[test]
    fn test_sample_type_tags() {
        for tag in 1..=10 {
            let sample_type = SampleType::try_from(tag).unwrap();
            assert_eq!(sample_type.tag(), tag);
        }
        assert!(matches!(
            SampleType::try_from(0),
            Err(DecoderError::UnsupportedSampleType(0))
        ));
        assert!(matches!(
            SampleType::try_from(11),
            Err(DecoderError::UnsupportedSampleType(11))
        ));
        assert_eq!(SampleType::Uint16.width(), 2);
        assert_eq!(SampleType::Float64.width(), 8);
    }

    #[test]
    fn test_matrix_indexing() {
        let matrix = ClassificationMatrix::new([3, 2], vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(matrix.shape(), (3, 2));
        assert_eq!(matrix.get(2, 1), Some(5));
        assert_eq!(matrix.get(0, 1), Some(3));
        assert_eq!(matrix.get(3, 0), None);
        assert_eq!(matrix.get(0, 2), None);
        assert_eq!(matrix.rows().count(), 2);
        assert_eq!(matrix.total(), 15);
    }

    #[test]
    fn test_one_dimensional_matrix() {
        let matrix = ClassificationMatrix::new([4, 0], vec![7, 8, 9, 10]);
        assert!(!matrix.is_two_dimensional());
        assert_eq!(matrix.shape(), (4, 1));
        assert_eq!(matrix.get(3, 0), Some(10));
        assert_eq!(matrix.rows().next(), Some(&[7u64, 8, 9, 10][..]));
    }

    #[test]
    fn test_fixed_text() {
        let mut raw = [0u8; 8];
        raw[..3].copy_from_slice(b"abc");
        raw[5] = b'x';
        assert_eq!(FixedText(raw).to_string_lossy(), "abc");
        assert_eq!(FixedText(*b"12345678").to_string_lossy(), "12345678");
    }

    #[test]
    fn test_timestamp_conversion() {
        assert!(micros_to_timestamp(0).is_none());
        assert!(micros_to_timestamp(-1).is_none());
        let ts = micros_to_timestamp(1_700_000_000_123_456).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_sample_array_widening() {
        let samples = SampleArray::Int16(vec![-2, 0, 7]);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples.sample_type(), SampleType::Int16);
        assert_eq!(samples.get_f64(0), Some(-2.0));
        assert_eq!(samples.get_f64(3), None);
        assert_eq!(samples.iter_f64().collect::<Vec<_>>(), vec![-2.0, 0.0, 7.0]);
    }
}
