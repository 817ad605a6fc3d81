//! Typed reinterpretation of validated payload bytes
//!
//! Payloads are little-endian on the wire. Elements are read with explicit
//! byte order into owned vectors; nothing here depends on the host's struct
//! layout or alignment.

use crate::types::{
    ClassificationMatrix, DecodedPayload, DecoderError, Result, SampleArray, SampleType,
    SizeContext, TrendEntry,
};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Width of one classification counter in bytes
pub const CLASSIFICATION_COUNTER_LEN: usize = 8;

/// Byte length of `count` elements of `width` bytes, or `None` on overflow
pub(crate) fn payload_len(count: u64, width: usize) -> Option<usize> {
    usize::try_from(count).ok()?.checked_mul(width)
}

/// Number of counters in a classification matrix with the given class counts
pub(crate) fn matrix_len(num_classes: [u32; 2]) -> Option<u64> {
    let columns = u64::from(num_classes[0]);
    if num_classes[1] > 0 {
        columns.checked_mul(u64::from(num_classes[1]))
    } else {
        Some(columns)
    }
}

fn check_len(bytes: &[u8], count: u64, width: usize) -> Result<usize> {
    let expected = payload_len(count, width).ok_or_else(|| {
        DecoderError::size_mismatch(SizeContext::Payload, u64::MAX, bytes.len() as u64)
    })?;
    if bytes.len() != expected {
        return Err(DecoderError::size_mismatch(
            SizeContext::Payload,
            expected as u64,
            bytes.len() as u64,
        ));
    }
    // count fits in usize because payload_len succeeded
    Ok(count as usize)
}

/// Decode a time-signal payload of `sample_count` elements tagged `sample_type_tag`
pub fn decode_time_signal(
    bytes: &[u8],
    sample_type_tag: u32,
    sample_count: u64,
) -> Result<DecodedPayload> {
    let sample_type = SampleType::try_from(sample_type_tag)?;
    let count = check_len(bytes, sample_count, sample_type.width())?;

    let samples = match sample_type {
        SampleType::Int8 => SampleArray::Int8(bytes.iter().map(|&b| b as i8).collect()),
        SampleType::Uint8 => SampleArray::Uint8(bytes.to_vec()),
        SampleType::Int16 => {
            let mut values = vec![0i16; count];
            LittleEndian::read_i16_into(bytes, &mut values);
            SampleArray::Int16(values)
        }
        SampleType::Uint16 => {
            let mut values = vec![0u16; count];
            LittleEndian::read_u16_into(bytes, &mut values);
            SampleArray::Uint16(values)
        }
        SampleType::Int32 => {
            let mut values = vec![0i32; count];
            LittleEndian::read_i32_into(bytes, &mut values);
            SampleArray::Int32(values)
        }
        SampleType::Uint32 => {
            let mut values = vec![0u32; count];
            LittleEndian::read_u32_into(bytes, &mut values);
            SampleArray::Uint32(values)
        }
        SampleType::Int64 => {
            let mut values = vec![0i64; count];
            LittleEndian::read_i64_into(bytes, &mut values);
            SampleArray::Int64(values)
        }
        SampleType::Uint64 => {
            let mut values = vec![0u64; count];
            LittleEndian::read_u64_into(bytes, &mut values);
            SampleArray::Uint64(values)
        }
        SampleType::Float32 => {
            let mut values = vec![0f32; count];
            LittleEndian::read_f32_into(bytes, &mut values);
            SampleArray::Float32(values)
        }
        SampleType::Float64 => {
            let mut values = vec![0f64; count];
            LittleEndian::read_f64_into(bytes, &mut values);
            SampleArray::Float64(values)
        }
    };

    Ok(DecodedPayload::Samples(samples))
}

/// Decode a classification payload into a 1-D or 2-D counter matrix
///
/// A non-zero `num_classes[1]` makes the matrix two-dimensional with axis 0
/// varying fastest.
pub fn decode_classification(bytes: &[u8], num_classes: [u32; 2]) -> Result<DecodedPayload> {
    let count = matrix_len(num_classes).ok_or_else(|| {
        DecoderError::size_mismatch(SizeContext::Payload, u64::MAX, bytes.len() as u64)
    })?;
    let count = check_len(bytes, count, CLASSIFICATION_COUNTER_LEN)?;

    let mut values = vec![0u64; count];
    LittleEndian::read_u64_into(bytes, &mut values);

    Ok(DecodedPayload::Matrix(ClassificationMatrix::new(
        num_classes,
        values,
    )))
}

/// Decode a trend payload of `entry_count` fixed-size entries
pub fn decode_trend(bytes: &[u8], entry_count: u64) -> Result<DecodedPayload> {
    let count = check_len(bytes, entry_count, TrendEntry::LEN)?;

    let mut entries = Vec::with_capacity(count);
    for chunk in bytes.chunks_exact(TrendEntry::LEN) {
        entries.push(read_trend_entry(chunk)?);
    }

    Ok(DecodedPayload::Trend(entries))
}

fn read_trend_entry(chunk: &[u8]) -> Result<TrendEntry> {
    let truncated =
        |_| DecoderError::size_mismatch(SizeContext::Payload, TrendEntry::LEN as u64, chunk.len() as u64);
    let mut reader = Cursor::new(chunk);

    let timestamp = reader.read_i64::<LittleEndian>().map_err(truncated)?;
    let value = reader.read_f64::<LittleEndian>().map_err(truncated)?;
    let main_alarm_level = reader.read_f32::<LittleEndian>().map_err(truncated)?;
    let pre_alarm_level = reader.read_f32::<LittleEndian>().map_err(truncated)?;
    let alarm_map_index = reader.read_u8().map_err(truncated)?;
    let alarm_status = reader.read_u8().map_err(truncated)?;
    let learning_mode_active = reader.read_u8().map_err(truncated)? != 0;
    let _unused = reader.read_u8().map_err(truncated)?;
    let speed = reader.read_f32::<LittleEndian>().map_err(truncated)?;

    Ok(TrendEntry {
        timestamp,
        value,
        main_alarm_level,
        pre_alarm_level,
        alarm_map_index,
        alarm_status: alarm_status.into(),
        learning_mode_active,
        speed,
    })
}
