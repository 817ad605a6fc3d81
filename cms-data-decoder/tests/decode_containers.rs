//! End-to-end decoding of hand-assembled containers
//!
//! Headers are laid out byte by byte here, independent of the library's own
//! encoder, so these tests pin the wire offsets.

use cms_data_decoder::checksum::fold_checksum;
use cms_data_decoder::types::{ClassificationDataType, SizeContext};
use cms_data_decoder::{
    ClassificationFormat, Compression, ContainerDecoder, ContainerHeader, ContainerKind,
    DecodedContainer, DecodedPayload, DecoderError, SampleArray, SignalType, TimeSignalFormat,
    TrendFormat,
};
use flate2::write::{GzEncoder, ZlibEncoder};
use std::io::Write;

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Fill in both checksums and append the stored payload
fn seal(mut header: Vec<u8>, stored: &[u8]) -> Vec<u8> {
    let len = header.len();
    put(&mut header, len - 4, &fold_checksum(stored).to_le_bytes());
    let checksum = fold_checksum(&header[..len - 2]);
    put(&mut header, len - 2, &checksum.to_le_bytes());
    header.extend_from_slice(stored);
    header
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Time signal header, version 4 (200 bytes) or version 3 (120 bytes)
fn time_signal_header(
    version: u16,
    compression: u32,
    sample_type: u32,
    sample_count: u64,
    byte_count: u64,
) -> Vec<u8> {
    let len = if version == 3 { 120 } else { 200 };
    let mut h = vec![0u8; len];
    put(&mut h, 0, &version.to_le_bytes());
    put(&mut h, 2, &(len as u16).to_le_bytes());
    put(&mut h, 4, &1u32.to_le_bytes());
    put(&mut h, 8, &[0x10; 16]);
    put(&mut h, 24, &[0x20; 16]);
    put(&mut h, 40, &0.0005f64.to_le_bytes());
    put(&mut h, 48, &2.0f64.to_le_bytes());
    put(&mut h, 56, &1.0f64.to_le_bytes());
    put(&mut h, 64, &1_650_000_000_000_000i64.to_le_bytes());
    put(&mut h, 72, &[0x30; 16]);
    put(&mut h, 88, &compression.to_le_bytes());
    put(&mut h, 92, &sample_type.to_le_bytes());
    put(&mut h, 96, &sample_count.to_le_bytes());
    put(&mut h, 104, &byte_count.to_le_bytes());
    put(&mut h, 112, &25.0f32.to_le_bytes());
    if version == 4 {
        put(&mut h, 116, &0.75f32.to_le_bytes());
        put(&mut h, 120, &1_650_000_000_000_100i64.to_le_bytes());
    }
    h
}

/// Classification header, version 2 (488 bytes) or version 1 (480 bytes)
fn classification_header(
    version: u16,
    compression: u32,
    num_classes: [u32; 2],
    byte_count: u32,
) -> Vec<u8> {
    let len = if version == 1 { 480 } else { 488 };
    let mut h = vec![0u8; len];
    put(&mut h, 0, &version.to_le_bytes());
    put(&mut h, 2, &(len as u16).to_le_bytes());
    put(&mut h, 4, b"CMS-7781");
    put(&mut h, 36, b"bearing temperature");
    put(&mut h, 292, &compression.to_le_bytes());
    put(&mut h, 328, &3u32.to_le_bytes());
    put(&mut h, 332, &2u32.to_le_bytes());
    put(&mut h, 336, &1_650_000_000_000_000i64.to_le_bytes());

    let mut offset = 360;
    if version == 2 {
        put(&mut h, offset, &1_650_100_000_000_000i64.to_le_bytes());
        offset += 8;
    }
    for (axis, classes) in num_classes.iter().enumerate() {
        let dim = offset + axis * 48;
        put(&mut h, dim, b"degC");
        put(&mut h, dim + 32, &classes.to_le_bytes());
        put(&mut h, dim + 36, &(-40.0f32).to_le_bytes());
        put(&mut h, dim + 40, &120.0f32.to_le_bytes());
    }
    offset += 96;
    put(&mut h, offset, &1u32.to_le_bytes());
    let counters = u64::from(num_classes[0]) * u64::from(num_classes[1].max(1));
    put(&mut h, offset + 8, &counters.to_le_bytes());
    put(&mut h, offset + 16, &byte_count.to_le_bytes());
    h
}

fn trend_header(compression: u32, value_count: i32, byte_count: i32) -> Vec<u8> {
    let mut h = vec![0u8; 96];
    put(&mut h, 0, &3u16.to_le_bytes());
    put(&mut h, 2, &96u16.to_le_bytes());
    put(&mut h, 4, &compression.to_le_bytes());
    put(&mut h, 40, &1_650_000_000_000_000i64.to_le_bytes());
    put(&mut h, 48, &1_650_000_600_000_000i64.to_le_bytes());
    put(&mut h, 72, &3.5f32.to_le_bytes());
    put(&mut h, 76, &7.0f32.to_le_bytes());
    put(&mut h, 80, &value_count.to_le_bytes());
    put(&mut h, 84, &byte_count.to_le_bytes());
    h
}

fn trend_entries(count: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    for i in 0..count {
        bytes.extend_from_slice(&(1_650_000_000_000_000i64 + i as i64 * 60_000_000).to_le_bytes());
        bytes.extend_from_slice(&(i as f64 * 0.5).to_le_bytes());
        bytes.extend_from_slice(&7.0f32.to_le_bytes());
        bytes.extend_from_slice(&3.5f32.to_le_bytes());
        bytes.extend_from_slice(&[i as u8, 2, 0, 0]);
        bytes.extend_from_slice(&f32::NAN.to_le_bytes());
    }
    bytes
}

fn float32_payload(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[test]
fn uncompressed_time_signal_round_trip() {
    let values = [0.5f32, -1.25, 3.0, 1e-3, 42.0];
    let payload = float32_payload(&values);
    let bytes = seal(
        time_signal_header(4, 1, 5, values.len() as u64, payload.len() as u64),
        &payload,
    );

    let decoded = ContainerDecoder::new()
        .decode::<TimeSignalFormat>(&bytes)
        .unwrap();
    assert_eq!(decoded.header.signal_type, SignalType::RawTimeSignal);
    assert_eq!(decoded.header.sample_count, 5);
    assert_eq!(decoded.header.rotational_frequency, 25.0);
    assert_eq!(decoded.header.order_domain_filter_delay_revolutions, 0.75);
    assert_eq!(decoded.header.scale(3.0), 4.0);
    assert_eq!(
        decoded.payload,
        DecodedPayload::Samples(SampleArray::Float32(values.to_vec()))
    );
}

#[test]
fn one_byte_size_mismatch_rejected() {
    let payload = float32_payload(&[1.0, 2.0]);
    let bytes = seal(time_signal_header(4, 1, 5, 2, 8), &payload);
    let decoder = ContainerDecoder::new();

    let mut long = bytes.clone();
    long.push(0);
    assert!(matches!(
        decoder.decode_auto(&long),
        Err(DecoderError::SizeMismatch {
            context: SizeContext::Container,
            ..
        })
    ));

    let short = &bytes[..bytes.len() - 1];
    assert!(matches!(
        decoder.decode_auto(short),
        Err(DecoderError::SizeMismatch {
            context: SizeContext::Container,
            ..
        })
    ));
}

#[test]
fn negative_trend_byte_count_rejected() {
    let bytes = seal(trend_header(1, 0, -1), &[]);
    assert_eq!(bytes.len(), 96);
    assert!(matches!(
        ContainerDecoder::new().decode_auto(&bytes),
        Err(DecoderError::SizeMismatch {
            context: SizeContext::Container,
            expected: u64::MAX,
            actual: 96,
        })
    ));
}

#[test]
fn truncated_container_with_huge_byte_count_rejected() {
    let declared = 300 * 1024 * 1024;
    let payload = float32_payload(&[1.0, 2.0]);
    let bytes = seal(time_signal_header(4, 1, 5, 2, declared), &payload);
    assert!(matches!(
        ContainerDecoder::new().decode_auto(&bytes),
        Err(DecoderError::SizeMismatch {
            context: SizeContext::Container,
            expected,
            actual: 208,
        }) if expected == 200 + declared
    ));
}

#[test]
fn zlib_time_signal() {
    let samples: Vec<i32> = (0..2000).map(|i| (i % 97) - 48).collect();
    let raw: Vec<u8> = samples.iter().flat_map(|v| v.to_le_bytes()).collect();
    let stored = zlib(&raw);
    let bytes = seal(
        time_signal_header(4, 2, 3, samples.len() as u64, stored.len() as u64),
        &stored,
    );

    let decoded = ContainerDecoder::new().decode_auto(&bytes).unwrap();
    assert_eq!(decoded.kind(), ContainerKind::TimeSignal);
    assert_eq!(
        decoded.payload().as_samples(),
        Some(&SampleArray::Int32(samples))
    );
}

#[test]
fn gzip_trend() {
    let raw = trend_entries(3);
    let stored = gzip(&raw);
    let bytes = seal(trend_header(4, 3, stored.len() as i32), &stored);

    let decoded = ContainerDecoder::new()
        .decode::<TrendFormat>(&bytes)
        .unwrap();
    assert_eq!(decoded.header.value_count, 3);
    assert_eq!(decoded.header.lower_main_alarm_level, 7.0);
    let entries = decoded.payload.as_trend().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].value, 1.0);
    assert_eq!(entries[2].alarm_map_index, 2);
    assert!(entries[2].speed_hz().is_none());
    assert!(entries[2].time() > entries[0].time());
}

#[test]
fn compressed_payload_with_wrong_inflated_size() {
    let samples = [1i16, 2, 3, 4];
    let raw: Vec<u8> = samples.iter().flat_map(|v| v.to_le_bytes()).collect();
    let stored = zlib(&raw);
    // Header claims five samples, stream holds four
    let bytes = seal(time_signal_header(4, 2, 2, 5, stored.len() as u64), &stored);

    assert!(matches!(
        ContainerDecoder::new().decode_auto(&bytes),
        Err(DecoderError::SizeMismatch {
            context: SizeContext::Decompressed,
            expected: 10,
            actual: 8
        })
    ));
}

#[test]
fn legacy_time_signal_migration() {
    let payload = float32_payload(&[9.0, 8.0]);
    let bytes = seal(time_signal_header(3, 1, 5, 2, 8), &payload);

    let decoded = match ContainerDecoder::new().decode_auto(&bytes).unwrap() {
        DecodedContainer::TimeSignal(decoded) => decoded,
        other => panic!("Expected time signal, got {:?}", other.kind()),
    };
    let header = &decoded.header;
    assert_eq!(header.version, 3);
    assert_eq!(header.header_size, 120);
    assert_eq!(header.order_domain_filter_delay_revolutions, 0.0);
    assert_eq!(header.timestamp_first_sample, 0);
    assert_eq!(header.rotational_frequency, 25.0);
    assert_eq!(header.layout_len(), 120);

    let canonical = header.encode();
    assert_eq!(canonical.len(), 200);
    assert!(canonical[128..196].iter().all(|&b| b == 0));
    assert_eq!(fold_checksum(&canonical[..198]), header.checksum_header);
    assert_eq!(
        decoded.payload.as_samples(),
        Some(&SampleArray::Float32(vec![9.0, 8.0]))
    );
}

#[test]
fn legacy_classification_migration() {
    let counters: Vec<u8> = (0u64..4).flat_map(|v| v.to_le_bytes()).collect();
    let bytes = seal(classification_header(1, 1, [4, 0], 32), &counters);

    let decoded = ContainerDecoder::new()
        .decode::<ClassificationFormat>(&bytes)
        .unwrap();
    assert_eq!(decoded.header.close_timestamp, -1);
    assert_eq!(decoded.header.data_type, ClassificationDataType::Temperature);
    assert_eq!(decoded.header.serial_number.to_string_lossy(), "CMS-7781");
    assert_eq!(decoded.header.dimensions[0].unit.to_string_lossy(), "degC");
    let matrix = decoded.payload.as_matrix().unwrap();
    assert!(!matrix.is_two_dimensional());
    assert_eq!(matrix.values(), &[0, 1, 2, 3]);
}

#[test]
fn classification_index_layout() {
    let counters: Vec<u8> = (0u64..6).flat_map(|v| (100 + v).to_le_bytes()).collect();
    let stored = gzip(&counters);
    let bytes = seal(
        classification_header(2, 4, [3, 2], stored.len() as u32),
        &stored,
    );

    let decoded = ContainerDecoder::new().decode_auto(&bytes).unwrap();
    let matrix = decoded.payload().as_matrix().unwrap();
    assert_eq!(matrix.shape(), (3, 2));
    // (i=2, j=1) is flat index 5
    assert_eq!(matrix.get(2, 1), Some(105));
    assert_eq!(matrix.get(3, 0), None);
    assert_eq!(matrix.rows().count(), 2);
}

#[test]
fn every_header_bit_flip_rejected() {
    let payload = float32_payload(&[1.0, 2.0, 3.0]);
    let bytes = seal(time_signal_header(4, 1, 5, 3, 12), &payload);
    let decoder = ContainerDecoder::new();
    assert!(decoder.decode_auto(&bytes).is_ok());

    for index in 0..200 {
        for bit in 0..8 {
            let mut flipped = bytes.clone();
            flipped[index] ^= 1 << bit;
            let result = decoder.decode::<TimeSignalFormat>(&flipped);
            assert!(result.is_err(), "bit {} of byte {} accepted", bit, index);
            if index >= 2 {
                assert!(
                    matches!(result, Err(DecoderError::HeaderChecksumMismatch { .. })),
                    "bit {} of byte {}: {:?}",
                    bit,
                    index,
                    result
                );
            }
        }
    }
}

#[test]
fn every_payload_byte_mutation_rejected() {
    let raw = trend_entries(2);
    let bytes = seal(trend_header(1, 2, raw.len() as i32), &raw);
    let decoder = ContainerDecoder::new();

    for index in 96..bytes.len() {
        let mut mutated = bytes.clone();
        mutated[index] = mutated[index].wrapping_add(1);
        assert!(matches!(
            decoder.decode_auto(&mutated),
            Err(DecoderError::DataChecksumMismatch { .. })
        ));
    }
}

#[test]
fn unsupported_inputs() {
    let decoder = ContainerDecoder::new();

    let payload = float32_payload(&[1.0]);
    let bytes = seal(time_signal_header(4, 1, 11, 1, 4), &payload);
    assert!(matches!(
        decoder.decode_auto(&bytes),
        Err(DecoderError::UnsupportedSampleType(11))
    ));

    let bytes = seal(time_signal_header(4, 3, 5, 1, 4), &payload);
    assert!(matches!(
        decoder.decode_auto(&bytes),
        Err(DecoderError::UnsupportedCompressionMode(Compression::Int24))
    ));

    let bytes = seal(time_signal_header(4, 0, 5, 1, 4), &payload);
    assert!(matches!(
        decoder.decode_auto(&bytes),
        Err(DecoderError::UnsupportedCompressionMode(Compression::NotDefined))
    ));

    let mut bytes = seal(time_signal_header(4, 1, 5, 1, 4), &payload);
    put(&mut bytes, 0, &7u16.to_le_bytes());
    assert!(matches!(
        decoder.decode_auto(&bytes),
        Err(DecoderError::UnknownContainerKind {
            version: 7,
            header_size: 200
        })
    ));
    assert!(matches!(
        decoder.decode::<TimeSignalFormat>(&bytes),
        Err(DecoderError::UnsupportedSchemaVersion {
            kind: ContainerKind::TimeSignal,
            version: 7
        })
    ));
}

#[test]
fn negative_trend_count_rejected() {
    let bytes = seal(trend_header(1, -1, 0), &[]);
    assert!(matches!(
        ContainerDecoder::new().decode_auto(&bytes),
        Err(DecoderError::SizeMismatch {
            context: SizeContext::Payload,
            ..
        })
    ));
}
