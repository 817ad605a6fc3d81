//! Report generation
//!
//! Renders decoded containers as aligned text (header block followed by a
//! payload table) or as JSON.

use crate::config::{OutputConfig, OutputFormat};
use anyhow::Result;
use cms_data_decoder::formats::TimeSignalVersion;
use cms_data_decoder::types::{micros_to_timestamp, SampleArray};
use cms_data_decoder::{
    ClassificationHeader, ClassificationMatrix, ContentId, Decoded, DecodedContainer,
    TimeSignalHeader, TrendEntry, TrendHeader,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// JSON document written per input file
#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a Path,
    container: &'a DecodedContainer,
}

/// Write one decoded container in the configured format
pub fn write_report<W: Write>(
    out: &mut W,
    path: &Path,
    decoded: &DecodedContainer,
    options: &OutputConfig,
) -> Result<()> {
    match options.format {
        OutputFormat::Json => {
            let report = FileReport {
                file: path,
                container: decoded,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "File: {}", path.display())?;
            match decoded {
                DecodedContainer::Classification(c) => write_classification(out, c)?,
                DecodedContainer::TimeSignal(s) => write_time_signal(out, s, options)?,
                DecodedContainer::Trend(t) => write_trend(out, t)?,
            }
        }
    }
    Ok(())
}

/// `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`, uppercase hex
pub fn format_uuid(id: &ContentId) -> String {
    let hex = hex::encode_upper(id.as_bytes());
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// `YYYY-MM-DD HH:MM:SS.mmm (UTC)`, or `-` when the timestamp is unset
pub fn format_timestamp(micros: i64) -> String {
    match micros_to_timestamp(micros) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S%.3f (UTC)").to_string(),
        None => "-".to_string(),
    }
}

/// Float as `%f`, or `placeholder` for NaN
fn format_float(value: f32, placeholder: &str) -> String {
    if value.is_nan() {
        placeholder.to_string()
    } else {
        format!("{:.6}", value)
    }
}

fn field<W: Write>(out: &mut W, label: &str, value: impl std::fmt::Display) -> Result<()> {
    writeln!(out, "{:<29}\t{}", format!("{}:", label), value)?;
    Ok(())
}

fn write_classification<W: Write>(out: &mut W, c: &Decoded<ClassificationHeader>) -> Result<()> {
    let h = &c.header;
    writeln!(out)?;
    field(out, "Header version", h.version)?;
    field(out, "Header size", h.header_size)?;
    field(out, "Serial number", h.serial_number.to_string_lossy())?;
    field(out, "Comment", h.comment.to_string_lossy())?;
    field(out, "Compression", h.compression)?;
    field(out, "Config-uuid", format_uuid(&h.uuid_cv_config))?;
    field(out, "Data-uuid", format_uuid(&h.uuid_classification_data))?;
    field(out, "Data type", h.data_type)?;
    field(out, "Period type", h.period_type)?;
    field(
        out,
        "Start",
        format!("{} ({})", format_timestamp(h.start_timestamp), h.start_timestamp),
    )?;
    field(
        out,
        "End",
        format!("{} ({})", format_timestamp(h.end_timestamp), h.end_timestamp),
    )?;
    field(
        out,
        "Last time written",
        format!(
            "{} ({})",
            format_timestamp(h.modified_timestamp),
            h.modified_timestamp
        ),
    )?;
    field(
        out,
        "Closed on",
        format!("{} ({})", format_timestamp(h.close_timestamp), h.close_timestamp),
    )?;
    for (axis, dimension) in h.dimensions.iter().enumerate() {
        writeln!(out, "Dimension {}:", axis + 1)?;
        field(out, "  Unit string", dimension.unit.to_string_lossy())?;
        field(out, "  Unit uuid", format_uuid(&dimension.unit_uuid))?;
        field(out, "  Number of classes", dimension.num_classes)?;
        field(out, "  Lower border", dimension.lower_border)?;
        field(out, "  Upper border", dimension.upper_border)?;
    }
    field(out, "Sample rate", h.sample_rate)?;
    field(out, "Sample count", h.sample_count)?;
    field(out, "Byte count", h.byte_count)?;
    field(out, "Data checksum", format!("{:04X}", h.checksum_data))?;
    field(out, "Header checksum", format!("{:04X}", h.checksum_header))?;
    writeln!(out)?;

    if let Some(matrix) = c.payload.as_matrix() {
        write_matrix(out, matrix)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_matrix<W: Write>(out: &mut W, matrix: &ClassificationMatrix) -> Result<()> {
    let (columns, _) = matrix.shape();
    if matrix.is_two_dimensional() {
        write!(out, "v D2 / D1 >")?;
    } else {
        write!(out, "       D1 >")?;
    }
    for i in 0..columns {
        write!(out, "\t{:8}", i)?;
    }
    writeln!(out)?;

    for (j, row) in matrix.rows().enumerate() {
        write!(out, "{:8}   ", j)?;
        for value in row {
            write!(out, "\t{:8}", value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_time_signal<W: Write>(
    out: &mut W,
    s: &Decoded<TimeSignalHeader>,
    options: &OutputConfig,
) -> Result<()> {
    let h = &s.header;
    writeln!(out)?;
    field(out, "Header version", h.version)?;
    field(out, "Header size", h.header_size)?;
    field(out, "Signal type", h.signal_type)?;
    field(out, "Config-uuid", format_uuid(&h.uuid_config))?;
    field(out, "Measurement-uuid", format_uuid(&h.uuid_measurement))?;
    let rate = if h.delta_x != 0.0 {
        (1.0 / h.delta_x).round() as u32
    } else {
        0
    };
    field(out, "Distance between samples", format!("{} ({}Hz)", h.delta_x, rate))?;
    field(out, "Scaling factor", format!("{:.6}", h.scaling_factor))?;
    field(out, "Offset", format!("{:.6}", h.offset))?;
    field(out, "Measurement timestamp", format_timestamp(h.timestamp))?;
    if TimeSignalVersion::try_from(h.version).ok() == Some(TimeSignalVersion::V4) {
        field(
            out,
            "First sample timestamp",
            format_timestamp(h.timestamp_first_sample),
        )?;
        if h.signal_type.is_order_domain() {
            let revolutions = h.order_domain_filter_delay_revolutions;
            field(
                out,
                "Order domain filter delay",
                format!(
                    "{:.6} revolutions ({:.2}°)",
                    revolutions,
                    f64::from(revolutions) * 360.0
                ),
            )?;
        }
    }
    field(out, "Unit-uuid", format_uuid(&h.unit))?;
    field(out, "Compression", h.compression)?;
    if let Some(samples) = s.payload.as_samples() {
        field(
            out,
            "Data type",
            format!("{} ({})", samples.sample_type(), h.sample_type),
        )?;
    }
    field(out, "Number of samples", h.sample_count)?;
    field(out, "Byte count samples", h.byte_count)?;
    field(out, "Rotational frequency", format!("{:.3}", h.rotational_frequency))?;
    field(out, "Data checksum", h.checksum_data)?;
    field(out, "Header checksum", h.checksum_header)?;

    if let Some(samples) = s.payload.as_samples() {
        write_samples(out, h, samples, options)?;
    }
    writeln!(out)?;
    Ok(())
}

fn raw_sample(samples: &SampleArray, i: usize) -> String {
    match samples {
        SampleArray::Int8(v) => v[i].to_string(),
        SampleArray::Int16(v) => v[i].to_string(),
        SampleArray::Int32(v) => v[i].to_string(),
        SampleArray::Int64(v) => v[i].to_string(),
        SampleArray::Uint8(v) => v[i].to_string(),
        SampleArray::Uint16(v) => v[i].to_string(),
        SampleArray::Uint32(v) => v[i].to_string(),
        SampleArray::Uint64(v) => v[i].to_string(),
        SampleArray::Float32(v) => format!("{:.6}", v[i]),
        SampleArray::Float64(v) => format!("{:.6}", v[i]),
    }
}

fn write_samples<W: Write>(
    out: &mut W,
    header: &TimeSignalHeader,
    samples: &SampleArray,
    options: &OutputConfig,
) -> Result<()> {
    let separator = if options.separator { '\t' } else { ' ' };
    let per_row = options.values_per_row.max(1);

    writeln!(out)?;
    if options.show_index {
        write!(out, " \tindex   \traw value")?;
        if options.show_scaled {
            write!(out, " \tscaled value")?;
        }
        writeln!(out)?;
        writeln!(out)?;
    }

    for start in (0..samples.len()).step_by(per_row) {
        if options.show_index {
            write!(out, "   \t{:4} ", start)?;
        }
        let end = (start + per_row).min(samples.len());
        for i in start..end {
            write!(out, " \t{:>11}", raw_sample(samples, i))?;
            if options.show_scaled {
                if let Some(raw) = samples.get_f64(i) {
                    write!(out, "{}  {:.6}", separator, header.scale(raw))?;
                }
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_trend<W: Write>(out: &mut W, t: &Decoded<TrendHeader>) -> Result<()> {
    let h = &t.header;
    writeln!(out)?;
    field(out, "Header version", h.version)?;
    field(out, "Header size", h.header_size)?;
    field(out, "Compression", h.compression)?;
    field(out, "Config-uuid", format_uuid(&h.uuid_cv_config))?;
    field(out, "Trend-uuid", format_uuid(&h.uuid_trend))?;
    field(out, "First timestamp", format_timestamp(h.first_timestamp))?;
    field(out, "Last timestamp", format_timestamp(h.last_timestamp))?;
    field(out, "Unit-uuid", format_uuid(&h.unit))?;
    field(out, "Lower pre alarm level", format_float(h.lower_pre_alarm_level, "-"))?;
    field(out, "Lower main alarm level", format_float(h.lower_main_alarm_level, "-"))?;
    field(out, "Number of trend entries", h.value_count)?;
    field(out, "Byte count samples", h.byte_count)?;
    field(out, "Data checksum", h.checksum_data)?;
    field(out, "Header checksum", h.checksum_header)?;

    if let Some(entries) = t.payload.as_trend() {
        writeln!(
            out,
            "\n \t entry\ttimestamp                    \t value       \tmain_alarm_level\tpre_alarm_level\talarm_map_index\talarm_status\tlearning_mode\tspeed"
        )?;
        for (i, entry) in entries.iter().enumerate() {
            write_trend_entry(out, i, entry)?;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn write_trend_entry<W: Write>(out: &mut W, index: usize, entry: &TrendEntry) -> Result<()> {
    writeln!(
        out,
        "  \t{:4}\t{}\t{:12.6}\t{:12.6}\t{:12.6}\t{:>15}\t{:>12}\t{:>13}\t{}",
        index,
        format_timestamp(entry.timestamp),
        entry.value,
        entry.main_alarm_level,
        entry.pre_alarm_level,
        entry.alarm_map_index,
        u8::from(entry.alarm_status),
        if entry.learning_mode_active { 1 } else { 0 },
        format_float(entry.speed, " "),
    )?;
    Ok(())
}
