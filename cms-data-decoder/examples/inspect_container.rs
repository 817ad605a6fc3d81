//! Standalone container inspector
//!
//! Decodes one binary container file, detecting its kind from the header,
//! and prints a short summary of the header and payload.
//!
//! Usage:
//!   inspect_container <container.bin> [--limit <count>]
//!
//! Example:
//!   RUST_LOG=trace inspect_container spectrum.bin --limit 20

use anyhow::{bail, Context};
use cms_data_decoder::{ContainerDecoder, DecodedContainer, DecodedPayload};
use std::env;
use std::path::PathBuf;

fn print_payload(payload: &DecodedPayload, limit: usize) {
    match payload {
        DecodedPayload::Samples(samples) => {
            println!("{} samples ({})", samples.len(), samples.sample_type());
            for (i, value) in samples.iter_f64().take(limit).enumerate() {
                println!("  [{:>6}] {}", i, value);
            }
        }
        DecodedPayload::Matrix(matrix) => {
            let (columns, rows) = matrix.shape();
            println!(
                "{} x {} matrix, {} counts in total",
                columns,
                rows,
                matrix.total()
            );
            for row in matrix.rows().take(limit) {
                println!("  {:?}", row);
            }
        }
        DecodedPayload::Trend(entries) => {
            println!("{} trend entries", entries.len());
            for entry in entries.iter().take(limit) {
                let time = entry
                    .time()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!("  {} {} ({:?})", time, entry.value, entry.alarm_status);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <container.bin> [--limit <count>]", args[0]);
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let mut limit = 10;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" if i + 1 < args.len() => {
                limit = args[i + 1].parse().context("--limit expects a number")?;
                i += 2;
            }
            other => bail!("Unknown argument: {}", other),
        }
    }

    let bytes = std::fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
    let decoded = ContainerDecoder::new()
        .decode_auto(&bytes)
        .with_context(|| format!("Failed to decode {:?}", path))?;

    println!("=== {} container: {:?} ===", decoded.kind(), path);
    match &decoded {
        DecodedContainer::Classification(c) => {
            println!("Serial:       {}", c.header.serial_number.to_string_lossy());
            println!("Data type:    {}", c.header.data_type);
            println!("Period:       {}", c.header.period_type);
            println!("Compression:  {}", c.header.compression);
        }
        DecodedContainer::TimeSignal(s) => {
            println!("Signal type:  {}", s.header.signal_type);
            println!("Delta x:      {}", s.header.delta_x);
            println!("Speed:        {} Hz", s.header.rotational_frequency);
            println!("Compression:  {}", s.header.compression);
        }
        DecodedContainer::Trend(t) => {
            println!("Values:       {}", t.header.value_count);
            println!("Compression:  {}", t.header.compression);
        }
    }
    print_payload(decoded.payload(), limit);

    Ok(())
}
