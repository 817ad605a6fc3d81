//! CMS Data CLI Application
//!
//! Command-line front end for the cms-data-decoder library. It adds:
//! - File handling (one or more input files, optional output file)
//! - Hex-encoded input detection
//! - Text and JSON rendering of decoded containers
//! - TOML configuration with command-line overrides

use anyhow::{bail, Context, Result};
use clap::Parser;
use cms_data_decoder::{ContainerDecoder, ContainerKind, DecodedContainer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

mod config;
mod hex_input;
mod report;

use config::{AppConfig, OutputFormat};

/// Container kind selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum KindArg {
    /// Detect from the header version and size
    Auto,
    Classification,
    Timesignal,
    Trend,
}

impl KindArg {
    fn container_kind(self) -> Option<ContainerKind> {
        match self {
            KindArg::Auto => None,
            KindArg::Classification => Some(ContainerKind::Classification),
            KindArg::Timesignal => Some(ContainerKind::TimeSignal),
            KindArg::Trend => Some(ContainerKind::Trend),
        }
    }
}

/// CMS Data - Decode condition monitoring data containers
#[derive(Parser, Debug)]
#[command(name = "cms-data-cli")]
#[command(about = "Decode classification, time signal and trend containers", long_about = None)]
#[command(version)]
struct Args {
    /// Binary or hex-encoded container file(s) to decode
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Container kind (default: detect from header)
    #[arg(short, long, value_enum, default_value_t = KindArg::Auto)]
    kind: KindArg,

    /// Output file for decoded data (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Time signal samples per line (overrides the config file)
    #[arg(long, value_name = "COUNT")]
    values_per_row: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("CMS Data CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", cms_data_decoder::VERSION);

    let config = resolve_config(&args)?;
    let decoder = ContainerDecoder::with_config(config.decoder.clone());

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut failures = 0;
    for path in &args.inputs {
        match decode_file(&decoder, path, args.kind.container_kind()) {
            Ok(decoded) => {
                log::info!("{:?}: {} container", path, decoded.kind());
                report::write_report(&mut out, path, &decoded, &config.output)
                    .with_context(|| format!("Failed to write report for {:?}", path))?;
            }
            Err(e) => {
                log::error!("{:#}", e);
                failures += 1;
            }
        }
    }
    out.flush()?;

    if let Some(path) = &args.output {
        if failures < args.inputs.len() {
            log::info!("Decoded data written to {:?}", path);
        }
    }

    if failures > 0 {
        bail!("{} of {} file(s) could not be decoded", failures, args.inputs.len());
    }
    Ok(())
}

/// Load the config file, if any, and apply command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(per_row) = args.values_per_row {
        config.output.values_per_row = per_row;
    }
    config.validate()?;

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Read, optionally hex-convert and decode one input file
fn decode_file(
    decoder: &ContainerDecoder,
    path: &Path,
    kind: Option<ContainerKind>,
) -> Result<DecodedContainer> {
    let raw = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;

    let bytes = hex_input::decode_if_hex(&raw);
    if bytes.len() != raw.len() {
        log::info!(
            "{:?} is hex encoded, converted {} characters to {} bytes",
            path,
            raw.len(),
            bytes.len()
        );
    }

    let decoded = match kind {
        Some(kind) => decoder.decode_kind(kind, &bytes),
        None => decoder.decode_auto(&bytes),
    };
    decoded.with_context(|| format!("Failed to decode {:?}", path))
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_data_decoder::checksum::fold_checksum;
    use config::OutputConfig;

    /// Version 3 trend container with `count` entries
    fn trend_container(count: usize) -> Vec<u8> {
        let mut payload = Vec::new();
        for i in 0..count {
            payload.extend_from_slice(&(1_700_000_000_000_000i64 + i as i64).to_le_bytes());
            payload.extend_from_slice(&(i as f64).to_le_bytes());
            payload.extend_from_slice(&5.0f32.to_le_bytes());
            payload.extend_from_slice(&2.5f32.to_le_bytes());
            payload.extend_from_slice(&[0, 1, 0, 0]);
            payload.extend_from_slice(&f32::NAN.to_le_bytes());
        }

        let mut header = vec![0u8; 96];
        header[0..2].copy_from_slice(&3u16.to_le_bytes());
        header[2..4].copy_from_slice(&96u16.to_le_bytes());
        header[4..8].copy_from_slice(&1u32.to_le_bytes());
        header[80..84].copy_from_slice(&(count as i32).to_le_bytes());
        header[84..88].copy_from_slice(&(payload.len() as i32).to_le_bytes());
        header[92..94].copy_from_slice(&fold_checksum(&payload).to_le_bytes());
        let checksum = fold_checksum(&header[..94]);
        header[94..96].copy_from_slice(&checksum.to_le_bytes());

        header.extend_from_slice(&payload);
        header
    }

    #[test]
    fn test_decode_binary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.bin");
        std::fs::write(&path, trend_container(3)).unwrap();

        let decoded = decode_file(&ContainerDecoder::new(), &path, None).unwrap();
        assert_eq!(decoded.kind(), ContainerKind::Trend);
        assert_eq!(decoded.payload().as_trend().unwrap().len(), 3);
    }

    #[test]
    fn test_decode_hex_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.hex");
        let text = format!("{}\n", hex::encode_upper(trend_container(2)));
        std::fs::write(&path, text).unwrap();

        let decoded = decode_file(
            &ContainerDecoder::new(),
            &path,
            Some(ContainerKind::Trend),
        )
        .unwrap();
        assert_eq!(decoded.payload().as_trend().unwrap().len(), 2);
    }

    #[test]
    fn test_decode_failure_has_file_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.bin");
        let mut bytes = trend_container(1);
        bytes[100] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();

        let err = decode_file(&ContainerDecoder::new(), &path, None).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("broken.bin"));
        assert!(message.contains("Data checksum mismatch"));
    }

    #[test]
    fn test_text_and_json_reports() {
        let decoded = ContainerDecoder::new()
            .decode_auto(&trend_container(2))
            .unwrap();
        let path = Path::new("trend.bin");

        let mut text = Vec::new();
        report::write_report(&mut text, path, &decoded, &OutputConfig::default()).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.contains("Number of trend entries:"));
        assert!(text.contains("2023-11-14 22:13:20.000 (UTC)"));

        let options = OutputConfig {
            format: OutputFormat::Json,
            ..OutputConfig::default()
        };
        let mut json = Vec::new();
        report::write_report(&mut json, path, &decoded, &options).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["file"], "trend.bin");
        assert_eq!(value["container"]["kind"], "trend");
        assert_eq!(value["container"]["header"]["value_count"], 2);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "cms-data-cli",
            "a.bin",
            "b.bin",
            "--kind",
            "timesignal",
            "-f",
            "json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.kind.container_kind(), Some(ContainerKind::TimeSignal));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.verbose, 2);

        assert!(Args::try_parse_from(["cms-data-cli"]).is_err());
    }

    #[test]
    fn test_config_overrides() {
        let args = Args::try_parse_from(["cms-data-cli", "a.bin", "--values-per-row", "4"]).unwrap();
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.output.values_per_row, 4);
        assert_eq!(config.output.format, OutputFormat::Text);

        let args = Args::try_parse_from(["cms-data-cli", "a.bin", "--values-per-row", "0"]).unwrap();
        assert!(resolve_config(&args).is_err());
    }
}
