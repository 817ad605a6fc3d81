//! CMS Data Decoder Library
//!
//! A stateless library for decoding the binary data containers produced by
//! condition monitoring devices: classification matrices, time signals
//! (including spectra and order analyses) and trend logs.
//!
//! # Architecture
//!
//! Each container is a fixed-layout little-endian header followed by a
//! payload. Decoding a buffer:
//! - Resolves the header, migrating legacy schema versions
//! - Verifies the header checksum, the declared sizes and the data checksum
//! - Inflates zlib or gzip payloads
//! - Reinterprets the payload as typed samples, counters or trend entries
//!
//! The library does NOT:
//! - Read files or parse transport envelopes
//! - Render uuids, timestamps or tables
//! - Apply scaling to samples
//!
//! All presentation is in the application layer (cms-data-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use cms_data_decoder::{ContainerDecoder, DecodedContainer, DecoderConfig};
//!
//! let bytes = std::fs::read("container.bin").unwrap();
//!
//! let decoder = ContainerDecoder::with_config(
//!     DecoderConfig::new().with_max_payload_len(64 * 1024 * 1024),
//! );
//!
//! match decoder.decode_auto(&bytes) {
//!     Ok(DecodedContainer::TimeSignal(signal)) => {
//!         let samples = signal.payload.as_samples().unwrap();
//!         for raw in samples.iter_f64() {
//!             println!("{}", signal.header.scale(raw));
//!         }
//!     }
//!     Ok(other) => println!("Decoded {} container", other.kind()),
//!     Err(e) => eprintln!("Decode error: {}", e),
//! }
//! ```

// Public modules
pub mod checksum;
pub mod compression;
pub mod config;
pub mod decoder;
pub mod formats;
pub mod samples;
pub mod types;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use decoder::{ContainerDecoder, DecodeStage, Decoded, DecodedContainer};
pub use formats::{
    ClassificationFormat, ClassificationHeader, ContainerFormat, ContainerHeader,
    TimeSignalFormat, TimeSignalHeader, TrendFormat, TrendHeader,
};
pub use types::{
    ClassificationMatrix, Compression, ContainerKind, ContentId, DecodedPayload, DecoderError,
    Result, SampleArray, SampleType, SignalType, Timestamp, TrendEntry,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
