//! Guided Section Integration Tests
//!
//! Tests the register, get-info and decode flow across `patina_section_extractor` and the codecs in
//! `patina_ffs_extractors`.
//!
//! ## Logging
//!
//! The `env_logger` crate can be used to enable logging during tests.
//!
//! To enable logging, set the `RUST_LOG` environment variable to the desired
//! log level (e.g., `debug`, `info`, `warn`, `error`) before running the tests.
//!
//! For example, to enable debug logging, run:
//!
//! ```sh
//! RUST_LOG=debug cargo test -p patina_ffs_extractors --test guided_section_integration
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

mod dispatch_tests;
mod nested_extraction_tests;

use std::sync::Once;

use patina_ffs::section::compose_leaf_section;
use patina_pi::fw_fs::ffs::section::EfiSectionType;

static INIT: Once = Once::new();

pub(crate) fn init_logger() {
    INIT.call_once(|| {
        // Default to no logging unless RUST_LOG environment variable is set
        let mut builder = env_logger::Builder::from_default_env();

        // If RUST_LOG is not set, default to Off (no logging)
        if std::env::var("RUST_LOG").is_err() {
            builder.filter_level(log::LevelFilter::Off);
        }

        builder.init();
    });
}

/// Concatenates sections into a stream, padding each one to a 4-byte boundary.
pub(crate) fn section_stream(sections: &[Vec<u8>]) -> Vec<u8> {
    let mut stream = Vec::new();
    for section in sections {
        stream.resize(stream.len().next_multiple_of(4), 0);
        stream.extend_from_slice(section);
    }
    stream
}

pub(crate) fn leaf(section_type: EfiSectionType, content: &[u8]) -> Vec<u8> {
    compose_leaf_section(section_type, content).expect("leaf section should compose")
}

/// Wraps `stream` in a Brotli guided section using uncompressed meta-blocks.
pub(crate) fn brotli_section(stream: &[u8]) -> Vec<u8> {
    use patina_ffs::guided::GuidedSectionBuilder;
    use patina_pi::fw_fs::{ffs::section::GuidedSectionAttributes, guid};

    assert!(!stream.is_empty() && stream.len() <= 0x10000);

    // WBITS=16, then a non-final uncompressed meta-block of MLEN bytes, then an empty final meta-block.
    let mlen_minus_one = (stream.len() - 1) as u32;
    let header = (mlen_minus_one << 4) | (1 << 20);
    let mut brotli = header.to_le_bytes()[..3].to_vec();
    brotli.extend_from_slice(stream);
    brotli.push(0x03);

    let mut payload = Vec::new();
    payload.extend_from_slice(&(stream.len() as u64).to_le_bytes());
    payload.extend_from_slice(&0u64.to_le_bytes());
    payload.extend_from_slice(&brotli);

    GuidedSectionBuilder::new(guid::BROTLI_SECTION)
        .attributes(GuidedSectionAttributes::PROCESSING_REQUIRED)
        .build(&payload)
        .expect("brotli section should compose")
}
