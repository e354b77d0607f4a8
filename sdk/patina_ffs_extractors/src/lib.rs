//! # Guided Section Codec Implementations
//!
//! This crate provides implementations of the `patina_ffs::guided::GuidedSectionCodec` trait, together with the
//! platform services they consume.
//!
//! ## Features
//!
//! Each feature enables one codec, so that a platform only compiles the decoders it ships.
//! - `brotli`: Enables the `BrotliGuidedSectionCodec` implementation for Brotli compressed GUID-defined sections.
//! - `crc32`: Enables the `Crc32GuidedSectionCodec` implementation to validate CRC32 GUID-defined sections and
//!   return the payload along with its authentication status.
//! - `mockall`: Exposes mock implementations of the platform service traits.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(not(any(test, feature = "std")), no_std)]
extern crate alloc;

#[cfg(feature = "brotli")]
mod brotli;
#[cfg(feature = "brotli")]
pub use brotli::{BrotliGuidedSectionCodec, BROTLI_PREFIX_SIZE};

#[cfg(feature = "crc32")]
mod crc32;
#[cfg(feature = "crc32")]
pub use crc32::{Crc32GuidedSectionCodec, CRC32_CHECKSUM_SIZE};

pub mod platform;

mod composite;
pub use composite::install_default_codecs;
