//! Module for installing every feature-enabled codec into a registry.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use patina_ffs::FirmwareFileSystemError;
use patina_section_extractor::GuidedSectionRegistry;

#[cfg(feature = "brotli")]
use crate::BrotliGuidedSectionCodec;
#[cfg(feature = "crc32")]
use crate::Crc32GuidedSectionCodec;

/// Registers the codec of every enabled feature in `registry`, keyed by its section definition GUID.
///
/// The CRC32 codec is installed with its default services. Use
/// [`Crc32GuidedSectionCodec::with_services`] and [`GuidedSectionRegistry::register_codec`] directly to give it a
/// platform protocol locator.
pub fn install_default_codecs(_registry: &GuidedSectionRegistry) -> Result<(), FirmwareFileSystemError> {
    #[cfg(feature = "brotli")]
    {
        _registry.register_codec(patina_pi::fw_fs::guid::BROTLI_SECTION, BrotliGuidedSectionCodec::new())?;
    }

    #[cfg(feature = "crc32")]
    {
        _registry.register_codec(patina_pi::fw_fs::guid::CRC32_SECTION, Crc32GuidedSectionCodec::new())?;
    }

    Ok(())
}
