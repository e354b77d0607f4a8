//! Module for CRC32 guided sections.
//!
//! A CRC32 guided section carries a 4-byte little-endian checksum of its payload in the guid-specific header. The
//! payload itself is stored as is. A checksum mismatch does not fail the decode. It is reported through the
//! authentication status so the caller decides whether to trust the data.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;

use patina_ffs::{
    guided::{DecodedSection, GuidedSection, GuidedSectionBuilder, GuidedSectionCodec, GuidedSectionInfo},
    pool, FirmwareFileSystemError,
};
use patina_pi::{
    fw_fs::{
        ffs::section::{header, GuidedSectionAttributes},
        guid,
    },
    protocols::security_policy,
    AuthenticationStatus,
};

use crate::platform::{Crc32Calculator, Crc32FastCalculator, NullProtocolLocator, ProtocolLocator};

/// Size of the guid-specific header of a CRC32 guided section.
pub const CRC32_CHECKSUM_SIZE: usize = core::mem::size_of::<header::Crc32>();

/// Decoder for CRC32 guided sections.
///
/// If the security policy protocol is installed, the platform has taken over the integrity decision: the checksum
/// is not computed at all and the output is marked as a platform override, whatever the payload contains.
///
/// ## Panics
///
/// In builds with debug assertions enabled, [`decode`](GuidedSectionCodec::decode) panics on a section without
/// [`AUTH_STATUS_VALID`](GuidedSectionAttributes::AUTH_STATUS_VALID). Such a section can arrive from an untrusted
/// image through [`extract_sections`](patina_section_extractor::GuidedSectionRegistry::extract_sections). Release
/// builds decode it like any other CRC32 section.
#[derive(Debug, Default, Clone, Copy)]
pub struct Crc32GuidedSectionCodec<L = NullProtocolLocator, C = Crc32FastCalculator> {
    locator: L,
    calculator: C,
}

impl Crc32GuidedSectionCodec {
    /// Creates a codec that computes checksums with `crc32fast` and never sees a security policy protocol.
    pub const fn new() -> Self {
        Self { locator: NullProtocolLocator, calculator: Crc32FastCalculator }
    }
}

impl<L, C> Crc32GuidedSectionCodec<L, C>
where
    L: ProtocolLocator,
    C: Crc32Calculator,
{
    /// Creates a codec using the given platform services.
    pub const fn with_services(locator: L, calculator: C) -> Self {
        Self { locator, calculator }
    }

    /// Composes a CRC32 guided section around `payload`.
    ///
    /// `AUTH_STATUS_VALID` is always set in the resulting section, in addition to `attributes`.
    pub fn encode(
        &self,
        payload: &[u8],
        attributes: GuidedSectionAttributes,
    ) -> Result<Vec<u8>, FirmwareFileSystemError> {
        let checksum = self.calculator.crc32(payload).to_le_bytes();
        GuidedSectionBuilder::new(guid::CRC32_SECTION)
            .attributes(attributes | GuidedSectionAttributes::AUTH_STATUS_VALID)
            .guid_specific_data(&checksum)
            .build(payload)
    }

    fn stored_checksum(section: &GuidedSection<'_>) -> Result<u32, FirmwareFileSystemError> {
        if section.guid() != &guid::CRC32_SECTION {
            log::error!("CRC32 codec invoked for a section tagged {:?}.", section.guid());
            Err(FirmwareFileSystemError::InvalidParameter)?;
        }

        match section.guid_specific_data().get(..CRC32_CHECKSUM_SIZE) {
            Some(&[b0, b1, b2, b3]) => Ok(u32::from_le_bytes([b0, b1, b2, b3])),
            _ => {
                log::error!("CRC32 section header has no room for the checksum.");
                Err(FirmwareFileSystemError::InvalidParameter)
            }
        }
    }
}

impl<L, C> GuidedSectionCodec for Crc32GuidedSectionCodec<L, C>
where
    L: ProtocolLocator + Send + Sync,
    C: Crc32Calculator + Send + Sync,
{
    fn get_info(&self, section: &GuidedSection<'_>) -> Result<GuidedSectionInfo, FirmwareFileSystemError> {
        Self::stored_checksum(section)?;
        Ok(GuidedSectionInfo {
            output_buffer_size: section.payload().len(),
            scratch_buffer_size: 0,
            section_attribute: section.attributes(),
        })
    }

    fn decode(
        &self,
        section: &GuidedSection<'_>,
        _scratch: &mut [u8],
    ) -> Result<DecodedSection, FirmwareFileSystemError> {
        let stored = Self::stored_checksum(section)?;
        let image = section.payload();
        let mut data = pool::allocate_buffer(image.len())?;

        debug_assert!(
            section.attributes().contains(GuidedSectionAttributes::AUTH_STATUS_VALID),
            "CRC32 guided sections always carry AUTH_STATUS_VALID"
        );

        let mut authentication_status = AuthenticationStatus::local_and_aggregate(AuthenticationStatus::IMAGE_SIGNED);

        if self.locator.is_installed(&security_policy::PROTOCOL_GUID) {
            log::warn!("Security policy protocol installed: accepting CRC32 section without verifying the checksum.");
            authentication_status |= AuthenticationStatus::local_and_aggregate(AuthenticationStatus::PLATFORM_OVERRIDE);
        } else {
            let computed = self.calculator.crc32(image);
            if computed != stored {
                log::warn!("CRC32 mismatch: section stores {:#010x}, payload hashes to {:#010x}.", stored, computed);
                authentication_status |= AuthenticationStatus::local_and_aggregate(AuthenticationStatus::TEST_FAILED);
            }
        }

        data.copy_from_slice(image);
        Ok(DecodedSection { data, authentication_status })
    }
}
