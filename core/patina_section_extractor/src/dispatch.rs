//! Dispatch of GUID-defined sections to registered codecs.
//!
//! The dispatch operations parse just enough of the input to find the section definition GUID, look the GUID up
//! in the registry and forward the call. Codec results, including errors and authentication status, are returned
//! unchanged.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::sync::Arc;

use patina_ffs::{
    guided::{DecodedSection, GuidedSection, GuidedSectionCodec, GuidedSectionInfo},
    pool, FirmwareFileSystemError,
};

use crate::GuidedSectionRegistry;

impl GuidedSectionRegistry {
    fn resolve<'a>(
        &self,
        input: &'a [u8],
    ) -> Result<(GuidedSection<'a>, Arc<dyn GuidedSectionCodec>), FirmwareFileSystemError> {
        if input.is_empty() {
            Err(FirmwareFileSystemError::InvalidParameter)?;
        }

        let section = GuidedSection::new_from_buffer(input)?;
        match self.handler(section.guid()) {
            Some(codec) => Ok((section, codec)),
            None => {
                log::warn!("No guided section handler registered for {:?}.", section.guid());
                Err(FirmwareFileSystemError::InvalidParameter)
            }
        }
    }

    /// Queries the buffer sizes and attributes needed to decode `input`.
    ///
    /// ## Errors
    ///
    /// [`InvalidParameter`](FirmwareFileSystemError::InvalidParameter) if `input` is empty, is not a well-formed
    /// GUID-defined section, or names a GUID with no registered codec. Otherwise the codec's result is returned as is.
    pub fn get_info(&self, input: &[u8]) -> Result<GuidedSectionInfo, FirmwareFileSystemError> {
        let (section, codec) = self.resolve(input)?;
        codec.get_info(&section)
    }

    /// Decodes `input` with a caller-provided scratch buffer.
    ///
    /// `scratch` should be at least as large as the scratch size reported by [`get_info`](Self::get_info). Errors
    /// are the same as for [`get_info`](Self::get_info).
    pub fn decode_with_scratch(
        &self,
        input: &[u8],
        scratch: &mut [u8],
    ) -> Result<DecodedSection, FirmwareFileSystemError> {
        let (section, codec) = self.resolve(input)?;
        codec.decode(&section, scratch)
    }

    /// Decodes `input`, allocating the scratch buffer reported by [`get_info`](Self::get_info).
    pub fn decode(&self, input: &[u8]) -> Result<DecodedSection, FirmwareFileSystemError> {
        let (section, codec) = self.resolve(input)?;
        let info = codec.get_info(&section)?;
        let mut scratch = pool::allocate_buffer(info.scratch_buffer_size)?;
        let decoded = codec.decode(&section, &mut scratch)?;
        log::debug!(
            "Decoded guided section {:?}: {:#x} bytes, authentication status {:#x}.",
            section.guid(),
            decoded.data.len(),
            decoded.authentication_status.bits()
        );
        Ok(decoded)
    }
}
