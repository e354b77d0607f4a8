//! Nested section stream extraction.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;

use patina_ffs::{
    guided::GuidedSection,
    pool,
    section::{Section, SectionIterator},
    FirmwareFileSystemError,
};
use patina_pi::{
    fw_fs::ffs::section::{EfiSectionType, GuidedSectionAttributes},
    AuthenticationStatus,
};

use crate::GuidedSectionRegistry;

/// Maximum depth of GUID-defined sections nested inside one another.
pub const MAX_NESTING_DEPTH: usize = 32;

/// A leaf section produced by [`GuidedSectionRegistry::extract_sections`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSection {
    /// The section type.
    pub section_type: EfiSectionType,
    /// The section content, without the common header.
    pub data: Vec<u8>,
    /// Authentication status accumulated over every GUID-defined section enclosing this one.
    pub authentication_status: AuthenticationStatus,
}

impl GuidedSectionRegistry {
    /// Extracts every leaf section from a section stream.
    ///
    /// GUID-defined sections are decoded with their registered codec and the decoded output is walked as a nested
    /// section stream. A GUID-defined section without a codec is walked in place when it does not require
    /// processing and is skipped otherwise.
    ///
    /// The local bits of each section's authentication status are those of the innermost GUID-defined section that
    /// produced it. The aggregate bits are the union of the aggregate bits of all enclosing GUID-defined sections.
    ///
    /// ## Errors
    ///
    /// - [`InvalidParameter`](FirmwareFileSystemError::InvalidParameter) on a malformed section or when
    ///   GUID-defined sections nest deeper than [`MAX_NESTING_DEPTH`].
    /// - Any error returned by a codec.
    pub fn extract_sections(&self, stream: &[u8]) -> Result<Vec<ExtractedSection>, FirmwareFileSystemError> {
        let mut sections = Vec::new();
        self.extract_into(stream, AuthenticationStatus::empty(), 0, &mut sections)?;
        Ok(sections)
    }

    fn extract_into(
        &self,
        stream: &[u8],
        status: AuthenticationStatus,
        depth: usize,
        sections: &mut Vec<ExtractedSection>,
    ) -> Result<(), FirmwareFileSystemError> {
        for section in SectionIterator::new(stream) {
            let section = section?;
            if !section.is_guid_defined() {
                sections.push(ExtractedSection {
                    section_type: section.section_type(),
                    data: pool::allocate_copy(section.content())?,
                    authentication_status: status,
                });
                continue;
            }

            if depth >= MAX_NESTING_DEPTH {
                log::error!("Guided sections nested deeper than {} levels.", MAX_NESTING_DEPTH);
                Err(FirmwareFileSystemError::InvalidParameter)?;
            }
            self.extract_guided(&section, status, depth + 1, sections)?;
        }
        Ok(())
    }

    fn extract_guided(
        &self,
        section: &Section<'_>,
        status: AuthenticationStatus,
        depth: usize,
        sections: &mut Vec<ExtractedSection>,
    ) -> Result<(), FirmwareFileSystemError> {
        let guided: GuidedSection<'_> = section.as_guided()?;

        if self.contains(guided.guid()) {
            let decoded = self.decode(section.raw()).inspect_err(|err| {
                log::error!("Failed to decode guided section {:?}: {}.", guided.guid(), err);
            })?;
            let nested_status = decoded.authentication_status.nested_in(status);
            return self.extract_into(&decoded.data, nested_status, depth, sections);
        }

        let attributes = guided.attributes();
        if attributes.contains(GuidedSectionAttributes::PROCESSING_REQUIRED) {
            log::warn!("Skipping guided section {:?}: processing required but no handler registered.", guided.guid());
            return Ok(());
        }

        let local = if attributes.contains(GuidedSectionAttributes::AUTH_STATUS_VALID) {
            AuthenticationStatus::local_and_aggregate(
                AuthenticationStatus::IMAGE_SIGNED | AuthenticationStatus::NOT_TESTED,
            )
        } else {
            AuthenticationStatus::empty()
        };
        log::debug!("Walking unprocessed guided section {:?} in place.", guided.guid());
        self.extract_into(guided.payload(), local.nested_in(status), depth, sections)
    }
}
