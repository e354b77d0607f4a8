//! Section parsing and composition utilities for UEFI Firmware File System (FFS) sections.
//!
//! A section starts with a common header holding a 24-bit size and a type. When the size field holds the
//! `0xFFFFFF` sentinel, the section uses the extended ("Section2") layout and a 32-bit size follows the type
//! byte. [`CommonSectionHeader::parse`] reads either layout once and produces a normalized header; the rest of
//! the code only deals with that normalized form.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;
use core::{fmt, mem, ptr};

use patina_pi::fw_fs::ffs::section::{self, header, EfiSectionType, EXTENDED_SIZE_SENTINEL};

use crate::{guided::GuidedSection, FirmwareFileSystemError};

/// Sections in a section stream start on 4-byte boundaries.
pub const SECTION_ALIGNMENT: usize = 4;

/// Width of the size field used by a section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeFieldWidth {
    /// 24-bit size packed into the common header.
    Legacy,
    /// `0xFFFFFF` sentinel in the 24-bit field, followed by a 32-bit extended size ("Section2").
    Extended,
}

impl SizeFieldWidth {
    /// Size in bytes of the common header for this layout.
    pub const fn header_size(&self) -> usize {
        match self {
            SizeFieldWidth::Legacy => mem::size_of::<header::CommonSectionHeaderStandard>(),
            SizeFieldWidth::Extended => mem::size_of::<header::CommonSectionHeaderExtended>(),
        }
    }
}

/// Normalized common section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonSectionHeader {
    section_type: EfiSectionType,
    size_field: SizeFieldWidth,
    section_size: usize,
}

impl CommonSectionHeader {
    /// Parse the common header at the start of `buffer`.
    ///
    /// Fails with `InvalidParameter` if the buffer cannot hold the header, if the encoded size is smaller than the
    /// header itself, or if the encoded size runs past the end of the buffer.
    pub fn parse(buffer: &[u8]) -> Result<Self, FirmwareFileSystemError> {
        if buffer.len() < mem::size_of::<header::CommonSectionHeaderStandard>() {
            Err(FirmwareFileSystemError::InvalidParameter)?;
        }

        // Safety: buffer is large enough to contain the standard header, which is made of plain bytes.
        let standard = unsafe { ptr::read_unaligned(buffer.as_ptr() as *const header::CommonSectionHeaderStandard) };
        let size = u32::from_le_bytes([standard.size[0], standard.size[1], standard.size[2], 0]);

        let (size_field, section_size) = if size == EXTENDED_SIZE_SENTINEL {
            if buffer.len() < mem::size_of::<header::CommonSectionHeaderExtended>() {
                Err(FirmwareFileSystemError::InvalidParameter)?;
            }
            // Safety: buffer is large enough to contain the extended header.
            let extended =
                unsafe { ptr::read_unaligned(buffer.as_ptr() as *const header::CommonSectionHeaderExtended) };
            (SizeFieldWidth::Extended, u32::from_le(extended.extended_size) as usize)
        } else {
            (SizeFieldWidth::Legacy, size as usize)
        };

        if section_size < size_field.header_size() || section_size > buffer.len() {
            log::debug!(
                "Section size {:#x} is inconsistent with a {:#x} byte buffer ({:?} layout).",
                section_size,
                buffer.len(),
                size_field
            );
            Err(FirmwareFileSystemError::InvalidParameter)?;
        }

        Ok(Self { section_type: standard.section_type, size_field, section_size })
    }

    /// Build a header for a section of `section_type` whose body (everything after the common header) is
    /// `body_size` bytes long.
    ///
    /// With `size_field` set to `None` the legacy layout is used unless the total size reaches the
    /// `0xFFFFFF` sentinel. Fails with `InvalidParameter` if the requested layout cannot encode the size.
    pub fn for_body(
        section_type: EfiSectionType,
        body_size: usize,
        size_field: Option<SizeFieldWidth>,
    ) -> Result<Self, FirmwareFileSystemError> {
        let legacy_size = body_size.checked_add(SizeFieldWidth::Legacy.header_size());
        let size_field = match (size_field, legacy_size) {
            (Some(width), _) => width,
            (None, Some(size)) if size < EXTENDED_SIZE_SENTINEL as usize => SizeFieldWidth::Legacy,
            (None, _) => SizeFieldWidth::Extended,
        };

        let section_size = body_size
            .checked_add(size_field.header_size())
            .ok_or(FirmwareFileSystemError::InvalidParameter)?;
        let limit = match size_field {
            SizeFieldWidth::Legacy => EXTENDED_SIZE_SENTINEL as usize - 1,
            SizeFieldWidth::Extended => u32::MAX as usize,
        };
        if section_size > limit {
            Err(FirmwareFileSystemError::InvalidParameter)?;
        }

        Ok(Self { section_type, size_field, section_size })
    }

    /// The raw section type (see `patina_pi::fw_fs::ffs::section::raw_type`).
    pub fn section_type(&self) -> EfiSectionType {
        self.section_type
    }

    /// Which size layout the header uses.
    pub fn size_field(&self) -> SizeFieldWidth {
        self.size_field
    }

    /// Total section size in bytes, header included.
    pub fn section_size(&self) -> usize {
        self.section_size
    }

    /// Size of the common header in bytes.
    pub fn header_size(&self) -> usize {
        self.size_field.header_size()
    }

    /// Serialize the common header.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.header_size());
        match self.size_field {
            SizeFieldWidth::Legacy => {
                bytes.extend_from_slice(&(self.section_size as u32).to_le_bytes()[..3]);
                bytes.push(self.section_type);
            }
            SizeFieldWidth::Extended => {
                bytes.extend_from_slice(&EXTENDED_SIZE_SENTINEL.to_le_bytes()[..3]);
                bytes.push(self.section_type);
                bytes.extend_from_slice(&(self.section_size as u32).to_le_bytes());
            }
        }
        bytes
    }
}

/// Zero-copy view of a single section within a byte buffer.
#[derive(Clone, Copy)]
pub struct Section<'a> {
    header: CommonSectionHeader,
    data: &'a [u8],
}

impl<'a> Section<'a> {
    /// Parse the section at the start of `buffer`. Bytes past the encoded section size are ignored.
    pub fn new_from_buffer(buffer: &'a [u8]) -> Result<Self, FirmwareFileSystemError> {
        let header = CommonSectionHeader::parse(buffer)?;
        Ok(Self { header, data: &buffer[..header.section_size()] })
    }

    /// The normalized common header.
    pub fn header(&self) -> &CommonSectionHeader {
        &self.header
    }

    /// The raw section type.
    pub fn section_type(&self) -> EfiSectionType {
        self.header.section_type()
    }

    /// Total section size in bytes, header included.
    pub fn size(&self) -> usize {
        self.header.section_size()
    }

    /// The complete serialized section.
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }

    /// Section bytes following the common header.
    pub fn content(&self) -> &'a [u8] {
        &self.data[self.header.header_size()..]
    }

    /// Whether this is a GUID-defined encapsulation section.
    pub fn is_guid_defined(&self) -> bool {
        self.section_type() == section::raw_type::encapsulated::GUID_DEFINED
    }

    /// Interpret this section as a GUID-defined section.
    pub fn as_guided(&self) -> Result<GuidedSection<'a>, FirmwareFileSystemError> {
        GuidedSection::new_from_buffer(self.data)
    }
}

impl fmt::Debug for Section<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("section_type", &format_args!("{:#x}", self.section_type()))
            .field("size_field", &self.header.size_field())
            .field("size", &format_args!("{:#x}", self.size()))
            .finish()
    }
}

impl<'a> TryFrom<&'a [u8]> for Section<'a> {
    type Error = FirmwareFileSystemError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        Section::new_from_buffer(value)
    }
}

/// Serialize a section of `section_type` holding `content`, choosing the header layout from its size.
pub fn compose_leaf_section(section_type: EfiSectionType, content: &[u8]) -> Result<Vec<u8>, FirmwareFileSystemError> {
    let header = CommonSectionHeader::for_body(section_type, content.len(), None)?;
    let mut bytes = header.serialize();
    bytes.extend_from_slice(content);
    Ok(bytes)
}

/// Parses a list of serialized sections from a raw byte slice.
///
/// Each call to the iterator yields the next parsed [`Section`]. Sections start on [`SECTION_ALIGNMENT`]
/// boundaries relative to the start of the slice. Iteration ends when fewer bytes than a common section header
/// remain, so trailing padding is ignored. Once an error occurs, iteration stops.
pub struct SectionIterator<'a> {
    data: &'a [u8],
    next_offset: usize,
    error: bool,
}

impl<'a> SectionIterator<'a> {
    /// Create a new iterator over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, next_offset: 0, error: false }
    }
}

impl<'a> Iterator for SectionIterator<'a> {
    type Item = Result<Section<'a>, FirmwareFileSystemError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error
            || self.data.len().saturating_sub(self.next_offset) < mem::size_of::<header::CommonSectionHeaderStandard>()
        {
            return None;
        }

        let result = Section::new_from_buffer(&self.data[self.next_offset..]);
        match result {
            Ok(ref section) => {
                let next = self
                    .next_offset
                    .checked_add(section.size())
                    .and_then(|end| end.checked_next_multiple_of(SECTION_ALIGNMENT));
                match next {
                    Some(next) => self.next_offset = next,
                    None => {
                        self.error = true;
                        return Some(Err(FirmwareFileSystemError::InvalidParameter));
                    }
                }
            }
            Err(_) => self.error = true,
        }
        Some(result)
    }
}
