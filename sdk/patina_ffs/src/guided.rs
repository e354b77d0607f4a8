//! GUID-defined sections and the codec interface used to decode them.
//!
//! A GUID-defined section names, through its section definition GUID, the decoder that understands its payload.
//! Its header is the common header followed by the GUID, a `DataOffset` (from the start of the section) and an
//! `Attributes` word. Anything between the fixed header and `DataOffset` is guid-specific (for example the CRC32
//! checksum), and the payload occupies `[DataOffset, SectionSize)`.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;
use core::{fmt, mem, ptr};

use patina_pi::{
    fw_fs::ffs::section::{header, raw_type, GuidedSectionAttributes},
    AuthenticationStatus,
};
use r_efi::efi;

use crate::{
    section::{CommonSectionHeader, SizeFieldWidth},
    FirmwareFileSystemError,
};

/// Size of the GUID-defined header fields following the common header.
pub const GUID_DEFINED_HEADER_SIZE: usize = mem::size_of::<header::GuidDefined>();

/// Normalized header of a GUID-defined section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidedSectionHeader {
    common: CommonSectionHeader,
    guid: efi::Guid,
    data_offset: usize,
    attributes: GuidedSectionAttributes,
}

impl GuidedSectionHeader {
    /// Parse the header of the GUID-defined section at the start of `buffer`.
    ///
    /// Fails with `InvalidParameter` when the section is not GUID-defined, when the buffer is too short, or when
    /// `DataOffset` points inside the fixed header or past the end of the section.
    pub fn parse(buffer: &[u8]) -> Result<Self, FirmwareFileSystemError> {
        let common = CommonSectionHeader::parse(buffer)?;
        if common.section_type() != raw_type::encapsulated::GUID_DEFINED {
            log::debug!("Section type {:#x} is not GUID-defined.", common.section_type());
            Err(FirmwareFileSystemError::InvalidParameter)?;
        }

        let fixed_header_end = common.header_size() + GUID_DEFINED_HEADER_SIZE;
        if common.section_size() < fixed_header_end {
            Err(FirmwareFileSystemError::InvalidParameter)?;
        }

        // Safety: section_size <= buffer.len() (checked by CommonSectionHeader::parse), so buffer holds the full
        // GuidDefined header.
        let guid_defined =
            unsafe { ptr::read_unaligned(buffer[common.header_size()..].as_ptr() as *const header::GuidDefined) };

        let data_offset = u16::from_le(guid_defined.data_offset) as usize;
        if data_offset < fixed_header_end || data_offset > common.section_size() {
            log::debug!(
                "Guided section data offset {:#x} outside of [{:#x}, {:#x}].",
                data_offset,
                fixed_header_end,
                common.section_size()
            );
            Err(FirmwareFileSystemError::InvalidParameter)?;
        }

        Ok(Self {
            common,
            guid: guid_defined.section_definition_guid,
            data_offset,
            attributes: GuidedSectionAttributes::from_bits_retain(u16::from_le(guid_defined.attributes)),
        })
    }

    /// The normalized common header.
    pub fn common(&self) -> &CommonSectionHeader {
        &self.common
    }

    /// The section definition GUID selecting the decoder.
    pub fn guid(&self) -> &efi::Guid {
        &self.guid
    }

    /// Offset of the payload from the start of the section.
    pub fn data_offset(&self) -> usize {
        self.data_offset
    }

    /// The section attributes.
    pub fn attributes(&self) -> GuidedSectionAttributes {
        self.attributes
    }

    /// Which size layout the header uses.
    pub fn size_field(&self) -> SizeFieldWidth {
        self.common.size_field()
    }

    /// Total section size in bytes, header included.
    pub fn section_size(&self) -> usize {
        self.common.section_size()
    }

    /// Offset of the guid-specific header fields from the start of the section.
    pub fn guid_specific_offset(&self) -> usize {
        self.common.header_size() + GUID_DEFINED_HEADER_SIZE
    }

    /// Size of the payload in bytes.
    pub fn payload_size(&self) -> usize {
        self.section_size() - self.data_offset
    }
}

/// Zero-copy view of a GUID-defined section.
#[derive(Clone, Copy)]
pub struct GuidedSection<'a> {
    header: GuidedSectionHeader,
    data: &'a [u8],
}

impl<'a> GuidedSection<'a> {
    /// Parse the GUID-defined section at the start of `buffer`. Bytes past the encoded section size are ignored.
    pub fn new_from_buffer(buffer: &'a [u8]) -> Result<Self, FirmwareFileSystemError> {
        let header = GuidedSectionHeader::parse(buffer)?;
        Ok(Self { header, data: &buffer[..header.section_size()] })
    }

    /// The normalized header.
    pub fn header(&self) -> &GuidedSectionHeader {
        &self.header
    }

    /// The section definition GUID.
    pub fn guid(&self) -> &efi::Guid {
        self.header.guid()
    }

    /// The section attributes.
    pub fn attributes(&self) -> GuidedSectionAttributes {
        self.header.attributes()
    }

    /// The complete serialized section.
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }

    /// Bytes between the fixed GUID-defined header and `DataOffset`.
    pub fn guid_specific_data(&self) -> &'a [u8] {
        &self.data[self.header.guid_specific_offset()..self.header.data_offset()]
    }

    /// The opaque payload, `[DataOffset, SectionSize)`.
    pub fn payload(&self) -> &'a [u8] {
        &self.data[self.header.data_offset()..]
    }
}

impl fmt::Debug for GuidedSection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuidedSection")
            .field("header", &self.header)
            .field("payload_size", &self.header.payload_size())
            .finish()
    }
}

impl<'a> TryFrom<&'a [u8]> for GuidedSection<'a> {
    type Error = FirmwareFileSystemError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        GuidedSection::new_from_buffer(value)
    }
}

/// Sizes and attributes reported by [`GuidedSectionCodec::get_info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidedSectionInfo {
    /// Size of the buffer [`GuidedSectionCodec::decode`] will produce.
    pub output_buffer_size: usize,
    /// Size of the scratch buffer [`GuidedSectionCodec::decode`] needs.
    pub scratch_buffer_size: usize,
    /// Attributes of the section.
    pub section_attribute: GuidedSectionAttributes,
}

/// Output of [`GuidedSectionCodec::decode`]. The caller owns `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSection {
    /// The decoded payload.
    pub data: Vec<u8>,
    /// Authentication status of the decoded payload.
    pub authentication_status: AuthenticationStatus,
}

/// Decoder for one kind of GUID-defined section.
///
/// Decoding is a two-step protocol: [`get_info`](Self::get_info) reports the buffer sizes from the header alone,
/// the caller provides a scratch buffer of the reported size, and [`decode`](Self::decode) produces the payload
/// together with its authentication status.
///
/// An integrity check that fails is not an error. It is reported through
/// [`DecodedSection::authentication_status`] so that a policy layer can decide whether to trust the data.
pub trait GuidedSectionCodec: Send + Sync {
    /// Report the output and scratch buffer sizes and the section attributes without decoding the payload.
    fn get_info(&self, section: &GuidedSection<'_>) -> Result<GuidedSectionInfo, FirmwareFileSystemError>;

    /// Decode `section` using `scratch` as working memory.
    fn decode(
        &self,
        section: &GuidedSection<'_>,
        scratch: &mut [u8],
    ) -> Result<DecodedSection, FirmwareFileSystemError>;
}

/// Serializes GUID-defined sections.
///
/// ## Example
///
/// ```rust
/// use patina_ffs::guided::{GuidedSection, GuidedSectionBuilder};
/// use patina_pi::fw_fs::ffs::section::GuidedSectionAttributes;
/// use r_efi::efi;
///
/// let guid = efi::Guid::from_fields(0x1, 0x2, 0x3, 0x4, 0x5, &[0x6; 6]);
/// let bytes = GuidedSectionBuilder::new(guid)
///     .attributes(GuidedSectionAttributes::PROCESSING_REQUIRED)
///     .build(b"payload")
///     .unwrap();
///
/// let section = GuidedSection::new_from_buffer(&bytes).unwrap();
/// assert_eq!(section.guid(), &guid);
/// assert_eq!(section.payload(), b"payload");
/// ```
#[derive(Debug, Clone)]
pub struct GuidedSectionBuilder<'a> {
    guid: efi::Guid,
    attributes: GuidedSectionAttributes,
    guid_specific_data: &'a [u8],
    size_field: Option<SizeFieldWidth>,
}

impl<'a> GuidedSectionBuilder<'a> {
    /// Start a section for the given section definition GUID.
    pub fn new(guid: efi::Guid) -> Self {
        Self { guid, attributes: GuidedSectionAttributes::empty(), guid_specific_data: &[], size_field: None }
    }

    /// Set the section attributes.
    pub fn attributes(mut self, attributes: GuidedSectionAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the guid-specific header bytes placed between the fixed header and the payload.
    pub fn guid_specific_data(mut self, data: &'a [u8]) -> Self {
        self.guid_specific_data = data;
        self
    }

    /// Force a header layout instead of picking it from the section size.
    pub fn size_field(mut self, size_field: SizeFieldWidth) -> Self {
        self.size_field = Some(size_field);
        self
    }

    /// Serialize the section around `payload`.
    pub fn build(&self, payload: &[u8]) -> Result<Vec<u8>, FirmwareFileSystemError> {
        let body_size = GUID_DEFINED_HEADER_SIZE
            .checked_add(self.guid_specific_data.len())
            .and_then(|size| size.checked_add(payload.len()))
            .ok_or(FirmwareFileSystemError::InvalidParameter)?;
        let common =
            CommonSectionHeader::for_body(raw_type::encapsulated::GUID_DEFINED, body_size, self.size_field)?;

        let data_offset: u16 = (common.header_size() + GUID_DEFINED_HEADER_SIZE + self.guid_specific_data.len())
            .try_into()
            .map_err(|_| FirmwareFileSystemError::InvalidParameter)?;

        let mut bytes = common.serialize();
        bytes.extend_from_slice(self.guid.as_bytes());
        bytes.extend_from_slice(&data_offset.to_le_bytes());
        bytes.extend_from_slice(&self.attributes.bits().to_le_bytes());
        bytes.extend_from_slice(self.guid_specific_data);
        bytes.extend_from_slice(payload);
        Ok(bytes)
    }
}
