//! Firmware File Section Definitions
//!
//! Based on the values defined in the UEFI Platform Initialization (PI) Specification V1.8A Section 3.2.4
//! Firmware File Section and 3.2.5 Section Types.
//!
//! The structures in [`header`] describe the exact on-disk layouts. Parsers in `patina_ffs` read them once and
//! operate on a normalized representation afterwards.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Type alias for section type identifiers
pub type EfiSectionType = u8;

/// Value of the 24-bit size field signalling that the 32-bit extended size follows the common header.
pub const EXTENDED_SIZE_SENTINEL: u32 = 0x00FF_FFFF;

/// Section type values. Typically called `EFI_SECTION_*` in EDK II code.
pub mod raw_type {
    /// Wild card used when searching for sections of any type.
    pub const ALL: u8 = 0x00;
    /// Encapsulation section types.
    pub mod encapsulated {
        /// Compression encapsulated section
        pub const COMPRESSION: u8 = 0x01;
        /// GUID-defined encapsulated section
        pub const GUID_DEFINED: u8 = 0x02;
        /// Disposable encapsulated section
        pub const DISPOSABLE: u8 = 0x03;
    }
    /// PE32 executable section
    pub const PE32: u8 = 0x10;
    /// Position-independent code section
    pub const PIC: u8 = 0x11;
    /// Terse executable section
    pub const TE: u8 = 0x12;
    /// DXE dependency expression section
    pub const DXE_DEPEX: u8 = 0x13;
    /// Version information section
    pub const VERSION: u8 = 0x14;
    /// User interface string section
    pub const USER_INTERFACE: u8 = 0x15;
    /// Firmware volume image section
    pub const FIRMWARE_VOLUME_IMAGE: u8 = 0x17;
    /// Freeform GUID subtype section
    pub const FREEFORM_SUBTYPE_GUID: u8 = 0x18;
    /// Raw data section
    pub const RAW: u8 = 0x19;
    /// PEI dependency expression section
    pub const PEI_DEPEX: u8 = 0x1B;
}

bitflags::bitflags! {
    /// `Attributes` field of a GUID-defined section header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GuidedSectionAttributes: u16 {
        /// The section content must be processed by the decoder matching the section definition GUID before it can
        /// be used.
        const PROCESSING_REQUIRED = 0x0001;
        /// The section carries authentication information and the decoder reports a meaningful authentication
        /// status for it.
        const AUTH_STATUS_VALID = 0x0002;
    }
}

/// Section header layouts.
pub mod header {
    use r_efi::efi;

    /// EFI_COMMON_SECTION_HEADER per PI spec 1.8A 3.2.4.1
    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct CommonSectionHeaderStandard {
        /// Total section size including this header (24-bit, little endian).
        pub size: [u8; 3],
        /// Section type identifier
        pub section_type: u8,
    }

    /// EFI_COMMON_SECTION_HEADER2 per PI spec 1.8A 3.2.4.1
    ///
    /// Used when `size` holds [`EXTENDED_SIZE_SENTINEL`](super::EXTENDED_SIZE_SENTINEL).
    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct CommonSectionHeaderExtended {
        /// Always `0xFFFFFF`.
        pub size: [u8; 3],
        /// Section type identifier
        pub section_type: u8,
        /// Total section size including this header.
        pub extended_size: u32,
    }

    /// EFI_GUID_DEFINED_SECTION per PI spec 1.8A 3.2.5.7, excluding the common header.
    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct GuidDefined {
        /// GUID identifying the section format
        pub section_definition_guid: efi::Guid,
        /// Offset of the section data from the start of the section (common header included).
        pub data_offset: u16,
        /// See [`GuidedSectionAttributes`](super::GuidedSectionAttributes).
        pub attributes: u16,
        // Guid-specific header fields follow.
    }

    /// Guid-specific header of a CRC32 guided section (CRC32_SECTION_HEADER in EDK II).
    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct Crc32 {
        /// CRC32 of the section data.
        pub crc32_checksum: u32,
    }
}
