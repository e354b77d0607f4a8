//! Well-known section definition GUIDs.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use r_efi::efi;

/// GUID-defined section whose payload is protected by a CRC32 checksum stored in the guid-specific header.
///
/// (`FC1BCDB0-7D31-49AA-936A-A4600D9DD083`)
pub const CRC32_SECTION: efi::Guid =
    efi::Guid::from_fields(0xFC1BCDB0, 0x7D31, 0x49aa, 0x93, 0x6A, &[0xA4, 0x60, 0x0D, 0x9D, 0xD0, 0x83]);

/// GUID-defined section whose payload is a Brotli compressed section stream.
///
/// (`3D532050-5CDA-4FD0-879E-0F7F630D5AFB`)
pub const BROTLI_SECTION: efi::Guid =
    efi::Guid::from_fields(0x3D532050, 0x5CDA, 0x4FD0, 0x87, 0x9E, &[0x0F, 0x7F, 0x63, 0x0D, 0x5A, 0xFB]);
