//! Security Policy Protocol
//!
//! The protocol carries no interface. A platform installs it to declare that it takes over the integrity decision
//! for guided sections, and section decoders treat its presence as a platform override.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use r_efi::efi;

/// Security Policy Protocol GUID (`78E4D245-CD4D-4A05-A2BA-4743E86CFCAB`).
pub const PROTOCOL_GUID: efi::Guid =
    efi::Guid::from_fields(0x78E4D245, 0xCD4D, 0x4A05, 0xA2, 0xBA, &[0x47, 0x43, 0xE8, 0x6C, 0xFC, 0xAB]);
