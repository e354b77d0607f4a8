//! Guided Section Extraction
//!
//! Provides [`GuidedSectionRegistry`], a bounded table mapping section definition GUIDs to
//! [`GuidedSectionCodec`](patina_ffs::guided::GuidedSectionCodec) implementations, and the dispatch operations that
//! route a GUID-defined section to its codec without knowing what the codec does.
//!
//! ## Example
//!
//! ```rust
//! use patina_ffs::{
//!     guided::{DecodedSection, GuidedSection, GuidedSectionBuilder, GuidedSectionCodec, GuidedSectionInfo},
//!     FirmwareFileSystemError,
//! };
//! use patina_pi::AuthenticationStatus;
//! use patina_section_extractor::GuidedSectionRegistry;
//! use r_efi::efi;
//!
//! struct Identity;
//!
//! impl GuidedSectionCodec for Identity {
//!     fn get_info(&self, section: &GuidedSection<'_>) -> Result<GuidedSectionInfo, FirmwareFileSystemError> {
//!         Ok(GuidedSectionInfo {
//!             output_buffer_size: section.payload().len(),
//!             scratch_buffer_size: 0,
//!             section_attribute: section.attributes(),
//!         })
//!     }
//!
//!     fn decode(
//!         &self,
//!         section: &GuidedSection<'_>,
//!         _scratch: &mut [u8],
//!     ) -> Result<DecodedSection, FirmwareFileSystemError> {
//!         let data = section.payload().to_vec();
//!         Ok(DecodedSection { data, authentication_status: AuthenticationStatus::empty() })
//!     }
//! }
//!
//! let guid = efi::Guid::from_fields(0x1, 0x2, 0x3, 0x4, 0x5, &[0x6; 6]);
//! let registry = GuidedSectionRegistry::new();
//! registry.register_codec(guid, Identity).unwrap();
//!
//! let section = GuidedSectionBuilder::new(guid).build(b"payload").unwrap();
//! assert_eq!(registry.get_info(&section).unwrap().output_buffer_size, 7);
//! assert_eq!(registry.decode(&section).unwrap().data, b"payload");
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

mod dispatch;
mod registry;
mod stream;

pub use registry::GuidedSectionRegistry;
pub use stream::{ExtractedSection, MAX_NESTING_DEPTH};
