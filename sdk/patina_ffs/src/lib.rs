//! Support for Firmware File System sections as described in the UEFI Platform
//! Initialization Specification.
//!
//! This crate parses firmware file sections (both the standard 24-bit size layout and the extended "Section2"
//! layout) into normalized headers, walks section streams, composes sections back into bytes, and defines the
//! [`GuidedSectionCodec`](guided::GuidedSectionCodec) interface implemented by GUID-defined section decoders.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod err;
pub mod guided;
pub mod pool;
pub mod section;

pub use err::FirmwareFileSystemError;
