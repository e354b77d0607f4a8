//! Platform Initialization (PI) Specification definitions.
//!
//! Only the portions of the PI Specification needed to parse firmware file sections and to run guided section
//! extraction live here: section type constants and header layouts, well-known section definition GUIDs, the
//! Security Policy protocol identifier, and the authentication status word reported by section extraction.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod auth_status;
pub mod fw_fs;
pub mod protocols;

pub use auth_status::AuthenticationStatus;
