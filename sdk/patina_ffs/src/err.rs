//! Error types and conversions for section parsing and extraction.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use core::fmt;
use r_efi::efi;

/// Error definitions for section parsing, guided section dispatch and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareFileSystemError {
    /// A parameter is invalid: an empty or malformed section, a null GUID, or a GUID no handler is registered for.
    InvalidParameter,
    /// A resource ran out: the handler registry is full, or an allocation failed.
    OutOfResources,
    /// The decoder does not support this variant of its format.
    Unsupported,
    /// The decoder could not make sense of the section payload.
    DataCorrupt,
    /// A caller-supplied buffer is smaller than the size reported by the get-info query.
    BufferTooSmall,
}

impl fmt::Display for FirmwareFileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirmwareFileSystemError::InvalidParameter => write!(f, "invalid parameter"),
            FirmwareFileSystemError::OutOfResources => write!(f, "out of resources"),
            FirmwareFileSystemError::Unsupported => write!(f, "unsupported"),
            FirmwareFileSystemError::DataCorrupt => write!(f, "section data is corrupt"),
            FirmwareFileSystemError::BufferTooSmall => write!(f, "buffer too small"),
        }
    }
}

impl core::error::Error for FirmwareFileSystemError {}

impl From<FirmwareFileSystemError> for efi::Status {
    fn from(value: FirmwareFileSystemError) -> Self {
        match value {
            FirmwareFileSystemError::InvalidParameter => efi::Status::INVALID_PARAMETER,
            FirmwareFileSystemError::OutOfResources => efi::Status::OUT_OF_RESOURCES,
            FirmwareFileSystemError::Unsupported => efi::Status::UNSUPPORTED,
            FirmwareFileSystemError::DataCorrupt => efi::Status::VOLUME_CORRUPTED,
            FirmwareFileSystemError::BufferTooSmall => efi::Status::BUFFER_TOO_SMALL,
        }
    }
}
