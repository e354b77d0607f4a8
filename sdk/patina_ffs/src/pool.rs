//! Pool allocation for section buffers.
//!
//! Section sizes come from untrusted headers, so buffers are reserved fallibly and an exhausted heap surfaces as
//! [`FirmwareFileSystemError::OutOfResources`] instead of an abort. Buffers are released by dropping them.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;

use crate::FirmwareFileSystemError;

/// Allocates a zero-filled buffer of `size` bytes.
pub fn allocate_buffer(size: usize) -> Result<Vec<u8>, FirmwareFileSystemError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(size).map_err(|_| {
        log::error!("Failed to allocate a {:#x} byte section buffer.", size);
        FirmwareFileSystemError::OutOfResources
    })?;
    buffer.resize(size, 0);
    Ok(buffer)
}

/// Allocates a buffer holding a copy of `data`.
pub fn allocate_copy(data: &[u8]) -> Result<Vec<u8>, FirmwareFileSystemError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(data.len()).map_err(|_| {
        log::error!("Failed to allocate a {:#x} byte section buffer.", data.len());
        FirmwareFileSystemError::OutOfResources
    })?;
    buffer.extend_from_slice(data);
    Ok(buffer)
}
