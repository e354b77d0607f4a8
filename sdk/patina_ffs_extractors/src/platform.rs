//! Platform services consumed by guided section codecs.
//!
//! Codecs receive these services at construction time instead of reaching for global state, so a test can
//! substitute a double and observe exactly which services a decode consulted.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;
use r_efi::efi;

/// Reports whether a protocol is installed in the running environment.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait ProtocolLocator {
    /// Whether an instance of `protocol` is installed. Only presence is reported; the interface is never used.
    fn is_installed(&self, protocol: &efi::Guid) -> bool;
}

/// A [`ProtocolLocator`] for environments with no protocol database. Nothing is ever installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProtocolLocator;

impl ProtocolLocator for NullProtocolLocator {
    fn is_installed(&self, _protocol: &efi::Guid) -> bool {
        false
    }
}

/// Computes the CRC32 (IEEE 802.3) of a buffer.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait Crc32Calculator {
    /// CRC32 of `data`.
    fn crc32(&self, data: &[u8]) -> u32;
}

/// [`Crc32Calculator`] backed by `crc32fast`.
#[cfg(feature = "crc32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct Crc32FastCalculator;

#[cfg(feature = "crc32")]
impl Crc32Calculator for Crc32FastCalculator {
    fn crc32(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}
