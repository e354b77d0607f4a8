//! Register, get-info and decode flow through the registry with the shipped codecs.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use patina_ffs::{guided::GuidedSectionBuilder, FirmwareFileSystemError};
use patina_ffs_extractors::{
    install_default_codecs,
    platform::{Crc32Calculator, ProtocolLocator},
    Crc32GuidedSectionCodec,
};
use patina_pi::{
    fw_fs::{ffs::section::GuidedSectionAttributes, guid},
    protocols::security_policy,
    AuthenticationStatus,
};
use patina_section_extractor::GuidedSectionRegistry;
use r_efi::efi;

use super::{brotli_section, init_logger};

struct SecurityPolicyInstalled;

impl ProtocolLocator for SecurityPolicyInstalled {
    fn is_installed(&self, protocol: &efi::Guid) -> bool {
        *protocol == security_policy::PROTOCOL_GUID
    }
}

#[derive(Clone, Default)]
struct CountingCrc32(Arc<AtomicUsize>);

impl Crc32Calculator for CountingCrc32 {
    fn crc32(&self, data: &[u8]) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst);
        crc32fast::hash(data)
    }
}

fn registry() -> GuidedSectionRegistry {
    let registry = GuidedSectionRegistry::new();
    install_default_codecs(&registry).expect("default codecs should install");
    registry
}

#[test]
fn test_default_codecs_are_listed() {
    init_logger();
    let guids = registry().guids();
    assert_eq!(guids.len(), 2);
    assert!(guids.contains(&guid::CRC32_SECTION));
    assert!(guids.contains(&guid::BROTLI_SECTION));
}

#[test]
fn test_crc32_section_get_info_then_decode() {
    init_logger();
    let registry = registry();
    let payload: Vec<u8> = (0..36).collect();
    let input = Crc32GuidedSectionCodec::new().encode(&payload, GuidedSectionAttributes::PROCESSING_REQUIRED).unwrap();
    assert_eq!(input.len(), 64);

    let info = registry.get_info(&input).expect("get_info should succeed");
    assert_eq!(info.output_buffer_size, 36);
    assert_eq!(info.scratch_buffer_size, 0);

    let mut scratch = vec![0u8; info.scratch_buffer_size];
    let decoded = registry.decode_with_scratch(&input, &mut scratch).expect("decode should succeed");
    assert_eq!(decoded.data, &input[28..64]);
    assert_eq!(
        decoded.authentication_status,
        AuthenticationStatus::local_and_aggregate(AuthenticationStatus::IMAGE_SIGNED)
    );
}

#[test]
fn test_tampered_crc32_section_still_decodes() {
    init_logger();
    let registry = registry();
    let mut input =
        Crc32GuidedSectionCodec::new().encode(b"firmware volume", GuidedSectionAttributes::empty()).unwrap();
    input[30] ^= 0x01;

    let decoded = registry.decode(&input).expect("a checksum mismatch is not a decode failure");
    assert_eq!(decoded.data, &input[28..]);
    assert!(decoded.authentication_status.contains(AuthenticationStatus::TEST_FAILED));
    assert!(decoded.authentication_status.contains(AuthenticationStatus::LOCAL_TEST_FAILED));
}

// Trust boundary: an installed security policy protocol overrides the checksum, whatever the payload holds.
#[test]
fn test_security_policy_overrides_crc32_verification() {
    init_logger();
    let calls = CountingCrc32::default();
    let registry = GuidedSectionRegistry::new();
    let codec = Crc32GuidedSectionCodec::with_services(SecurityPolicyInstalled, calls.clone());
    registry.register_codec(guid::CRC32_SECTION, codec).unwrap();

    let mut input = Crc32GuidedSectionCodec::new().encode(b"untrusted", GuidedSectionAttributes::empty()).unwrap();
    input[24..28].copy_from_slice(&[0; 4]);

    let decoded = registry.decode(&input).unwrap();
    assert_eq!(decoded.data, b"untrusted");
    assert_eq!(
        decoded.authentication_status,
        AuthenticationStatus::local_and_aggregate(
            AuthenticationStatus::IMAGE_SIGNED | AuthenticationStatus::PLATFORM_OVERRIDE
        )
    );
    assert_eq!(calls.0.load(Ordering::SeqCst), 0);
}

#[test]
fn test_brotli_section_decodes_through_the_registry() {
    init_logger();
    let registry = registry();
    let input = brotli_section(b"compressed firmware file");

    let info = registry.get_info(&input).unwrap();
    assert_eq!(info.output_buffer_size, 24);
    assert_eq!(info.section_attribute, GuidedSectionAttributes::PROCESSING_REQUIRED);

    let decoded = registry.decode(&input).unwrap();
    assert_eq!(decoded.data, b"compressed firmware file");
    assert!(decoded.authentication_status.is_empty());
}

#[test]
fn test_unregistered_guid_is_invalid_parameter() {
    init_logger();
    let registry = registry();
    let unknown = efi::Guid::from_fields(0xEE4E5898, 0x3914, 0x4259, 0x9D, 0x6E, &[0xDC, 0x7B, 0xD7, 0x94, 0x03, 0xCF]);
    let input = GuidedSectionBuilder::new(unknown).build(b"lzma").unwrap();

    assert_eq!(registry.get_info(&input), Err(FirmwareFileSystemError::InvalidParameter));
    assert_eq!(registry.decode(&input), Err(FirmwareFileSystemError::InvalidParameter));
}

#[test]
fn test_codec_errors_are_forwarded() {
    init_logger();
    let registry = registry();
    let mut input = brotli_section(b"payload");
    // Claim a larger output than the stream produces.
    input[24..32].copy_from_slice(&64u64.to_le_bytes());

    assert_eq!(registry.decode(&input), Err(FirmwareFileSystemError::DataCorrupt));
}

#[test]
fn test_oversized_brotli_scratch_is_out_of_resources() {
    init_logger();
    let registry = registry();
    let mut input = brotli_section(b"payload");
    input[32..40].copy_from_slice(&(isize::MAX as u64 + 1).to_le_bytes());

    assert_eq!(registry.get_info(&input).unwrap().scratch_buffer_size, isize::MAX as usize + 1);
    assert_eq!(registry.decode(&input), Err(FirmwareFileSystemError::OutOfResources));
    assert_eq!(registry.decode_with_scratch(&input, &mut []), Err(FirmwareFileSystemError::BufferTooSmall));
}

#[test]
fn test_status_maps_to_efi_status() {
    init_logger();
    let registry = registry();
    let status: efi::Status = registry.get_info(&[]).map(|_| efi::Status::SUCCESS).unwrap_or_else(Into::into);
    assert_eq!(status, efi::Status::INVALID_PARAMETER);
}
