//! Nested section stream extraction with authentication status propagation.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent

use patina_ffs::guided::GuidedSectionBuilder;
use patina_ffs_extractors::{install_default_codecs, Crc32GuidedSectionCodec};
use patina_pi::{
    fw_fs::ffs::section::{raw_type, GuidedSectionAttributes},
    AuthenticationStatus,
};
use patina_section_extractor::GuidedSectionRegistry;
use r_efi::efi;

use super::{brotli_section, init_logger, leaf, section_stream};

fn registry() -> GuidedSectionRegistry {
    let registry = GuidedSectionRegistry::new();
    install_default_codecs(&registry).expect("default codecs should install");
    registry
}

#[test]
fn test_crc32_wrapped_brotli_stream() {
    init_logger();
    let inner = section_stream(&[leaf(raw_type::PE32, b"driver image"), leaf(raw_type::USER_INTERFACE, b"Driver")]);
    let compressed = brotli_section(&inner);
    let input =
        Crc32GuidedSectionCodec::new().encode(&compressed, GuidedSectionAttributes::PROCESSING_REQUIRED).unwrap();

    let sections = registry().extract_sections(&input).unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].section_type, raw_type::PE32);
    assert_eq!(sections[0].data, b"driver image");
    assert_eq!(sections[1].section_type, raw_type::USER_INTERFACE);
    assert_eq!(sections[1].data, b"Driver");

    // Brotli carries no signature of its own, so only the aggregate bits of the CRC32 wrapper remain.
    for section in &sections {
        assert!(section.authentication_status.local().is_empty());
        assert_eq!(section.authentication_status.aggregate(), AuthenticationStatus::IMAGE_SIGNED);
    }
}

#[test]
fn test_failed_outer_checksum_reaches_every_nested_section() {
    init_logger();
    let codec = Crc32GuidedSectionCodec::new();
    let inner_crc = codec.encode(&leaf(raw_type::RAW, b"inner"), GuidedSectionAttributes::empty()).unwrap();
    let mut input = codec
        .encode(&section_stream(&[leaf(raw_type::RAW, b"outer"), inner_crc]), GuidedSectionAttributes::empty())
        .unwrap();
    input[24..28].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

    let sections = registry().extract_sections(&input).unwrap();
    assert_eq!(sections.len(), 2);

    assert_eq!(sections[0].data, b"outer");
    assert_eq!(
        sections[0].authentication_status,
        AuthenticationStatus::local_and_aggregate(
            AuthenticationStatus::IMAGE_SIGNED | AuthenticationStatus::TEST_FAILED
        )
    );

    assert_eq!(sections[1].data, b"inner");
    assert_eq!(sections[1].authentication_status.local(), AuthenticationStatus::LOCAL_IMAGE_SIGNED);
    assert!(sections[1].authentication_status.test_failed());
}

#[test]
fn test_unknown_guid_stream_without_processing_is_walked() {
    init_logger();
    let vendor = efi::Guid::from_fields(0x1D1E2F30, 0x4152, 0x6374, 0x85, 0x96, &[0xA7, 0xB8, 0xC9, 0xDA, 0xEB, 0xFC]);
    let input = section_stream(&[
        GuidedSectionBuilder::new(vendor)
            .attributes(GuidedSectionAttributes::AUTH_STATUS_VALID)
            .build(&leaf(raw_type::RAW, b"vendor data"))
            .unwrap(),
        GuidedSectionBuilder::new(vendor)
            .attributes(GuidedSectionAttributes::PROCESSING_REQUIRED)
            .build(b"encrypted")
            .unwrap(),
        leaf(raw_type::RAW, b"trailer"),
    ]);

    let sections = registry().extract_sections(&input).unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].data, b"vendor data");
    assert_eq!(
        sections[0].authentication_status,
        AuthenticationStatus::local_and_aggregate(AuthenticationStatus::IMAGE_SIGNED | AuthenticationStatus::NOT_TESTED)
    );
    assert_eq!(sections[1].data, b"trailer");
    assert!(sections[1].authentication_status.is_empty());
}
