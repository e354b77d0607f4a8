//! Module for Brotli guided sections.
//!
//! The payload of a Brotli guided section starts with two little-endian `u64` values, the decompressed size and
//! the scratch size the encoder recommends, followed by the Brotli stream.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::{boxed::Box, vec, vec::Vec};
use alloc_no_stdlib::{self, define_index_ops_mut, SliceWrapper, SliceWrapperMut};
use brotli_decompressor::{BrotliDecompressStream, BrotliResult, BrotliState, HuffmanCode};
use patina_ffs::{
    guided::{DecodedSection, GuidedSection, GuidedSectionCodec, GuidedSectionInfo},
    pool, FirmwareFileSystemError,
};
use patina_pi::{fw_fs::guid, AuthenticationStatus};

/// Size of the size prefix at the start of a Brotli guided section payload.
pub const BROTLI_PREFIX_SIZE: usize = 16;

//Rebox and HeapAllocator exist to satisfy BrotliDecompress custom allocation requirements.
//They essentially wrap Box for heap allocations.
struct Rebox<T>(Box<[T]>);

impl<T> core::default::Default for Rebox<T> {
    fn default() -> Self {
        Rebox(Vec::new().into_boxed_slice())
    }
}
define_index_ops_mut!(T, Rebox<T>);

impl<T> alloc_no_stdlib::SliceWrapper<T> for Rebox<T> {
    fn slice(&self) -> &[T] {
        &self.0
    }
}

impl<T> alloc_no_stdlib::SliceWrapperMut<T> for Rebox<T> {
    fn slice_mut(&mut self) -> &mut [T] {
        &mut self.0
    }
}

struct HeapAllocator<T: Clone> {
    pub default_value: T,
}

impl<T: Clone> alloc_no_stdlib::Allocator<T> for HeapAllocator<T> {
    type AllocatedMemory = Rebox<T>;
    fn alloc_cell(self: &mut HeapAllocator<T>, len: usize) -> Rebox<T> {
        Rebox(vec![self.default_value.clone(); len].into_boxed_slice())
    }
    fn free_cell(self: &mut HeapAllocator<T>, _data: Rebox<T>) {}
}

struct BrotliPrefix<'a> {
    output_size: usize,
    scratch_size: usize,
    stream: &'a [u8],
}

fn read_size(bytes: &[u8]) -> Result<usize, FirmwareFileSystemError> {
    let bytes: [u8; 8] = bytes.try_into().map_err(|_| FirmwareFileSystemError::InvalidParameter)?;
    usize::try_from(u64::from_le_bytes(bytes)).map_err(|_| FirmwareFileSystemError::InvalidParameter)
}

fn parse_prefix<'a>(section: &GuidedSection<'a>) -> Result<BrotliPrefix<'a>, FirmwareFileSystemError> {
    if section.guid() != &guid::BROTLI_SECTION {
        log::error!("Brotli codec invoked for a section tagged {:?}.", section.guid());
        Err(FirmwareFileSystemError::InvalidParameter)?;
    }

    let payload = section.payload();
    if payload.len() < BROTLI_PREFIX_SIZE {
        log::error!("Brotli section payload too short for its size prefix ({:#x} bytes).", payload.len());
        Err(FirmwareFileSystemError::InvalidParameter)?;
    }

    Ok(BrotliPrefix {
        output_size: read_size(&payload[0..8])?,
        scratch_size: read_size(&payload[8..16])?,
        stream: &payload[BROTLI_PREFIX_SIZE..],
    })
}

/// Provides decompression for Brotli guided sections.
///
/// Decompression draws its working memory from the heap, so the scratch buffer is only checked against the
/// `ScratchSize` in the payload prefix and never read. Both prefix sizes come from the section itself and are not
/// bounded here: [`GuidedSectionRegistry::decode`](patina_section_extractor::GuidedSectionRegistry::decode)
/// allocates whatever scratch size the prefix declares before decoding, and a size the heap cannot satisfy
/// surfaces as [`OutOfResources`](FirmwareFileSystemError::OutOfResources). Callers handling untrusted images that
/// need a tighter bound should check [`get_info`](GuidedSectionCodec::get_info) and call
/// [`decode_with_scratch`](patina_section_extractor::GuidedSectionRegistry::decode_with_scratch) themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrotliGuidedSectionCodec;

impl BrotliGuidedSectionCodec {
    /// Creates a new Brotli codec.
    pub const fn new() -> Self {
        Self
    }
}

impl GuidedSectionCodec for BrotliGuidedSectionCodec {
    fn get_info(&self, section: &GuidedSection<'_>) -> Result<GuidedSectionInfo, FirmwareFileSystemError> {
        let prefix = parse_prefix(section)?;
        Ok(GuidedSectionInfo {
            output_buffer_size: prefix.output_size,
            scratch_buffer_size: prefix.scratch_size,
            section_attribute: section.attributes(),
        })
    }

    fn decode(
        &self,
        section: &GuidedSection<'_>,
        scratch: &mut [u8],
    ) -> Result<DecodedSection, FirmwareFileSystemError> {
        let prefix = parse_prefix(section)?;
        if scratch.len() < prefix.scratch_size {
            log::error!("Brotli scratch buffer is {:#x} bytes, {:#x} required.", scratch.len(), prefix.scratch_size);
            Err(FirmwareFileSystemError::BufferTooSmall)?;
        }

        let mut out_data = pool::allocate_buffer(prefix.output_size)?;
        let mut brotli_state = BrotliState::new(
            HeapAllocator::<u8> { default_value: 0 },
            HeapAllocator::<u32> { default_value: 0 },
            HeapAllocator::<HuffmanCode> { default_value: Default::default() },
        );
        let mut out_data_size = 0;
        let result = BrotliDecompressStream(
            &mut prefix.stream.len(),
            &mut 0,
            prefix.stream,
            &mut out_data.len(),
            &mut 0,
            out_data.as_mut_slice(),
            &mut out_data_size,
            &mut brotli_state,
        );

        if !matches!(result, BrotliResult::ResultSuccess) || out_data_size != prefix.output_size {
            log::error!(
                "Brotli section failed to decompress: produced {:#x} of {:#x} bytes.",
                out_data_size,
                prefix.output_size
            );
            Err(FirmwareFileSystemError::DataCorrupt)?;
        }

        Ok(DecodedSection { data: out_data, authentication_status: AuthenticationStatus::empty() })
    }
}
