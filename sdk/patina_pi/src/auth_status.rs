//! Authentication Status
//!
//! Section extraction reports, next to every extracted buffer, a 32-bit authentication status word. Bits 0..=3
//! hold the *aggregate* status (accumulated over every encapsulation level the data passed through) and bits
//! 16..=19 hold the *local* status (reported by the innermost encapsulation only). Several bits may be set at the
//! same time, so "signed but not verified" is distinct from "unsigned".
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

const AGGREGATE_MASK: u32 = 0x0000_000F;
const LOCAL_SHIFT: u32 = 16;

bitflags::bitflags! {
    /// Authentication status reported with extracted section data.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AuthenticationStatus: u32 {
        /// Aggregate: the platform has overridden the integrity decision.
        const PLATFORM_OVERRIDE = 0x0000_0001;
        /// Aggregate: the data is signed.
        const IMAGE_SIGNED = 0x0000_0002;
        /// Aggregate: the signature was not tested.
        const NOT_TESTED = 0x0000_0004;
        /// Aggregate: the signature was tested and failed.
        const TEST_FAILED = 0x0000_0008;

        /// Local: the platform has overridden the integrity decision.
        const LOCAL_PLATFORM_OVERRIDE = Self::PLATFORM_OVERRIDE.bits() << LOCAL_SHIFT;
        /// Local: the data is signed.
        const LOCAL_IMAGE_SIGNED = Self::IMAGE_SIGNED.bits() << LOCAL_SHIFT;
        /// Local: the signature was not tested.
        const LOCAL_NOT_TESTED = Self::NOT_TESTED.bits() << LOCAL_SHIFT;
        /// Local: the signature was tested and failed.
        const LOCAL_TEST_FAILED = Self::TEST_FAILED.bits() << LOCAL_SHIFT;
    }
}

impl AuthenticationStatus {
    /// Sets `status` in both the local and the aggregate half of the word.
    ///
    /// Only the aggregate bits of `status` are considered.
    pub const fn local_and_aggregate(status: Self) -> Self {
        let aggregate = status.bits() & AGGREGATE_MASK;
        Self::from_bits_retain(aggregate | (aggregate << LOCAL_SHIFT))
    }

    /// The aggregate half of the status.
    pub const fn aggregate(self) -> Self {
        Self::from_bits_retain(self.bits() & AGGREGATE_MASK)
    }

    /// The local half of the status.
    pub const fn local(self) -> Self {
        Self::from_bits_retain(self.bits() & (AGGREGATE_MASK << LOCAL_SHIFT))
    }

    /// Status of data nested inside an encapsulation whose own status is `parent`.
    ///
    /// Local bits are kept from `self`; aggregate bits accumulate those of `parent`.
    pub const fn nested_in(self, parent: Self) -> Self {
        Self::from_bits_retain(self.bits() | parent.aggregate().bits())
    }

    /// Whether a signature was tested and failed at any level.
    pub const fn test_failed(self) -> bool {
        self.contains(Self::TEST_FAILED)
    }
}
