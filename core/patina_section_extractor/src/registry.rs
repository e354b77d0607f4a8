//! Guided section handler registry.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::{sync::Arc, vec::Vec};

use patina_ffs::{guided::GuidedSectionCodec, FirmwareFileSystemError};
use r_efi::efi;

const NULL_GUID: efi::Guid = efi::Guid::from_fields(0, 0, 0, 0, 0, &[0; 6]);

struct Entry {
    guid: efi::Guid,
    codec: Arc<dyn GuidedSectionCodec>,
}

/// A bounded table of guided section codecs keyed by section definition GUID.
///
/// Each GUID appears at most once. Registering a GUID that is already present replaces its codec in place, and a
/// new GUID is only accepted while fewer than [`max_handlers`](Self::max_handlers) entries exist.
///
/// The table is guarded by a spin lock that is held only while the table itself is read or written. Codecs are
/// invoked after the lock is released, so a codec may register further codecs while it decodes.
pub struct GuidedSectionRegistry {
    max_handlers: usize,
    entries: spin::Mutex<Vec<Entry>>,
}

impl GuidedSectionRegistry {
    /// Capacity of a registry created with [`new`](Self::new).
    pub const DEFAULT_MAX_HANDLERS: usize = 16;

    /// Creates an empty registry holding at most [`DEFAULT_MAX_HANDLERS`](Self::DEFAULT_MAX_HANDLERS) codecs.
    pub const fn new() -> Self {
        Self::with_max_handlers(Self::DEFAULT_MAX_HANDLERS)
    }

    /// Creates an empty registry holding at most `max_handlers` codecs.
    pub const fn with_max_handlers(max_handlers: usize) -> Self {
        Self { max_handlers, entries: spin::Mutex::new(Vec::new()) }
    }

    /// Registers `codec` as the handler for sections tagged with `guid`.
    ///
    /// Re-registering a GUID replaces its codec without consuming capacity.
    ///
    /// ## Errors
    ///
    /// - [`InvalidParameter`](FirmwareFileSystemError::InvalidParameter) if `guid` is the all-zero GUID.
    /// - [`OutOfResources`](FirmwareFileSystemError::OutOfResources) if `guid` is new and the registry is full.
    pub fn register(&self, guid: efi::Guid, codec: Arc<dyn GuidedSectionCodec>) -> Result<(), FirmwareFileSystemError> {
        if guid == NULL_GUID {
            log::error!("Refusing to register a guided section handler for the null GUID.");
            Err(FirmwareFileSystemError::InvalidParameter)?;
        }

        let mut entries = self.entries.lock();
        if let Some(entry) = entries.iter_mut().find(|entry| entry.guid == guid) {
            log::debug!("Replacing guided section handler for {:?}.", guid);
            entry.codec = codec;
            return Ok(());
        }

        if entries.len() >= self.max_handlers {
            log::error!(
                "Guided section registry is full ({} handlers); cannot register {:?}.",
                self.max_handlers,
                guid
            );
            Err(FirmwareFileSystemError::OutOfResources)?;
        }

        entries.try_reserve(1).map_err(|_| FirmwareFileSystemError::OutOfResources)?;
        entries.push(Entry { guid, codec });
        log::info!("Registered guided section handler for {:?} ({}/{}).", guid, entries.len(), self.max_handlers);
        Ok(())
    }

    /// Registers an owned codec. See [`register`](Self::register).
    pub fn register_codec<C>(&self, guid: efi::Guid, codec: C) -> Result<(), FirmwareFileSystemError>
    where
        C: GuidedSectionCodec + 'static,
    {
        self.register(guid, Arc::new(codec))
    }

    /// The codec registered for `guid`, if any.
    pub fn handler(&self, guid: &efi::Guid) -> Option<Arc<dyn GuidedSectionCodec>> {
        self.entries.lock().iter().find(|entry| entry.guid == *guid).map(|entry| Arc::clone(&entry.codec))
    }

    /// Whether a codec is registered for `guid`.
    pub fn contains(&self, guid: &efi::Guid) -> bool {
        self.entries.lock().iter().any(|entry| entry.guid == *guid)
    }

    /// The registered GUIDs, in registration order.
    pub fn guids(&self) -> Vec<efi::Guid> {
        self.entries.lock().iter().map(|entry| entry.guid).collect()
    }

    /// Number of registered codecs.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no codec is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of codecs the registry accepts.
    pub fn max_handlers(&self) -> usize {
        self.max_handlers
    }
}

impl Default for GuidedSectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for GuidedSectionRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GuidedSectionRegistry")
            .field("max_handlers", &self.max_handlers)
            .field("guids", &self.guids())
            .finish()
    }
}
