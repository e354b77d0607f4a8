//! Platform Initialization Protocols
//!
//! Each protocol in the PI Specification is maintained as a separate module.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

pub mod security_policy;
