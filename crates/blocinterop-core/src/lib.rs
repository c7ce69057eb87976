// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bloc interop — core types, errors, configuration and the JSON method codec
// shared by the bridge and the host binaries.

pub mod codec;
pub mod config;
pub mod error;
pub mod types;

pub use codec::JsonMethodCodec;
pub use config::BridgeConfig;
pub use error::InteropError;
pub use types::*;
