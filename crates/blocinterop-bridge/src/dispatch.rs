// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Classification of inbound calls on an adapter's channel.

use serde_json::Value;

use blocinterop_core::types::{CallbackId, MethodCall};

/// What an inbound call means to one adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundCall {
    /// The remote bloc pushed a new state to this adapter's callback.
    StateUpdate(Value),
    /// Any other method; handled elsewhere or not at all.
    Ignored { method: String },
}

impl InboundCall {
    pub fn classify(call: MethodCall, callback: &CallbackId) -> Self {
        if call.method == callback.as_str() {
            Self::StateUpdate(call.arguments)
        } else {
            Self::Ignored {
                method: call.method,
            }
        }
    }
}
