// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire-level types exchanged with the remote bloc.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Method names understood by the remote bloc.
pub mod methods {
    /// One-way: tells the bloc which method name to push state updates to.
    pub const REGISTER_CALLBACK: &str = "registerCallback";
    /// One-way: releases a previous registration.
    pub const UNREGISTER_CALLBACK: &str = "unregisterCallback";
    /// One-way: forwards a native event to the bloc.
    pub const SEND_EVENT: &str = "sendEvent";
    /// Request/response: pulls the bloc's present state.
    pub const GET_CURRENT_STATE: &str = "getCurrentState";
}

/// String-keyed event payload. Only mappings round-trip predictably through
/// the JSON codec, so events are restricted to them.
pub type EventData = Map<String, Value>;

/// Method name the remote bloc uses when pushing state to one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackId(String);

impl CallbackId {
    /// Generate a fresh identifier, `<prefix>-<uuid v4>`.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Subscription handle returned by `listen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerHandle(pub Uuid);

impl ListenerHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single call travelling over a method channel, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(rename = "args", default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Outcome of a method call as reported by the receiving side.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Error {
        code: String,
        message: Option<String>,
        details: Value,
    },
    /// The receiver has no handler for the method.
    NotImplemented,
}

impl MethodResponse {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: Some(message.into()),
            details: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
