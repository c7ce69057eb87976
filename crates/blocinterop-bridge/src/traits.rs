// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic channel abstractions.
//
// The embedding runtime delivers every inbound call, reply and handler
// invocation on a single dispatch context, so none of these types are
// `Send`. Implementations use `Rc`/`RefCell` for shared state.

use serde_json::Value;

use blocinterop_core::types::{MethodCall, MethodResponse};

/// Handler invoked for every inbound call on a channel.
pub type MethodCallHandler = Box<dyn Fn(MethodCall) -> MethodResponse>;

/// Completion callback for a request that expects a reply.
pub type ReplyCallback = Box<dyn FnOnce(MethodResponse)>;

/// A named, bidirectional call/response transport to one remote object.
pub trait MethodChannel {
    /// Fully-qualified channel address.
    fn name(&self) -> &str;

    /// Fire-and-forget call. At most once, no acknowledgment.
    fn invoke_method(&self, method: &str, arguments: Value);

    /// Call whose outcome is delivered later through `reply`. The reply may
    /// never arrive if the remote side does not answer.
    fn invoke_method_with_reply(&self, method: &str, arguments: Value, reply: ReplyCallback);

    /// Install (or with `None`, remove) the handler for inbound calls.
    /// Replaces any previously installed handler.
    fn set_method_call_handler(&self, handler: Option<MethodCallHandler>);
}

/// Capability to open named channels to the embedding runtime.
pub trait ChannelProvider {
    fn open_channel(&self, name: &str) -> Box<dyn MethodChannel>;
}
