// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method channels on top of a raw binary messenger.
//
// An embedding host only needs to expose byte transport per channel name
// (`BinaryMessenger`). Framing of calls and replies is done here with the
// JSON method codec, so adapters see typed `MethodCall`/`MethodResponse`
// values regardless of the host.

use std::rc::Rc;

use serde_json::Value;
use tracing::{trace, warn};

use blocinterop_core::codec::JsonMethodCodec;
use blocinterop_core::types::{MethodCall, MethodResponse};

use crate::traits::{ChannelProvider, MethodCallHandler, MethodChannel, ReplyCallback};

/// Error code reported when a reply or inbound call cannot be decoded.
pub const MALFORMED_ENVELOPE: &str = "malformed-envelope";

/// Error code reported when an outbound request cannot be encoded.
pub const ENCODE_FAILED: &str = "encode-failed";

/// Completion for a binary request. Receives the raw reply bytes; an empty
/// reply means the receiver had no handler.
pub type BinaryReply = Box<dyn FnOnce(Vec<u8>)>;

/// Handler for inbound binary messages on one channel. Returns the reply.
pub type BinaryHandler = Box<dyn Fn(&[u8]) -> Vec<u8>>;

/// Byte-level transport exposed by the embedding runtime.
pub trait BinaryMessenger {
    /// Send `message` on `channel`. `reply`, if given, is invoked later with
    /// the receiver's answer.
    fn send(&self, channel: &str, message: Vec<u8>, reply: Option<BinaryReply>);

    /// Install or remove the handler for inbound messages on `channel`.
    fn set_message_handler(&self, channel: &str, handler: Option<BinaryHandler>);
}

/// [`MethodChannel`] that frames calls with [`JsonMethodCodec`].
pub struct MessengerChannel {
    name: String,
    messenger: Rc<dyn BinaryMessenger>,
}

impl MessengerChannel {
    pub fn new(name: &str, messenger: Rc<dyn BinaryMessenger>) -> Self {
        Self {
            name: name.to_string(),
            messenger,
        }
    }
}

impl MethodChannel for MessengerChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke_method(&self, method: &str, arguments: Value) {
        match JsonMethodCodec::encode_method_call(&MethodCall::new(method, arguments)) {
            Ok(bytes) => {
                trace!(channel = %self.name, method, bytes = bytes.len(), "sending call");
                self.messenger.send(&self.name, bytes, None);
            }
            Err(e) => {
                warn!(channel = %self.name, method, error = %e, "call failed to encode, dropped");
            }
        }
    }

    fn invoke_method_with_reply(&self, method: &str, arguments: Value, reply: ReplyCallback) {
        let bytes = match JsonMethodCodec::encode_method_call(&MethodCall::new(method, arguments)) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(channel = %self.name, method, error = %e, "request failed to encode");
                reply(MethodResponse::error(ENCODE_FAILED, e.to_string()));
                return;
            }
        };

        let channel = self.name.clone();
        let method = method.to_string();
        trace!(channel = %channel, method = %method, bytes = bytes.len(), "sending request");
        self.messenger.send(
            &self.name,
            bytes,
            Some(Box::new(move |raw: Vec<u8>| {
                let response = JsonMethodCodec::decode_response(&raw).unwrap_or_else(|e| {
                    warn!(channel = %channel, method = %method, error = %e, "undecodable reply");
                    MethodResponse::error(MALFORMED_ENVELOPE, e.to_string())
                });
                reply(response);
            })),
        );
    }

    fn set_method_call_handler(&self, handler: Option<MethodCallHandler>) {
        let channel = self.name.clone();
        let wrapped = handler.map(|handler| -> BinaryHandler {
            Box::new(move |bytes: &[u8]| {
                let response = match JsonMethodCodec::decode_method_call(bytes) {
                    Ok(call) => handler(call),
                    Err(e) => {
                        warn!(channel = %channel, error = %e, "undecodable inbound call");
                        MethodResponse::error(MALFORMED_ENVELOPE, e.to_string())
                    }
                };
                JsonMethodCodec::encode_response(&response).unwrap_or_else(|e| {
                    warn!(channel = %channel, error = %e, "reply failed to encode");
                    Vec::new()
                })
            })
        });
        self.messenger.set_message_handler(&self.name, wrapped);
    }
}

/// Opens [`MessengerChannel`]s on a shared messenger.
#[derive(Clone)]
pub struct MessengerProvider {
    messenger: Rc<dyn BinaryMessenger>,
}

impl MessengerProvider {
    pub fn new(messenger: Rc<dyn BinaryMessenger>) -> Self {
        Self { messenger }
    }
}

impl ChannelProvider for MessengerProvider {
    fn open_channel(&self, name: &str) -> Box<dyn MethodChannel> {
        Box::new(MessengerChannel::new(name, Rc::clone(&self.messenger)))
    }
}
