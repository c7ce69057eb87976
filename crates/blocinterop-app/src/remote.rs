// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stand-in for the remote counter bloc, driven over a loopback channel.
//
// Mirrors what the UI runtime does on its side of the channel: remember the
// callback names adapters register, apply `sendEvent` payloads, answer
// `getCurrentState`, and push the new state to every registered callback.

use std::cell::{Cell, RefCell};

use serde_json::{Value, json};
use tracing::{debug, warn};

use blocinterop_bridge::LoopbackChannel;
use blocinterop_core::types::{MethodResponse, methods};

pub struct RemoteCounterBloc {
    channel: LoopbackChannel,
    count: Cell<i64>,
    callbacks: RefCell<Vec<String>>,
}

impl RemoteCounterBloc {
    pub fn attach(channel: LoopbackChannel) -> Self {
        Self {
            channel,
            count: Cell::new(0),
            callbacks: RefCell::new(Vec::new()),
        }
    }

    /// Handle every call the native side sent since the previous pump.
    /// Returns how many calls were processed.
    pub fn pump(&self) -> usize {
        let calls = self.channel.take_outbound();
        for call in &calls {
            match call.method.as_str() {
                methods::REGISTER_CALLBACK => {
                    if let Some(name) = call.arguments.as_str() {
                        debug!(callback = name, "remote: callback registered");
                        self.callbacks.borrow_mut().push(name.to_string());
                    }
                }
                methods::UNREGISTER_CALLBACK => {
                    if let Some(name) = call.arguments.as_str() {
                        debug!(callback = name, "remote: callback released");
                        self.callbacks.borrow_mut().retain(|cb| cb != name);
                    }
                }
                methods::GET_CURRENT_STATE => {
                    self.channel
                        .reply(methods::GET_CURRENT_STATE, MethodResponse::Success(self.message()));
                }
                methods::SEND_EVENT => {
                    if self.apply(&call.arguments) {
                        self.broadcast();
                    }
                }
                other => warn!(method = other, "remote: unknown method"),
            }
        }
        calls.len()
    }

    pub fn count(&self) -> i64 {
        self.count.get()
    }

    pub fn registered_callbacks(&self) -> usize {
        self.callbacks.borrow().len()
    }

    fn apply(&self, event: &Value) -> bool {
        let next = match event.get("type").and_then(Value::as_str) {
            Some("increment") => self.count.get() + 1,
            Some("decrement") => self.count.get() - 1,
            Some("reset") => 0,
            other => {
                warn!(event_type = ?other, "remote: unsupported event");
                return false;
            }
        };
        self.count.set(next);
        true
    }

    fn broadcast(&self) {
        let callbacks = self.callbacks.borrow().clone();
        for callback in callbacks {
            self.channel.push(&callback, self.message());
        }
    }

    fn message(&self) -> Value {
        json!({"count": self.count.get()})
    }
}
