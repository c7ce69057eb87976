// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory channel for desktop/CI builds where no embedding runtime exists.
//
// Outbound calls are recorded instead of transmitted. Whoever plays the
// remote side drains them with `take_outbound`, answers pending requests with
// `reply`, and pushes inbound calls with `push`.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use blocinterop_core::types::{MethodCall, MethodResponse};

use crate::traits::{ChannelProvider, MethodCallHandler, MethodChannel, ReplyCallback};

/// A call sent from the native side toward the remote bloc.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundCall {
    pub method: String,
    pub arguments: Value,
    /// Whether the caller is waiting for a reply.
    pub awaits_reply: bool,
}

#[derive(Default)]
struct LoopbackState {
    log: Vec<OutboundCall>,
    undrained: usize,
    pending: VecDeque<(String, ReplyCallback)>,
    handler: Option<Rc<dyn Fn(MethodCall) -> MethodResponse>>,
}

/// Cheaply cloneable handle to one in-memory channel.
#[derive(Clone)]
pub struct LoopbackChannel {
    name: Rc<str>,
    state: Rc<RefCell<LoopbackState>>,
}

impl LoopbackChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            state: Rc::new(RefCell::new(LoopbackState::default())),
        }
    }

    /// Every call recorded so far, in send order.
    pub fn outbound(&self) -> Vec<OutboundCall> {
        self.state.borrow().log.clone()
    }

    /// Recorded calls for one method.
    pub fn calls_to(&self, method: &str) -> Vec<OutboundCall> {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    /// Calls recorded since the previous `take_outbound`.
    pub fn take_outbound(&self) -> Vec<OutboundCall> {
        let mut state = self.state.borrow_mut();
        let start = state.log.len() - state.undrained;
        state.undrained = 0;
        state.log[start..].to_vec()
    }

    /// Number of requests still waiting for a reply.
    pub fn pending_replies(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Answer the oldest pending request for `method`.
    /// Returns `false` if there was none.
    pub fn reply(&self, method: &str, response: MethodResponse) -> bool {
        let callback = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.pending.iter().position(|(m, _)| m == method) else {
                return false;
            };
            state.pending.remove(index).map(|(_, callback)| callback)
        };
        match callback {
            Some(callback) => {
                trace!(channel = %self.name, method, "delivering reply");
                callback(response);
                true
            }
            None => false,
        }
    }

    /// Deliver an inbound call to the installed handler.
    /// Returns `None` when no handler is installed.
    pub fn push(&self, method: &str, arguments: Value) -> Option<MethodResponse> {
        let handler = self.state.borrow().handler.clone()?;
        trace!(channel = %self.name, method, "delivering inbound call");
        Some(handler(MethodCall::new(method, arguments)))
    }

    pub fn has_handler(&self) -> bool {
        self.state.borrow().handler.is_some()
    }

    fn record(&self, method: &str, arguments: Value, awaits_reply: bool) {
        debug!(channel = %self.name, method, awaits_reply, "outbound call recorded");
        let mut state = self.state.borrow_mut();
        state.log.push(OutboundCall {
            method: method.to_string(),
            arguments,
            awaits_reply,
        });
        state.undrained += 1;
    }
}

impl MethodChannel for LoopbackChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke_method(&self, method: &str, arguments: Value) {
        self.record(method, arguments, false);
    }

    fn invoke_method_with_reply(&self, method: &str, arguments: Value, reply: ReplyCallback) {
        self.record(method, arguments, true);
        self.state
            .borrow_mut()
            .pending
            .push_back((method.to_string(), reply));
    }

    fn set_method_call_handler(&self, handler: Option<MethodCallHandler>) {
        self.state.borrow_mut().handler = handler.map(Rc::from);
    }
}

/// Hands out loopback channels and keeps them addressable by name.
#[derive(Default)]
pub struct LoopbackProvider {
    channels: RefCell<HashMap<String, LoopbackChannel>>,
}

impl LoopbackProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The channel opened under `name`, if any.
    pub fn channel(&self, name: &str) -> Option<LoopbackChannel> {
        self.channels.borrow().get(name).cloned()
    }
}

impl ChannelProvider for LoopbackProvider {
    fn open_channel(&self, name: &str) -> Box<dyn MethodChannel> {
        let channel = self
            .channels
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| LoopbackChannel::new(name))
            .clone();
        Box::new(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn records_calls_in_order() {
        let channel = LoopbackChannel::new("test/a");
        channel.invoke_method("registerCallback", json!("cb"));
        channel.invoke_method_with_reply(
            "getCurrentState",
            Value::Null,
            Box::new(|_: MethodResponse| {}),
        );

        let calls = channel.outbound();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, "registerCallback");
        assert!(!calls[0].awaits_reply);
        assert!(calls[1].awaits_reply);
        assert_eq!(channel.pending_replies(), 1);
    }

    #[test]
    fn take_outbound_drains_only_new_calls() {
        let channel = LoopbackChannel::new("test/a");
        channel.invoke_method("sendEvent", json!({"n": 1}));
        assert_eq!(channel.take_outbound().len(), 1);
        assert!(channel.take_outbound().is_empty());

        channel.invoke_method("sendEvent", json!({"n": 2}));
        let drained = channel.take_outbound();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].arguments, json!({"n": 2}));
        assert_eq!(channel.outbound().len(), 2);
    }

    #[test]
    fn reply_completes_matching_request_once() {
        let channel = LoopbackChannel::new("test/a");
        let got = Rc::new(Cell::new(false));
        let flag = Rc::clone(&got);
        channel.invoke_method_with_reply(
            "getCurrentState",
            Value::Null,
            Box::new(move |response: MethodResponse| flag.set(response.is_success())),
        );

        assert!(!channel.reply("somethingElse", MethodResponse::Success(Value::Null)));
        assert!(channel.reply("getCurrentState", MethodResponse::Success(json!(1))));
        assert!(got.get());
        assert!(!channel.reply("getCurrentState", MethodResponse::Success(json!(1))));
    }

    #[test]
    fn push_without_handler_is_none() {
        let channel = LoopbackChannel::new("test/a");
        assert!(channel.push("anything", Value::Null).is_none());

        channel.set_method_call_handler(Some(Box::new(|call: MethodCall| {
            MethodResponse::Success(json!(call.method))
        })));
        assert_eq!(
            channel.push("ping", Value::Null),
            Some(MethodResponse::Success(json!("ping")))
        );

        channel.set_method_call_handler(None);
        assert!(!channel.has_handler());
    }

    #[test]
    fn provider_returns_same_channel_per_name() {
        let provider = LoopbackProvider::new();
        let opened = provider.open_channel("test/a");
        opened.invoke_method("sendEvent", json!({}));

        let handle = provider.channel("test/a").expect("channel exists");
        assert_eq!(handle.outbound().len(), 1);
        assert!(provider.channel("test/b").is_none());
    }
}
