// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native-side mirror of one remote bloc.
//
// ## Protocol
//
// The remote bloc does not push state unless someone asked for it, so
// `initialize` opts in by registering a per-adapter callback name, installs
// the inbound handler for that name, and pulls the present state once.
// Afterwards every push to the callback name replaces the cached state and
// fans it out to the registered listeners.
//
// ## Failure model
//
// - A remote error on the initial pull keeps the constructor-supplied state.
// - A remote that does not implement `getCurrentState` is a build mismatch
//   between both sides and aborts.
// - A payload the decoder rejects aborts; the cache is never half-updated.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument, trace, warn};

use blocinterop_core::config::BridgeConfig;
use blocinterop_core::error::{InteropError, Result};
use blocinterop_core::types::{
    CallbackId, EventData, ListenerHandle, MethodCall, MethodResponse, methods,
};

use crate::dispatch::InboundCall;
use crate::registry::{Listener, ListenerRegistry};
use crate::traits::{ChannelProvider, MethodChannel};

/// Turns a raw state payload into the bloc's typed state.
pub type StateDecoder<S> = Box<dyn Fn(&Value) -> Result<S>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Initialized,
    Closed,
}

/// Mirrors the state of one remote bloc and notifies local listeners.
///
/// Cloning is cheap and yields another handle to the same adapter.
pub struct BlocAdapter<S> {
    inner: Rc<AdapterInner<S>>,
}

impl<S> Clone for BlocAdapter<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct AdapterInner<S> {
    bloc_name: String,
    callback_id: CallbackId,
    channel: Box<dyn MethodChannel>,
    decoder: StateDecoder<S>,
    log_outgoing_events: bool,
    state: RefCell<S>,
    last_updated: Cell<Option<DateTime<Utc>>>,
    listeners: RefCell<ListenerRegistry<S>>,
    lifecycle: Cell<Lifecycle>,
}

impl<S: Clone + 'static> BlocAdapter<S> {
    /// Create an adapter with the default bridge configuration.
    pub fn new(
        bloc_name: &str,
        provider: &dyn ChannelProvider,
        initial_state: S,
        decoder: impl Fn(&Value) -> Result<S> + 'static,
    ) -> Self {
        Self::with_config(
            &BridgeConfig::default(),
            bloc_name,
            provider,
            initial_state,
            decoder,
        )
    }

    /// Create an adapter. Opens the channel but sends nothing until
    /// [`initialize`](Self::initialize) is called.
    pub fn with_config(
        config: &BridgeConfig,
        bloc_name: &str,
        provider: &dyn ChannelProvider,
        initial_state: S,
        decoder: impl Fn(&Value) -> Result<S> + 'static,
    ) -> Self {
        let channel = provider.open_channel(&config.channel_name(bloc_name));
        let callback_id = CallbackId::generate(&config.callback_prefix);
        debug!(bloc = bloc_name, channel = channel.name(), %callback_id, "adapter created");

        Self {
            inner: Rc::new(AdapterInner {
                bloc_name: bloc_name.to_string(),
                callback_id,
                channel,
                decoder: Box::new(decoder),
                log_outgoing_events: config.log_outgoing_events,
                state: RefCell::new(initial_state),
                last_updated: Cell::new(None),
                listeners: RefCell::new(ListenerRegistry::new()),
                lifecycle: Cell::new(Lifecycle::Created),
            }),
        }
    }

    /// Subscribe to the remote bloc and pull its present state.
    ///
    /// Only the first call does anything. The pulled state arrives later
    /// through the channel's reply; until then (or forever, if the remote
    /// never answers) the initial state stays in place.
    #[instrument(skip_all, fields(bloc = %self.inner.bloc_name))]
    pub fn initialize(&self) {
        let inner = &self.inner;
        if inner.lifecycle.get() != Lifecycle::Created {
            trace!("initialize skipped");
            return;
        }
        inner.lifecycle.set(Lifecycle::Initialized);

        inner.channel.invoke_method(
            methods::REGISTER_CALLBACK,
            Value::String(inner.callback_id.to_string()),
        );

        let weak = Rc::downgrade(inner);
        inner
            .channel
            .set_method_call_handler(Some(Box::new(move |call: MethodCall| {
                match weak.upgrade() {
                    Some(inner) => inner.handle_inbound(call),
                    None => MethodResponse::NotImplemented,
                }
            })));

        let weak = Rc::downgrade(inner);
        inner.channel.invoke_method_with_reply(
            methods::GET_CURRENT_STATE,
            Value::Null,
            Box::new(move |response: MethodResponse| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_current_state(response);
                }
            }),
        );

        info!(callback_id = %inner.callback_id, "adapter initialized");
    }

    /// Forward an event to the remote bloc. Fire-and-forget.
    pub fn send(&self, data: EventData) {
        let inner = &self.inner;
        if inner.lifecycle.get() == Lifecycle::Closed {
            warn!(bloc = %inner.bloc_name, "adapter closed, dropping event");
            return;
        }
        if inner.log_outgoing_events {
            debug!(bloc = %inner.bloc_name, payload = ?data, "sending event");
        }
        inner
            .channel
            .invoke_method(methods::SEND_EVENT, Value::Object(data));
    }

    /// Serialize `event` and forward it with [`send`](Self::send).
    ///
    /// Fails with [`InteropError::NotAMapping`] unless the value serializes
    /// to a JSON object; nothing is sent in that case.
    pub fn send_event<E: Serialize>(&self, event: &E) -> Result<()> {
        match serde_json::to_value(event)? {
            Value::Object(data) => {
                self.send(data);
                Ok(())
            }
            _ => Err(InteropError::NotAMapping),
        }
    }

    /// The most recently delivered state.
    pub fn current_state(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// Register `callback` and immediately call it with the current state.
    pub fn listen(&self, callback: impl Fn(&S) + 'static) -> ListenerHandle {
        let listener: Listener<S> = Rc::new(callback);
        let handle = self
            .inner
            .listeners
            .borrow_mut()
            .insert(Rc::clone(&listener));
        let current = self.current_state();
        listener(&current);
        handle
    }

    /// Remove a listener. Unknown handles are ignored; returns whether the
    /// handle was registered.
    pub fn clear_listener(&self, handle: ListenerHandle) -> bool {
        self.inner.listeners.borrow_mut().remove(handle)
    }

    /// Release the remote registration and drop every listener.
    ///
    /// The cached state stays readable. Later pushes, late replies and
    /// `send` calls are ignored. Idempotent.
    #[instrument(skip_all, fields(bloc = %self.inner.bloc_name))]
    pub fn close(&self) {
        let inner = &self.inner;
        match inner.lifecycle.get() {
            Lifecycle::Closed => return,
            Lifecycle::Initialized => {
                inner.channel.invoke_method(
                    methods::UNREGISTER_CALLBACK,
                    Value::String(inner.callback_id.to_string()),
                );
                inner.channel.set_method_call_handler(None);
            }
            Lifecycle::Created => {}
        }
        inner.lifecycle.set(Lifecycle::Closed);
        inner.listeners.borrow_mut().clear();
        info!("adapter closed");
    }

    pub fn bloc_name(&self) -> &str {
        &self.inner.bloc_name
    }

    pub fn channel_name(&self) -> &str {
        self.inner.channel.name()
    }

    pub fn callback_id(&self) -> &CallbackId {
        &self.inner.callback_id
    }

    /// Whether the adapter is subscribed to the remote bloc right now.
    ///
    /// A closed adapter reports `false` even if it was initialized before
    /// closing; use [`is_closed`](Self::is_closed) to tell the two apart.
    pub fn is_initialized(&self) -> bool {
        self.inner.lifecycle.get() == Lifecycle::Initialized
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lifecycle.get() == Lifecycle::Closed
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// When the cached state was last replaced by the remote bloc.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inner.last_updated.get()
    }
}

impl<S> BlocAdapter<S> {
    /// A handle that does not keep the adapter alive.
    pub(crate) fn downgrade(&self) -> WeakAdapter<S> {
        WeakAdapter {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning adapter handle for values that unregister themselves on drop.
pub(crate) struct WeakAdapter<S> {
    inner: Weak<AdapterInner<S>>,
}

impl<S> WeakAdapter<S> {
    /// Remove `handle` if the adapter is still alive and its registry is not
    /// already being mutated further up the stack.
    pub(crate) fn clear_listener(&self, handle: ListenerHandle) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        match inner.listeners.try_borrow_mut() {
            Ok(mut listeners) => listeners.remove(handle),
            Err(_) => {
                warn!(bloc = %inner.bloc_name, %handle, "listener registry busy, leaving listener");
                false
            }
        }
    }
}

impl<S: Clone + DeserializeOwned + 'static> BlocAdapter<S> {
    /// Create an adapter whose state is decoded with `serde`.
    pub fn with_serde(
        config: &BridgeConfig,
        bloc_name: &str,
        provider: &dyn ChannelProvider,
        initial_state: S,
    ) -> Self {
        Self::with_config(config, bloc_name, provider, initial_state, |payload| {
            <S as Deserialize>::deserialize(payload).map_err(|e| InteropError::Decode(e.to_string()))
        })
    }
}

impl<S> std::fmt::Debug for BlocAdapter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = &self.inner;
        f.debug_struct("BlocAdapter")
            .field("bloc_name", &inner.bloc_name)
            .field("channel", &inner.channel.name())
            .field("callback_id", &inner.callback_id)
            .field("lifecycle", &inner.lifecycle.get())
            .field("listeners", &inner.listeners.borrow().len())
            .finish()
    }
}

impl<S: Clone + 'static> AdapterInner<S> {
    fn handle_inbound(&self, call: MethodCall) -> MethodResponse {
        if self.lifecycle.get() == Lifecycle::Closed {
            return MethodResponse::NotImplemented;
        }
        match InboundCall::classify(call, &self.callback_id) {
            InboundCall::StateUpdate(payload) => {
                self.apply_or_abort(&payload);
                MethodResponse::Success(Value::Null)
            }
            InboundCall::Ignored { method } => {
                trace!(bloc = %self.bloc_name, method = %method, "ignoring inbound call");
                MethodResponse::NotImplemented
            }
        }
    }

    fn handle_current_state(&self, response: MethodResponse) {
        if self.lifecycle.get() == Lifecycle::Closed {
            debug!(bloc = %self.bloc_name, "adapter closed, discarding state reply");
            return;
        }
        match response {
            MethodResponse::Success(payload) => self.apply_or_abort(&payload),
            MethodResponse::Error { code, message, .. } => {
                let err = InteropError::Remote {
                    method: methods::GET_CURRENT_STATE.to_string(),
                    code,
                    message: message.unwrap_or_default(),
                };
                debug!(bloc = %self.bloc_name, error = %err, "keeping current state");
            }
            MethodResponse::NotImplemented => {
                self.abort(InteropError::NotImplemented(
                    methods::GET_CURRENT_STATE.to_string(),
                ));
            }
        }
    }

    /// Decode, replace the cache, then notify. Nothing changes on error.
    fn apply_update(&self, payload: &Value) -> Result<()> {
        let state = (self.decoder)(payload)?;
        *self.state.borrow_mut() = state.clone();
        self.last_updated.set(Some(Utc::now()));

        let listeners = self.listeners.borrow().snapshot();
        debug!(bloc = %self.bloc_name, listeners = listeners.len(), "state updated");
        for (handle, listener) in listeners {
            // An earlier listener may have closed the adapter or cleared this one.
            if self.lifecycle.get() == Lifecycle::Closed {
                trace!(bloc = %self.bloc_name, "adapter closed during fan-out");
                break;
            }
            if !self.listeners.borrow().contains(handle) {
                continue;
            }
            listener(&state);
        }
        Ok(())
    }

    fn apply_or_abort(&self, payload: &Value) {
        if let Err(e) = self.apply_update(payload) {
            self.abort(e);
        }
    }

    fn abort(&self, err: InteropError) -> ! {
        error!(bloc = %self.bloc_name, error = %err, "unrecoverable bridge fault");
        panic!("bloc `{}`: {err}", self.bloc_name);
    }
}
