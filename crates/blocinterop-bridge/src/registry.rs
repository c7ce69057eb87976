// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Listener registry for mirrored bloc state.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use blocinterop_core::types::ListenerHandle;

/// Callback invoked with every new state.
pub type Listener<S> = Rc<dyn Fn(&S)>;

/// Handle-keyed set of state listeners. Notification order is unspecified.
pub struct ListenerRegistry<S> {
    listeners: HashMap<ListenerHandle, Listener<S>>,
}

impl<S> Default for ListenerRegistry<S> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }
}

impl<S> std::fmt::Debug for ListenerRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl<S> ListenerRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener under a fresh handle.
    pub fn insert(&mut self, listener: Listener<S>) -> ListenerHandle {
        let handle = ListenerHandle::new();
        self.listeners.insert(handle, listener);
        debug!(%handle, "listener registered");
        handle
    }

    /// Remove a listener. Returns `true` if the handle was registered.
    pub fn remove(&mut self, handle: ListenerHandle) -> bool {
        let removed = self.listeners.remove(&handle).is_some();
        if removed {
            debug!(%handle, "listener removed");
        }
        removed
    }

    pub fn contains(&self, handle: ListenerHandle) -> bool {
        self.listeners.contains_key(&handle)
    }

    /// Clone out every listener with its handle so callers can notify
    /// without holding a borrow of the registry. Listeners may re-enter the
    /// adapter, so callers should check `contains` before each call.
    pub fn snapshot(&self) -> Vec<(ListenerHandle, Listener<S>)> {
        self.listeners
            .iter()
            .map(|(handle, listener)| (*handle, Rc::clone(listener)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
