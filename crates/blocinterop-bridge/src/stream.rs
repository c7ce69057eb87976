// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async view of an adapter's state updates.

use tokio::sync::mpsc;
use tracing::trace;

use blocinterop_core::types::ListenerHandle;

use crate::adapter::{BlocAdapter, WeakAdapter};

/// Receives every state delivered to one listener, starting with the state
/// that was current when the stream was created.
///
/// The stream ends once its listener is cleared (or the adapter is closed
/// or dropped) and the buffered states have been consumed. Dropping the
/// stream clears its listener.
pub struct StateStream<S> {
    handle: ListenerHandle,
    receiver: mpsc::UnboundedReceiver<S>,
    adapter: WeakAdapter<S>,
}

impl<S> StateStream<S> {
    /// Handle of the backing listener, for `clear_listener`.
    pub fn handle(&self) -> ListenerHandle {
        self.handle
    }

    /// Next delivered state, or `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<S> {
        self.receiver.recv().await
    }

    /// Next state if one is already buffered.
    pub fn try_next(&mut self) -> Option<S> {
        self.receiver.try_recv().ok()
    }
}

impl<S> Drop for StateStream<S> {
    fn drop(&mut self) {
        if self.adapter.clear_listener(self.handle) {
            trace!(handle = %self.handle, "stream dropped, listener cleared");
        }
    }
}

impl<S> std::fmt::Debug for StateStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStream")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl<S: Clone + 'static> BlocAdapter<S> {
    /// Register a listener that feeds a [`StateStream`].
    pub fn stream(&self) -> StateStream<S> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = self.listen(move |state: &S| {
            // Fails only if the stream was dropped while the registry was busy.
            let _ = sender.send(state.clone());
        });
        StateStream {
            handle,
            receiver,
            adapter: self.downgrade(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackProvider;
    use blocinterop_core::config::BridgeConfig;
    use blocinterop_core::types::{MethodResponse, methods};
    use serde_json::{Value, json};

    fn adapter(provider: &LoopbackProvider) -> BlocAdapter<i64> {
        BlocAdapter::new("numbers", provider, 0, |payload: &Value| {
            payload
                .as_i64()
                .ok_or_else(|| blocinterop_core::InteropError::Decode("not a number".into()))
        })
    }

    #[tokio::test]
    async fn stream_starts_with_current_state_then_follows_updates() {
        let provider = LoopbackProvider::new();
        let adapter = adapter(&provider);
        let channel = provider
            .channel(&BridgeConfig::default().channel_name("numbers"))
            .expect("channel opened");
        adapter.initialize();

        let mut stream = adapter.stream();
        channel.reply(methods::GET_CURRENT_STATE, MethodResponse::Success(json!(4)));
        channel.push(adapter.callback_id().as_str(), json!(5));

        assert_eq!(stream.next().await, Some(0));
        assert_eq!(stream.next().await, Some(4));
        assert_eq!(stream.next().await, Some(5));
        assert_eq!(stream.try_next(), None);
    }

    #[tokio::test]
    async fn stream_ends_after_listener_is_cleared() {
        let provider = LoopbackProvider::new();
        let adapter = adapter(&provider);

        let mut stream = adapter.stream();
        assert!(adapter.clear_listener(stream.handle()));

        assert_eq!(stream.next().await, Some(0));
        assert_eq!(stream.next().await, None);
    }

    #[test]
    fn dropped_streams_leave_no_listeners() {
        let provider = LoopbackProvider::new();
        let adapter = adapter(&provider);
        adapter.initialize();

        for _ in 0..100 {
            drop(adapter.stream());
        }
        assert_eq!(adapter.listener_count(), 0);

        let kept = adapter.stream();
        drop(adapter.stream());
        assert_eq!(adapter.listener_count(), 1);
        assert!(adapter.clear_listener(kept.handle()));
    }

    #[test]
    fn stream_may_outlive_its_adapter() {
        let provider = LoopbackProvider::new();
        let adapter = adapter(&provider);
        let mut stream = adapter.stream();
        drop(adapter);

        assert_eq!(stream.try_next(), Some(0));
        drop(stream);
    }

    #[tokio::test]
    async fn stream_ends_when_adapter_closes() {
        let provider = LoopbackProvider::new();
        let adapter = adapter(&provider);
        adapter.initialize();

        let mut stream = adapter.stream();
        adapter.close();

        assert_eq!(stream.next().await, Some(0));
        assert_eq!(stream.next().await, None);
    }
}
