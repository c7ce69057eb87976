// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed adapter for the remote counter bloc.

use serde::{Deserialize, Serialize};
use tracing::warn;

use blocinterop_bridge::{BlocAdapter, ChannelProvider};
use blocinterop_core::BridgeConfig;

/// Name the remote counter bloc is registered under.
pub const BLOC_NAME: &str = "counter";

/// State pushed by the remote counter bloc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterState {
    pub count: i64,
}

/// Events the remote counter bloc understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CounterEvent {
    Increment,
    Decrement,
    Reset,
}

pub struct CounterAdapter {
    adapter: BlocAdapter<CounterState>,
}

impl CounterAdapter {
    pub fn new(config: &BridgeConfig, provider: &dyn ChannelProvider) -> Self {
        Self {
            adapter: BlocAdapter::with_serde(config, BLOC_NAME, provider, CounterState::default()),
        }
    }

    pub fn initialize(&self) {
        self.adapter.initialize();
    }

    pub fn dispatch(&self, event: CounterEvent) {
        if let Err(e) = self.adapter.send_event(&event) {
            warn!(?event, error = %e, "counter event not sent");
        }
    }

    pub fn count(&self) -> i64 {
        self.adapter.current_state().count
    }

    pub fn close(&self) {
        self.adapter.close();
    }

    pub fn adapter(&self) -> &BlocAdapter<CounterState> {
        &self.adapter
    }
}
