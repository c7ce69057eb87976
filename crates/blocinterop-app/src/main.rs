// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bloc interop demo host.
//
// Entry point. Initialises logging and config, then mirrors a counter bloc
// over a loopback channel whose far end is played by `RemoteCounterBloc`.

mod config_file;
mod counter;
mod remote;

use tokio::task::LocalSet;
use tracing::{error, info};

use blocinterop_bridge::LoopbackProvider;
use blocinterop_core::BridgeConfig;

use counter::{BLOC_NAME, CounterAdapter, CounterEvent};
use remote::RemoteCounterBloc;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("blocinterop demo starting");

    let config = config_file::load_or_default();

    // Channels, handlers and adapters are !Send; keep them on one task set.
    LocalSet::new().run_until(run(config)).await;
}

async fn run(config: BridgeConfig) {
    let provider = LoopbackProvider::new();
    let counter = CounterAdapter::new(&config, &provider);
    let Some(channel) = provider.channel(&config.channel_name(BLOC_NAME)) else {
        error!(bloc = BLOC_NAME, "loopback channel was not opened");
        return;
    };
    let remote = RemoteCounterBloc::attach(channel);

    let listener = counter
        .adapter()
        .listen(|state| info!(count = state.count, "listener saw state"));

    let mut stream = counter.adapter().stream();
    let printer = tokio::task::spawn_local(async move {
        let mut seen = Vec::new();
        while let Some(state) = stream.next().await {
            seen.push(state.count);
        }
        seen
    });

    counter.initialize();
    remote.pump();

    for event in [
        CounterEvent::Increment,
        CounterEvent::Increment,
        CounterEvent::Decrement,
        CounterEvent::Increment,
    ] {
        counter.dispatch(event);
        remote.pump();
        tokio::task::yield_now().await;
    }

    counter.adapter().clear_listener(listener);
    counter.close();
    remote.pump();

    match printer.await {
        Ok(seen) => info!(?seen, "stream drained"),
        Err(e) => error!(error = %e, "stream task failed"),
    }

    info!(
        local = counter.count(),
        remote = remote.count(),
        registrations = remote.registered_callbacks(),
        "demo finished"
    );
}
