// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the bridge hot paths: reply decoding and the
// state-update fan-out to listeners.

use std::cell::Cell;
use std::rc::Rc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde::Deserialize;
use serde_json::json;

use blocinterop_bridge::{BlocAdapter, LoopbackProvider};
use blocinterop_core::{BridgeConfig, JsonMethodCodec};

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
struct TodoState {
    items: Vec<String>,
    filter: String,
}

fn payload() -> serde_json::Value {
    let items: Vec<String> = (0..50).map(|i| format!("item {i}")).collect();
    json!({"items": items, "filter": "all"})
}

/// Decode a 50-item success envelope.
fn bench_decode_reply(c: &mut Criterion) {
    let envelope = serde_json::to_vec(&json!([payload()])).expect("encode");

    c.bench_function("decode_response (50 items)", |b| {
        b.iter(|| black_box(JsonMethodCodec::decode_response(black_box(&envelope))));
    });
}

/// Push one update through an adapter with 16 listeners.
fn bench_state_fanout(c: &mut Criterion) {
    let provider = LoopbackProvider::new();
    let config = BridgeConfig::default();
    let adapter = BlocAdapter::with_serde(
        &config,
        "todos",
        &provider,
        TodoState {
            items: Vec::new(),
            filter: "all".into(),
        },
    );
    adapter.initialize();

    let hits = Rc::new(Cell::new(0usize));
    for _ in 0..16 {
        let hits = Rc::clone(&hits);
        adapter.listen(move |state: &TodoState| hits.set(hits.get() + state.items.len()));
    }

    let channel = provider
        .channel(&config.channel_name("todos"))
        .expect("channel opened");
    let callback = adapter.callback_id().to_string();
    let update = payload();

    c.bench_function("state update fan-out (16 listeners)", |b| {
        b.iter(|| channel.push(&callback, black_box(update.clone())));
    });
}

criterion_group!(benches, bench_decode_reply, bench_state_fanout);
criterion_main!(benches);
