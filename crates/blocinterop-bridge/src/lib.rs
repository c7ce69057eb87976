// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bloc interop — native-side bridge to remote blocs.
//
// A `BlocAdapter` mirrors one remote bloc over a `MethodChannel`. Channels come
// from a `ChannelProvider`: `MessengerProvider` frames calls for a host's
// binary messenger, `LoopbackProvider` keeps everything in memory for desktop
// builds and tests.
//
// Everything here runs on the host's single dispatch context; no type is
// `Send`.

pub mod adapter;
pub mod dispatch;
pub mod loopback;
pub mod messenger;
pub mod registry;
pub mod stream;
pub mod traits;

pub use adapter::{BlocAdapter, StateDecoder};
pub use dispatch::InboundCall;
pub use loopback::{LoopbackChannel, LoopbackProvider, OutboundCall};
pub use messenger::{BinaryMessenger, MessengerChannel, MessengerProvider};
pub use registry::ListenerRegistry;
pub use stream::StateStream;
pub use traits::{ChannelProvider, MethodCallHandler, MethodChannel, ReplyCallback};
