//! The wave renderer as a real render module.
//!
//! `cargo build --release --target wasm32-unknown-unknown` produces a module the host drives with
//! the default `HostConfig`.

use test_common::WaveRenderer;

render_wasmer_guest::render_exports!(WaveRenderer, WaveRenderer);
