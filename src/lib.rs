//! Honeycomb Stack (workspace facade crate).
//!
//! Re-exports the workspace crates under one path, `honeycomb_stack::{core,engine,types}`,
//! and hosts the headless autoplay runner used by the `honeycomb-autoplay` binary.

pub mod autoplay;

pub use honeycomb_core as core;
pub use honeycomb_engine as engine;
pub use honeycomb_types as types;
