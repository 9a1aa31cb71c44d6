//! Core domain types for klient.
//!
//! This crate contains pure domain types with no IO, no threads, and minimal dependencies.
//! Everything here can be used from any layer of the client.

mod bindings;
mod drain;
mod signal;

pub use bindings::Bindings;
pub use drain::{DrainOutcome, StopMode};
pub use signal::{BoxError, Signal};
