//! `rodio` implementation of the session's audio engine.
//!
//! Each binding owns a paused-at-open sink and a small reporter thread that
//! pushes position updates back over a channel.

mod engine;
mod reporter;
mod sink;

pub use engine::{RodioBinding, RodioEngine};

#[cfg(test)]
mod tests;
