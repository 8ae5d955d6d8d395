//! Measurement sampling and playback engine.
//!
//! Takes empirical bitstring distributions measured on quantum hardware,
//! draws outcomes by their observed frequency, decodes each draw into text,
//! pixels and tones, and plays the draws back on a fixed schedule.

pub mod audio;
pub mod baseline;
pub mod dataset;
pub mod decoder;
pub mod distribution;
pub mod error;
pub mod playback;
pub mod sampling;
pub mod selector;
pub mod ui;
pub mod utils;

pub use error::{EngineError, Result};
