//! Weighted sampling over measured distributions.
//!
//! Two disciplines:
//! - with replacement: independent draws, probability proportional to count
//! - without replacement: an ordered set of distinct outcomes, each chosen
//!   from the weight that remains after earlier picks
//!
//! All randomness comes through [`RandomSource`], so a seeded or scripted
//! source makes every result reproducible.

pub mod draw;
pub mod source;
pub mod weighted;

pub use draw::{Draw, SampleSet};
pub use source::{RandomSource, SequenceSource, seeded_source};
pub use weighted::{
    SampleSizePolicy, Sampler, WeightedSampler, draw_with_replacement,
    draw_without_replacement,
};
