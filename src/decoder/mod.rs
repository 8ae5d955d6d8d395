//! Bit-group decoding: split a bitstring into contiguous groups and look
//! each group's value up in its own table (text lines, tone indices, pixel
//! intensities).

pub mod group;
pub mod table;

pub use group::GroupSpec;
pub use table::{Decoder, decode, group_values};
