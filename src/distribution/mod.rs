//! Empirical bitstring distributions and the named store that holds them.

pub mod bits;
pub mod model;
pub mod store;

pub use model::{BitstringDistribution, Outcome};
pub use store::DistributionStore;
