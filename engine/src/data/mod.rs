// Synthetic market data: random source, series generation and the
// per-timeframe dataset registry.
pub mod generator;
pub mod random;
pub mod registry;

pub use registry::DatasetRegistry;
