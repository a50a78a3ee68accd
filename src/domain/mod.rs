pub mod batcher;
pub mod chain;

pub use batcher::{display_amount, parse_batcher_address, IBatcher, DEFAULT_BATCHER_ADDRESS};
pub use chain::Chain;
