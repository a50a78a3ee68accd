pub mod tick;

pub use tick::{TickOptions, TickOutcome, Ticker};
