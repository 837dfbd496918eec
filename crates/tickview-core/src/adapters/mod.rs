//! Price source adapters.

pub mod synthetic;
pub mod yahoo;

pub use synthetic::SyntheticYahooClient;
pub use yahoo::{YahooAdapter, YahooAuthManager};
