//! # Domain Models
//!
//! Request-scoped values built during a single render pass. Nothing here is
//! cached or mutated after construction.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Trimmed, upper-cased ticker; blank input is "no selection" |
//! | [`DateRange`] | Start/end calendar dates, forwarded unchanged |
//! | [`PriceRow`] | One trading day (OHLC, close, adjusted close, volume) |
//! | [`PriceSeries`] | Ordered rows for one ticker; empty is meaningful |
//! | [`LiveQuote`] | Latest trading snapshot, independent of the range |
//! | [`UtcDateTime`] | UTC timestamp |

mod date_range;
mod quote;
mod series;
mod ticker;
mod timestamp;

pub use date_range::{format_date, iso_date, parse_date, DateRange, DEFAULT_START_DATE};
pub use quote::LiveQuote;
pub use series::{PriceRow, PriceSeries};
pub use ticker::Ticker;
pub use timestamp::UtcDateTime;
