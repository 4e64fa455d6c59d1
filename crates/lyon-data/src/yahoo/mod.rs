//! Yahoo Finance data providers.

pub mod quotes;

pub use quotes::{LOCAL_CURRENCY, YahooQuoteProvider};
