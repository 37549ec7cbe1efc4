//! Price text parsing and currency normalization.

pub mod currency;
pub mod parser;

pub use currency::{detect_currency, RateTable, REFERENCE_CURRENCY};
pub use parser::parse_price;
