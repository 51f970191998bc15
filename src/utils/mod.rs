pub mod table;
pub mod format;

pub use table::{Align, Table};
pub use format::{format_currency, format_currency_short, format_supply};
#[cfg(test)]
pub use format::parse_display;
