//! Domain types: symbols and quotes.

mod quote;
mod symbol;

pub use quote::Quote;
pub use symbol::Symbol;
