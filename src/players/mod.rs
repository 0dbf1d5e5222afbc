//! Whitelist, ban list and player identity lookup.

mod error;
mod lists;
mod resolver;

pub use error::*;
pub use lists::*;
pub use resolver::*;
