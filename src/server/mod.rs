//! Server process supervision and console streaming.

mod channel;
mod error;
mod exit;
mod launch;
mod monitor;
mod reader;
mod state;
mod supervisor;
pub mod tree;

pub use channel::*;
pub use error::*;
pub use exit::*;
pub use launch::*;
pub use monitor::*;
pub use reader::*;
pub use state::*;
pub use supervisor::*;
