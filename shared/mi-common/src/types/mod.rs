//! Shared Types

mod message;
mod response;
mod stats;

pub use message::*;
pub use response::*;
pub use stats::*;
