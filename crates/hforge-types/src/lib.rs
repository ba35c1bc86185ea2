#![forbid(unsafe_code)]
#![doc = "Common error type and wire code identifiers for helloforge."]

pub mod codes;
pub mod error;

pub use codes::*;
pub use error::*;
