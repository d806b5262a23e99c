#![forbid(unsafe_code)]
pub const ABI_VERSION: u32 = 1;

mod error;
mod prefix;
mod reserved;

pub use error::*;
pub use prefix::*;
pub use reserved::*;
