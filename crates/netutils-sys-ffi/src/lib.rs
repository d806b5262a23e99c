#![allow(unsafe_code)]

mod exports;
mod mem;

pub use exports::*;
