#![forbid(unsafe_code)]

pub use netutils_base as base;

#[cfg(feature = "sys")]
pub use netutils_sys as sys;

#[cfg(feature = "sys")]
pub use netutils_sys::reserved::infer_reserved_networks;
