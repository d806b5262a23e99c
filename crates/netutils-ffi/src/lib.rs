#![allow(unsafe_code)]

#[cfg(feature = "sys")]
pub use netutils_sys_ffi::*;

#[unsafe(no_mangle)]
pub extern "C" fn netutils_ffi_abi_version() -> u32 {
    netutils_base::ABI_VERSION
}
