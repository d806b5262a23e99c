use netutils_base::{ErrorCode, NetUtilsError, ABI_VERSION};

use crate::mem::{free_out, write_error_out, write_out};

#[unsafe(no_mangle)]
pub extern "C" fn netutils_reserved_abi_version() -> u32 {
    ABI_VERSION
}

#[unsafe(no_mangle)]
pub extern "C" fn netutils_sys_ffi_abi_version() -> u32 {
    ABI_VERSION
}

#[unsafe(no_mangle)]
#[allow(clippy::missing_safety_doc)]
pub unsafe extern "C" fn netutils_reserved_networks_json(
    v6: bool,
    out_ptr: *mut *mut u8,
    out_len: *mut usize,
) -> i32 {
    if out_ptr.is_null() || out_len.is_null() {
        return ErrorCode::InvalidArgument.as_i32();
    }

    unsafe { finish(netutils_sys::reserved::reserved_json_bytes(v6), out_ptr, out_len) }
}

#[unsafe(no_mangle)]
#[allow(clippy::missing_safety_doc)]
pub unsafe extern "C" fn netutils_reserved_query_json(
    req_ptr: *const u8,
    req_len: usize,
    out_ptr: *mut *mut u8,
    out_len: *mut usize,
) -> i32 {
    if out_ptr.is_null() || out_len.is_null() {
        return ErrorCode::InvalidArgument.as_i32();
    }
    let result = if req_ptr.is_null() || req_len == 0 {
        Err(NetUtilsError::invalid_argument("请求为空"))
    } else {
        let req_bytes = unsafe { std::slice::from_raw_parts(req_ptr, req_len) };
        std::str::from_utf8(req_bytes)
            .map_err(|e| NetUtilsError::invalid_argument(format!("请求不是 UTF-8: {e}")))
            .and_then(netutils_sys::reserved::reserved_query_json_bytes)
    };
    unsafe { finish(result, out_ptr, out_len) }
}

unsafe fn finish(result: Result<Vec<u8>, NetUtilsError>, out_ptr: *mut *mut u8, out_len: *mut usize) -> i32 {
    match result {
        Ok(buf) => {
            unsafe { write_out(out_ptr, out_len, buf) };
            ErrorCode::Ok.as_i32()
        }
        Err(e) => {
            write_error_out(out_ptr, out_len, &e);
            e.code.as_i32()
        }
    }
}

#[unsafe(no_mangle)]
#[allow(clippy::missing_safety_doc)]
pub unsafe extern "C" fn netutils_free(ptr: *mut u8, len: usize) {
    unsafe {
        free_out(ptr, len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn take(ptr: *mut u8, len: usize) -> serde_json::Value {
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec();
        unsafe { netutils_free(ptr, len) };
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn null_out_pointers_rejected() {
        let rc = unsafe { netutils_reserved_networks_json(false, ptr::null_mut(), ptr::null_mut()) };
        assert_eq!(rc, ErrorCode::InvalidArgument.as_i32());
    }

    #[test]
    fn list_writes_response() {
        let mut out: *mut u8 = ptr::null_mut();
        let mut len = 0usize;
        let rc = unsafe { netutils_reserved_networks_json(true, &mut out, &mut len) };
        assert_eq!(rc, 0);
        let v = take(out, len);
        assert_eq!(v["abi"], ABI_VERSION);
        assert_eq!(v["family"], "v6");
        assert!(v["items"].is_array());
    }

    #[test]
    fn empty_request_reports_error_body() {
        let mut out: *mut u8 = ptr::null_mut();
        let mut len = 0usize;
        let rc = unsafe { netutils_reserved_query_json(ptr::null(), 0, &mut out, &mut len) };
        assert_eq!(rc, ErrorCode::InvalidArgument.as_i32());
        let v = take(out, len);
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"]["code"], "InvalidArgument");
    }

    #[test]
    fn query_roundtrip() {
        let req = br#"{"abi":1,"family":"v4"}"#;
        let mut out: *mut u8 = ptr::null_mut();
        let mut len = 0usize;
        let rc = unsafe { netutils_reserved_query_json(req.as_ptr(), req.len(), &mut out, &mut len) };
        assert_eq!(rc, 0);
        let v = take(out, len);
        assert_eq!(v["family"], "v4");
    }

    #[test]
    fn free_accepts_null() {
        unsafe { netutils_free(ptr::null_mut(), 0) };
        assert_eq!(netutils_reserved_abi_version(), netutils_sys_ffi_abi_version());
    }

    #[test]
    fn invalid_utf8_request_reports_error_body() {
        let req = [0xffu8, 0xfe, 0x00];
        let mut out: *mut u8 = ptr::null_mut();
        let mut len = 0usize;
        let rc = unsafe { netutils_reserved_query_json(req.as_ptr(), req.len(), &mut out, &mut len) };
        assert_eq!(rc, ErrorCode::InvalidArgument.as_i32());
        let v = take(out, len);
        assert_eq!(v["error"]["code"], "InvalidArgument");
    }
}
