use netutils_base::{NetUtilsError, ABI_VERSION};

pub(crate) fn write_error_out(out_ptr: *mut *mut u8, out_len: *mut usize, e: &NetUtilsError) {
    let v = serde_json::json!({ "abi": ABI_VERSION, "ok": false, "error": e });
    let buf = serde_json::to_vec(&v).unwrap_or_else(|_| b"{\"ok\":false}".to_vec());
    unsafe {
        write_out(out_ptr, out_len, buf);
    }
}

pub(crate) unsafe fn write_out(out_ptr: *mut *mut u8, out_len: *mut usize, buf: Vec<u8>) {
    let boxed = buf.into_boxed_slice();
    let len = boxed.len();
    let ptr = Box::into_raw(boxed).cast::<u8>();
    unsafe {
        *out_ptr = ptr;
        *out_len = len;
    }
}

pub(crate) unsafe fn free_out(ptr: *mut u8, len: usize) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)));
    }
}
