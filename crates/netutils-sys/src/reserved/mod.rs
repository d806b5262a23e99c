use std::ffi::OsString;
use std::path::PathBuf;

use netutils_base::{
    invalid_abi, sort_prefixes, AddressFamily, AddressPrefix, NetUtilsError,
    ReservedNetworksRequest, ReservedNetworksResponse, ABI_VERSION,
};
use tracing::trace;

#[cfg(target_os = "linux")]
mod platform_linux;
#[cfg(any(target_os = "macos", test))]
mod platform_macos;
#[cfg(any(target_os = "windows", test))]
mod platform_windows;
#[cfg(any(target_os = "freebsd", test))]
mod platform_freebsd;
#[cfg(any(
    not(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "windows",
        target_os = "freebsd"
    )),
    test
))]
mod platform_unsupported;

#[cfg(target_os = "linux")]
use platform_linux as platform;
#[cfg(target_os = "macos")]
use platform_macos as platform;
#[cfg(target_os = "windows")]
use platform_windows as platform;
#[cfg(target_os = "freebsd")]
use platform_freebsd as platform;
#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "windows",
    target_os = "freebsd"
)))]
use platform_unsupported as platform;

pub const RESERVED_ABI_VERSION: u32 = ABI_VERSION;

pub const RESOLV_CONF_ENV: &str = "NETUTILS_RESOLV_CONF";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InferOptions {
    pub resolv_conf: Option<PathBuf>,
    pub nameservers: bool,
    pub on_link_routes: bool,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            resolv_conf: None,
            nameservers: true,
            on_link_routes: true,
        }
    }
}

impl InferOptions {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(RESOLV_CONF_ENV))
    }

    fn from_env_value(value: Option<OsString>) -> Self {
        let resolv_conf = value.filter(|v| !v.is_empty()).map(PathBuf::from);
        Self {
            resolv_conf,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_resolv_conf<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.resolv_conf = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_nameservers(mut self, enable: bool) -> Self {
        self.nameservers = enable;
        self
    }

    #[must_use]
    pub fn with_on_link_routes(mut self, enable: bool) -> Self {
        self.on_link_routes = enable;
        self
    }
}

pub fn infer_reserved_networks(v6: bool) -> Vec<AddressPrefix> {
    infer_reserved_networks_for(AddressFamily::from_v6(v6))
}

pub fn infer_reserved_networks_for(family: AddressFamily) -> Vec<AddressPrefix> {
    infer_reserved_networks_with(&InferOptions::from_env(), family)
}

pub fn infer_reserved_networks_with(opts: &InferOptions, family: AddressFamily) -> Vec<AddressPrefix> {
    let mut reserved = platform::infer_reserved_networks(opts, family);
    reserved.retain(|p| AddressFamily::of_prefix(p) == family);
    sort_prefixes(&mut reserved);
    trace!(family = family.as_str(), count = reserved.len(), "reserved networks inferred");
    reserved
}

pub fn reserved_response(family: AddressFamily) -> ReservedNetworksResponse {
    ReservedNetworksResponse::v1(family, infer_reserved_networks_for(family))
}

pub fn reserved_json_bytes(v6: bool) -> Result<Vec<u8>, NetUtilsError> {
    let resp = reserved_response(AddressFamily::from_v6(v6));
    serde_json::to_vec(&resp)
        .map_err(|e| NetUtilsError::system_error(format!("序列化 reserved 响应失败: {e}")))
}

pub fn reserved_query_json_bytes(req_json: &str) -> Result<Vec<u8>, NetUtilsError> {
    let req: ReservedNetworksRequest = serde_json::from_str(req_json)
        .map_err(|e| NetUtilsError::invalid_argument(format!("解析请求 JSON 失败: {e}")))?;
    if req.abi != RESERVED_ABI_VERSION {
        return Err(invalid_abi(RESERVED_ABI_VERSION, req.abi));
    }
    let resp = reserved_response(req.family);
    serde_json::to_vec(&resp)
        .map_err(|e| NetUtilsError::system_error(format!("序列化 reserved 响应失败: {e}")))
}
