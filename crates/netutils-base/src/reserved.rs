use serde::{Deserialize, Serialize};

use crate::{AddressFamily, AddressPrefix, ErrorCode, NetUtilsError, ABI_VERSION};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ReservedNetworksRequest {
    pub abi: u32,
    pub family: AddressFamily,
}

impl ReservedNetworksRequest {
    #[must_use]
    pub fn v1(family: AddressFamily) -> Self {
        Self {
            abi: ABI_VERSION,
            family,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ReservedNetworksResponse {
    pub abi: u32,
    pub family: AddressFamily,
    #[serde(default)]
    pub items: Vec<AddressPrefix>,
}

impl ReservedNetworksResponse {
    #[must_use]
    pub fn v1(family: AddressFamily, items: Vec<AddressPrefix>) -> Self {
        Self {
            abi: ABI_VERSION,
            family,
            items,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[must_use]
pub fn invalid_abi(expected: u32, got: u32) -> NetUtilsError {
    NetUtilsError::new(
        ErrorCode::InvalidArgument,
        format!("abi 版本不匹配: expected={expected} got={got}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_json_shape() {
        let items = vec!["10.0.0.0/8".parse().unwrap(), "192.168.0.53/32".parse().unwrap()];
        let resp = ReservedNetworksResponse::v1(AddressFamily::V4, items);
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["abi"], ABI_VERSION);
        assert_eq!(v["family"], "v4");
        assert_eq!(v["items"][0], "10.0.0.0/8");
        assert_eq!(v["items"][1], "192.168.0.53/32");
    }

    #[test]
    fn empty_response_has_items_array() {
        let resp = ReservedNetworksResponse::v1(AddressFamily::V6, Vec::new());
        assert!(resp.is_empty());
        let s = serde_json::to_string(&resp).unwrap();
        assert_eq!(s, format!("{{\"abi\":{ABI_VERSION},\"family\":\"v6\",\"items\":[]}}"));
    }

    #[test]
    fn request_parses_family() {
        let req: ReservedNetworksRequest = serde_json::from_str(r#"{"abi":1,"family":"v6"}"#).unwrap();
        assert_eq!(req, ReservedNetworksRequest::v1(AddressFamily::V6));
        assert!(serde_json::from_str::<ReservedNetworksRequest>(r#"{"abi":1,"family":"v5"}"#).is_err());
    }

    #[test]
    fn abi_mismatch_is_invalid_argument() {
        let e = invalid_abi(1, 7);
        assert_eq!(e.code, ErrorCode::InvalidArgument);
        assert!(e.message.contains("got=7"));
    }
}
