use std::cmp::Ordering;
use std::net::{IpAddr, Ipv6Addr};

use serde::{Deserialize, Serialize};

use crate::NetUtilsError;

/// A network address plus prefix length, serialized in CIDR notation.
pub type AddressPrefix = ipnet::IpNet;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    #[must_use]
    pub const fn from_v6(v6: bool) -> Self {
        if v6 { Self::V6 } else { Self::V4 }
    }

    #[must_use]
    pub const fn is_v6(self) -> bool {
        matches!(self, Self::V6)
    }

    #[must_use]
    pub const fn of_addr(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }

    #[must_use]
    pub const fn of_prefix(prefix: &AddressPrefix) -> Self {
        match prefix {
            AddressPrefix::V4(_) => Self::V4,
            AddressPrefix::V6(_) => Self::V6,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V4 => "v4",
            Self::V6 => "v6",
        }
    }
}

impl From<bool> for AddressFamily {
    fn from(v6: bool) -> Self {
        Self::from_v6(v6)
    }
}

#[must_use]
pub fn host_prefix(addr: IpAddr) -> AddressPrefix {
    AddressPrefix::from(addr)
}

#[must_use]
pub fn is_link_local(prefix: &AddressPrefix) -> bool {
    match prefix.network() {
        IpAddr::V4(a) => a.is_link_local(),
        IpAddr::V6(a) => is_link_local_v6(&a),
    }
}

fn is_link_local_v6(a: &Ipv6Addr) -> bool {
    (a.segments()[0] & 0xffc0) == 0xfe80
}

#[must_use]
pub fn compare_prefixes(a: &AddressPrefix, b: &AddressPrefix) -> Ordering {
    a.addr()
        .cmp(&b.addr())
        .then_with(|| a.prefix_len().cmp(&b.prefix_len()))
}

pub fn sort_prefixes(prefixes: &mut [AddressPrefix]) {
    prefixes.sort_by(compare_prefixes);
}

/// Drops a `%zone` suffix, so `fe80::1%eth0` parses as `fe80::1`.
#[must_use]
pub fn strip_zone(s: &str) -> &str {
    match s.split_once('%') {
        Some((addr, _)) => addr,
        None => s,
    }
}

/// Accepts `a.b.c.d/len`, `x::y/len` or a bare address (host prefix).
pub fn parse_prefix(s: &str) -> Result<AddressPrefix, NetUtilsError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(NetUtilsError::invalid_argument("前缀为空"));
    }

    match s.split_once('/') {
        Some((addr, len)) => {
            let addr: IpAddr = strip_zone(addr)
                .parse()
                .map_err(|_| NetUtilsError::invalid_argument(format!("非法 IP: {addr}")))?;
            let len: u8 = len
                .parse()
                .map_err(|_| NetUtilsError::invalid_argument(format!("非法 prefix_len: {len}")))?;
            AddressPrefix::new(addr, len).map_err(|_| match addr {
                IpAddr::V4(_) => NetUtilsError::invalid_argument("IPv4 prefix_len 必须在 0..=32"),
                IpAddr::V6(_) => NetUtilsError::invalid_argument("IPv6 prefix_len 必须在 0..=128"),
            })
        }
        None => strip_zone(s)
            .parse::<IpAddr>()
            .map(host_prefix)
            .map_err(|_| NetUtilsError::invalid_argument(format!("非法 IP: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn p(s: &str) -> AddressPrefix {
        parse_prefix(s).unwrap()
    }

    #[test]
    fn family_from_flag() {
        assert_eq!(AddressFamily::from(false), AddressFamily::V4);
        assert_eq!(AddressFamily::from(true), AddressFamily::V6);
        assert!(AddressFamily::V6.is_v6());
        assert_eq!(AddressFamily::of_prefix(&p("fd00::/8")), AddressFamily::V6);
        assert_eq!(AddressFamily::of_addr(&IpAddr::V4(Ipv4Addr::LOCALHOST)), AddressFamily::V4);
    }

    #[test]
    fn bare_address_is_host_prefix() {
        assert_eq!(p("192.168.1.1").prefix_len(), 32);
        assert_eq!(p("2001:db8::53").prefix_len(), 128);
        assert_eq!(p("fe80::1%eth0"), p("fe80::1/128"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_prefix("").is_err());
        assert!(parse_prefix("10.0.0.0/33").is_err());
        assert!(parse_prefix("::/129").is_err());
        assert!(parse_prefix("nope/8").is_err());
        assert!(parse_prefix("10.0.0.0/x").is_err());
    }

    #[test]
    fn link_local_detection() {
        assert!(is_link_local(&p("169.254.0.0/16")));
        assert!(is_link_local(&p("fe80::/64")));
        assert!(is_link_local(&p("febf::/16")));
        assert!(!is_link_local(&p("fec0::/10")));
        assert!(!is_link_local(&p("10.0.0.0/8")));
    }

    #[test]
    fn sorts_by_address_then_length() {
        let mut v = vec![p("10.0.0.0/16"), p("172.17.0.0/16"), p("10.0.0.0/8"), p("8.8.8.8")];
        sort_prefixes(&mut v);
        assert_eq!(v, vec![p("8.8.8.8/32"), p("10.0.0.0/8"), p("10.0.0.0/16"), p("172.17.0.0/16")]);
    }

    #[test]
    fn serializes_as_cidr() {
        let s = serde_json::to_string(&p("10.0.0.0/8")).unwrap();
        assert_eq!(s, "\"10.0.0.0/8\"");
        let f = serde_json::to_string(&AddressFamily::V6).unwrap();
        assert_eq!(f, "\"v6\"");
    }
}
