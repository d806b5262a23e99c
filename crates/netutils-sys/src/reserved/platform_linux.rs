use super::*;

use netutils_base::{host_prefix, is_link_local, parse_prefix, strip_zone};
use serde::Deserialize;
use std::fs;
use std::io::Read as _;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const RESOLV_CONF: &str = "/etc/resolv.conf";
const SYSTEMD_RESOLV_CONF: &str = "/run/systemd/resolve/resolv.conf";

const IP_ROUTE_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

const SYSTEMD_STUB_NAMESERVERS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 53)),
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 54)),
];

#[derive(Debug, Deserialize)]
struct IpRoute {
    dst: String,
    scope: Option<String>,
    dev: Option<String>,
}

pub(super) fn infer_reserved_networks(opts: &InferOptions, family: AddressFamily) -> Vec<AddressPrefix> {
    let mut reserved = Vec::new();

    if opts.nameservers {
        match load_resolv_conf(opts.resolv_conf.as_deref()) {
            Ok(text) => {
                let before = reserved.len();
                reserved.extend(nameserver_prefixes(&text, family));
                trace!(count = reserved.len() - before, "nameserver 前缀");
            }
            Err(e) => debug!(code = ?e.code, "跳过 nameserver: {}", e.message),
        }
    }

    if opts.on_link_routes {
        match query_on_link_routes(family) {
            Ok(routes) => {
                trace!(count = routes.len(), "on-link 路由前缀");
                reserved.extend(routes);
            }
            Err(e) => debug!(code = ?e.code, "跳过 on-link 路由: {}", e.message),
        }
    }

    reserved
}

fn load_resolv_conf(explicit: Option<&Path>) -> Result<String, NetUtilsError> {
    match explicit {
        Some(path) => read_text(path),
        None => load_default_resolv_conf(Path::new(RESOLV_CONF), Path::new(SYSTEMD_RESOLV_CONF)),
    }
}

// With systemd-resolved, /etc/resolv.conf only names the local stub; the
// upstream servers live in the second file.
fn load_default_resolv_conf(etc: &Path, systemd: &Path) -> Result<String, NetUtilsError> {
    let text = read_text(etc)?;
    if only_systemd_stub(&text) && systemd.is_file() {
        debug!(path = %systemd.display(), "检测到 systemd-resolved stub");
        return read_text(systemd);
    }
    Ok(text)
}

fn read_text(path: &Path) -> Result<String, NetUtilsError> {
    fs::read_to_string(path)
        .map_err(|e| NetUtilsError::from(e).with_context(format_args!("读取 {} 失败", path.display())))
}

fn parse_nameservers(text: &str) -> Vec<IpAddr> {
    text.lines()
        .filter_map(|line| {
            let line = line.split(['#', ';']).next().unwrap_or("");
            let mut fields = line.split_whitespace();
            if fields.next()? != "nameserver" {
                return None;
            }
            let addr = fields.next()?;
            match strip_zone(addr).parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    debug!(addr, "忽略无法解析的 nameserver");
                    None
                }
            }
        })
        .collect()
}

fn only_systemd_stub(text: &str) -> bool {
    let ns = parse_nameservers(text);
    !ns.is_empty() && ns.iter().all(|a| SYSTEMD_STUB_NAMESERVERS.contains(a))
}

fn nameserver_prefixes(text: &str, family: AddressFamily) -> Vec<AddressPrefix> {
    parse_nameservers(text)
        .into_iter()
        .filter(|a| AddressFamily::of_addr(a) == family)
        .map(host_prefix)
        .collect()
}

fn query_on_link_routes(family: AddressFamily) -> Result<Vec<AddressPrefix>, NetUtilsError> {
    let family_flag = if family.is_v6() { "-6" } else { "-4" };
    let out = run_with_timeout(
        Command::new("ip").args(["-j", family_flag, "route", "show", "table", "main"]),
        IP_ROUTE_TIMEOUT,
    )?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(NetUtilsError::system_error(format!(
            "ip -j {family_flag} route 失败: {}",
            stderr.trim()
        )));
    }

    parse_on_link_routes(&out.stdout, family)
}

fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, NetUtilsError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| NetUtilsError::unsupported(format!("无法执行 {program}: {e}")))?;

    // Drain stdout concurrently so a large route table cannot fill the pipe.
    let mut stdout_pipe = child.stdout.take();
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(pipe) = stdout_pipe.as_mut() {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(NetUtilsError::system_error(format!(
                    "{program} 超时 ({} ms)",
                    timeout.as_millis()
                )));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    let stdout = reader.join().unwrap_or_default();
    let mut stderr = Vec::new();
    if let Some(mut pipe) = child.stderr.take() {
        let _ = pipe.read_to_end(&mut stderr);
    }
    Ok(Output { status, stdout, stderr })
}

fn parse_on_link_routes(json: &[u8], family: AddressFamily) -> Result<Vec<AddressPrefix>, NetUtilsError> {
    // Older iproute2 prints nothing for an empty table.
    if json.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let routes: Vec<IpRoute> = serde_json::from_slice(json)
        .map_err(|e| NetUtilsError::system_error(format!("解析 ip route JSON 失败: {e}")))?;

    Ok(routes
        .iter()
        .filter_map(|r| on_link_prefix(r, family))
        .collect())
}

fn on_link_prefix(route: &IpRoute, family: AddressFamily) -> Option<AddressPrefix> {
    if route.scope.as_deref() != Some("link") || route.dst == "default" {
        return None;
    }

    let prefix = match parse_prefix(&route.dst) {
        Ok(p) => p,
        Err(e) => {
            debug!(dst = %route.dst, "忽略路由: {}", e.message);
            return None;
        }
    };

    if AddressFamily::of_prefix(&prefix) != family || is_link_local(&prefix) {
        return None;
    }

    trace!(%prefix, dev = route.dev.as_deref().unwrap_or("-"), "on-link 路由");
    Some(prefix)
}
