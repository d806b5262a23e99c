use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser};
use netutils_base::{AddressFamily, ReservedNetworksResponse};
use netutils_sys::reserved::{infer_reserved_networks_with, InferOptions, RESOLV_CONF_ENV};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "列出本机已占用、不应分配的保留网段")]
struct Cli {
    /// 查询 IPv6 网段（默认 IPv4）
    #[arg(long)]
    v6: bool,

    /// 以 JSON 响应输出
    #[arg(long)]
    json: bool,

    #[arg(long, env = RESOLV_CONF_ENV)]
    resolv_conf: Option<PathBuf>,

    #[arg(long)]
    no_nameservers: bool,

    #[arg(long)]
    no_routes: bool,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> InferOptions {
        InferOptions {
            resolv_conf: self.resolv_conf.clone(),
            nameservers: !self.no_nameservers,
            on_link_routes: !self.no_routes,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let family = AddressFamily::from_v6(cli.v6);
    let opts = cli.options();
    debug!(?opts, family = family.as_str(), "查询保留网段");

    let resp = ReservedNetworksResponse::v1(family, infer_reserved_networks_with(&opts, family));
    if resp.is_empty() {
        debug!("未发现保留网段");
    }

    let stdout = io::stdout();
    render(&mut stdout.lock(), &resp, cli.json)
}

fn render(out: &mut impl Write, resp: &ReservedNetworksResponse, json: bool) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, resp).context("序列化 JSON 失败")?;
        writeln!(out)?;
    } else {
        for p in &resp.items {
            writeln!(out, "{p}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
