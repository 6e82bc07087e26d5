use crate::config::{DnsResolveMethodConfig, LogFormat, LogSpanEvents};
use clap::Parser;
use std::time::Duration;

/// Trace the route UDP datagrams take to a host
#[derive(Parser, Debug)]
#[command(name = "waypoint", author, version, about, long_about = None, arg_required_else_help(true))]
pub struct Args {
    /// The hostname or IPv4 address to trace
    pub host: String,

    /// Config file
    #[arg(short = 'c', long, value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<String>,

    /// Enable socket level debugging on every probe socket [default: false]
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// The TTL to start from [default: 1]
    #[arg(short = 'f', long)]
    pub first_ttl: Option<u8>,

    /// The maximum number of TTL hops [default: 30]
    #[arg(short = 'm', long)]
    pub max_ttl: Option<u8>,

    /// The destination port of the first probe, incremented for every probe [default: 34500]
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// The number of probes to send for each hop [default: 3]
    #[arg(short = 'q', long)]
    pub queries: Option<u8>,

    /// How long to wait for the response to each probe [default: 5s]
    #[arg(short = 'w', long, value_parser = parse_duration)]
    pub wait: Option<Duration>,

    /// Print hop addresses numerically without reverse DNS lookups [default: false]
    #[arg(short = 'n', long)]
    pub numeric: bool,

    /// Only accept responses which quote the destination port of the awaited probe [default: false]
    #[arg(long)]
    pub strict: bool,

    /// How to perform DNS queries [default: system]
    #[arg(value_enum, short = 'r', long)]
    pub dns_resolve_method: Option<DnsResolveMethodConfig>,

    /// The maximum time to wait to perform DNS queries [default: 5s]
    ///
    /// Responder names are looked up once a hop has completed, so this never
    /// counts against the --wait of any probe.
    #[arg(long, value_parser = parse_duration)]
    pub dns_timeout: Option<Duration>,

    /// The time-to-live of cached reverse DNS entries [default: 300s]
    #[arg(long, value_parser = parse_duration)]
    pub dns_ttl: Option<Duration>,

    /// The debug log format [default: pretty]
    #[arg(value_enum, long)]
    pub log_format: Option<LogFormat>,

    /// The debug log filter [default: waypoint=debug]
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The debug log span events [default: off]
    #[arg(value_enum, long)]
    pub log_span_events: Option<LogSpanEvents>,

    /// Enable verbose debug logging
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}
