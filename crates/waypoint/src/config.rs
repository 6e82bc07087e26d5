use anyhow::anyhow;
use clap::ValueEnum;
use file::ConfigFile;
use serde::Deserialize;
use std::time::Duration;
use waypoint_core::{defaults, Correlation, MAX_TTL};
use waypoint_dns::ResolveMethod;

mod cmd;
mod constants;
mod file;

pub use cmd::Args;

/// How DNS queries will be resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DnsResolveMethodConfig {
    /// Resolve using the OS resolver.
    System,
    /// Resolve using the `/etc/resolv.conf` DNS configuration.
    Resolv,
    /// Resolve using the Google `8.8.8.8` DNS service.
    Google,
    /// Resolve using the Cloudflare `1.1.1.1` DNS service.
    Cloudflare,
}

/// The debug log format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Display log data in a compact format.
    Compact,
    /// Display log data in a pretty format.
    Pretty,
    /// Display log data in a json format.
    Json,
}

/// The debug log span events.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogSpanEvents {
    /// Do not display event spans.
    Off,
    /// Display enter and exit event spans.
    Active,
    /// Display all event spans.
    Full,
}

/// Fully parsed and validated configuration.
#[derive(Debug, Eq, PartialEq)]
pub struct WaypointConfig {
    pub host: String,
    pub first_ttl: u8,
    pub max_ttl: u8,
    pub base_port: u16,
    pub probes_per_hop: u8,
    pub probe_timeout: Duration,
    pub socket_debug: bool,
    pub correlation: Correlation,
    pub numeric: bool,
    pub dns_resolve_method: ResolveMethod,
    pub dns_timeout: Duration,
    pub dns_ttl: Duration,
    pub verbose: bool,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub log_span_events: LogSpanEvents,
}

impl WaypointConfig {
    pub fn from(args: Args) -> anyhow::Result<Self> {
        let cfg_file = if let Some(cfg) = &args.config_file {
            file::read_config_file(cfg)?
        } else {
            ConfigFile::default()
        };
        Self::build_config(args, cfg_file)
    }

    fn build_config(args: Args, cfg_file: ConfigFile) -> anyhow::Result<Self> {
        let cfg_file_waypoint = cfg_file.waypoint.unwrap_or_default();
        let cfg_file_strategy = cfg_file.strategy.unwrap_or_default();
        let cfg_file_dns = cfg_file.dns.unwrap_or_default();
        let first_ttl = cfg_layer(
            args.first_ttl,
            cfg_file_strategy.first_ttl,
            defaults::DEFAULT_FIRST_TTL,
        );
        let max_ttl = cfg_layer(
            args.max_ttl,
            cfg_file_strategy.max_ttl,
            defaults::DEFAULT_MAX_TTL,
        );
        let base_port = cfg_layer(
            args.port,
            cfg_file_strategy.port,
            defaults::DEFAULT_BASE_PORT,
        );
        let probes_per_hop = cfg_layer(
            args.queries,
            cfg_file_strategy.queries,
            defaults::DEFAULT_PROBES_PER_HOP,
        );
        let probe_timeout = cfg_layer(
            args.wait,
            cfg_file_strategy.wait,
            defaults::DEFAULT_PROBE_TIMEOUT,
        );
        let socket_debug = cfg_layer_bool_flag(
            args.debug,
            cfg_file_strategy.debug,
            defaults::DEFAULT_SOCKET_DEBUG,
        );
        let strict = cfg_layer_bool_flag(
            args.strict,
            cfg_file_strategy.strict,
            constants::DEFAULT_STRICT,
        );
        let correlation = if strict {
            Correlation::Embedded
        } else {
            Correlation::Arrival
        };
        let numeric = cfg_layer_bool_flag(
            args.numeric,
            cfg_file_dns.numeric,
            constants::DEFAULT_NUMERIC,
        );
        let dns_resolve_method_config = cfg_layer(
            args.dns_resolve_method,
            cfg_file_dns.dns_resolve_method,
            constants::DEFAULT_DNS_RESOLVE_METHOD,
        );
        let dns_timeout = cfg_layer(
            args.dns_timeout,
            cfg_file_dns.dns_timeout,
            constants::DEFAULT_DNS_TIMEOUT,
        );
        let dns_ttl = cfg_layer(
            args.dns_ttl,
            cfg_file_dns.dns_ttl,
            constants::DEFAULT_DNS_TTL,
        );
        let verbose = args.verbose;
        let log_format = cfg_layer(
            args.log_format,
            cfg_file_waypoint.log_format,
            constants::DEFAULT_LOG_FORMAT,
        );
        let log_filter = cfg_layer(
            args.log_filter,
            cfg_file_waypoint.log_filter,
            String::from(constants::DEFAULT_LOG_FILTER),
        );
        let log_span_events = cfg_layer(
            args.log_span_events,
            cfg_file_waypoint.log_span_events,
            constants::DEFAULT_LOG_SPAN_EVENTS,
        );
        validate_ttl(first_ttl, max_ttl)?;
        validate_probes_per_hop(probes_per_hop)?;
        validate_base_port(base_port, first_ttl, max_ttl, probes_per_hop)?;
        validate_duration("wait", probe_timeout)?;
        validate_duration("dns-timeout", dns_timeout)?;
        Ok(Self {
            host: args.host,
            first_ttl,
            max_ttl,
            base_port,
            probes_per_hop,
            probe_timeout,
            socket_debug,
            correlation,
            numeric,
            dns_resolve_method: dns_resolve_method(dns_resolve_method_config),
            dns_timeout,
            dns_ttl,
            verbose,
            log_format,
            log_filter,
            log_span_events,
        })
    }
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            first_ttl: defaults::DEFAULT_FIRST_TTL,
            max_ttl: defaults::DEFAULT_MAX_TTL,
            base_port: defaults::DEFAULT_BASE_PORT,
            probes_per_hop: defaults::DEFAULT_PROBES_PER_HOP,
            probe_timeout: defaults::DEFAULT_PROBE_TIMEOUT,
            socket_debug: defaults::DEFAULT_SOCKET_DEBUG,
            correlation: defaults::DEFAULT_CORRELATION,
            numeric: constants::DEFAULT_NUMERIC,
            dns_resolve_method: dns_resolve_method(constants::DEFAULT_DNS_RESOLVE_METHOD),
            dns_timeout: constants::DEFAULT_DNS_TIMEOUT,
            dns_ttl: constants::DEFAULT_DNS_TTL,
            verbose: false,
            log_format: constants::DEFAULT_LOG_FORMAT,
            log_filter: String::from(constants::DEFAULT_LOG_FILTER),
            log_span_events: constants::DEFAULT_LOG_SPAN_EVENTS,
        }
    }
}

const fn dns_resolve_method(dns_resolve_method: DnsResolveMethodConfig) -> ResolveMethod {
    match dns_resolve_method {
        DnsResolveMethodConfig::System => ResolveMethod::System,
        DnsResolveMethodConfig::Resolv => ResolveMethod::Resolv,
        DnsResolveMethodConfig::Google => ResolveMethod::Google,
        DnsResolveMethodConfig::Cloudflare => ResolveMethod::Cloudflare,
    }
}

fn cfg_layer<T>(fst: Option<T>, snd: Option<T>, def: T) -> T {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => val,
        (None, None) => def,
    }
}

const fn cfg_layer_bool_flag(fst: bool, snd: Option<bool>, default: bool) -> bool {
    match (fst, snd) {
        (true, _) => true,
        (false, Some(val)) => val,
        (false, None) => default,
    }
}

/// Validate `first_ttl` and `max_ttl`.
fn validate_ttl(first_ttl: u8, max_ttl: u8) -> anyhow::Result<()> {
    if !(1..=MAX_TTL).contains(&first_ttl) {
        Err(anyhow!(
            "first-ttl ({first_ttl}) must be in the range 1..{MAX_TTL}"
        ))
    } else if !(1..=MAX_TTL).contains(&max_ttl) {
        Err(anyhow!(
            "max-ttl ({max_ttl}) must be in the range 1..{MAX_TTL}"
        ))
    } else if first_ttl > max_ttl {
        Err(anyhow!(
            "first-ttl ({first_ttl}) must be less than or equal to max-ttl ({max_ttl})"
        ))
    } else {
        Ok(())
    }
}

/// Validate `queries`.
fn validate_probes_per_hop(probes_per_hop: u8) -> anyhow::Result<()> {
    if probes_per_hop == 0 {
        Err(anyhow!("queries ({probes_per_hop}) must be greater than zero"))
    } else {
        Ok(())
    }
}

/// Validate `port` leaves room for a distinct destination port for every probe.
fn validate_base_port(
    base_port: u16,
    first_ttl: u8,
    max_ttl: u8,
    probes_per_hop: u8,
) -> anyhow::Result<()> {
    let total_probes =
        (u32::from(max_ttl) - u32::from(first_ttl) + 1) * u32::from(probes_per_hop);
    let max_base_port = u32::from(u16::MAX) + 1 - total_probes;
    if base_port == 0 {
        Err(anyhow!("port ({base_port}) must be greater than zero"))
    } else if u32::from(base_port) > max_base_port {
        Err(anyhow!(
            "port ({base_port}) must be no greater than {max_base_port} to send {total_probes} probes"
        ))
    } else {
        Ok(())
    }
}

/// Validate a duration is non-zero.
fn validate_duration(name: &str, duration: Duration) -> anyhow::Result<()> {
    if duration.is_zero() {
        Err(anyhow!("{name} must be greater than zero"))
    } else {
        Ok(())
    }
}
