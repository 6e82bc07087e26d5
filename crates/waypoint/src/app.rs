use crate::config::{LogFormat, LogSpanEvents, WaypointConfig};
use crate::report::Report;
use anyhow::{anyhow, Context};
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use waypoint_core::{Builder, NameLookup, NumericOnly, Port, ProbesPerHop, TimeToLive};
use waypoint_dns::{DnsEntry, DnsResolver, Resolver};
use waypoint_privilege::Privilege;

/// Run the waypoint application.
pub fn run_waypoint(cfg: &WaypointConfig, privilege: &Privilege) -> anyhow::Result<()> {
    configure_logging(cfg);
    tracing::debug!(?cfg, ?privilege);
    let resolver = start_dns_resolver(cfg)?;
    let addr = resolve_target(&cfg.host, &resolver)?;
    let name_lookup: Arc<dyn NameLookup> = if cfg.numeric {
        Arc::new(NumericOnly)
    } else {
        Arc::new(DnsNameLookup(resolver))
    };
    let tracer = Builder::new(addr)
        .first_ttl(TimeToLive(cfg.first_ttl))
        .max_ttl(TimeToLive(cfg.max_ttl))
        .base_port(Port(cfg.base_port))
        .probes_per_hop(ProbesPerHop(cfg.probes_per_hop))
        .probe_timeout(cfg.probe_timeout)
        .correlation(cfg.correlation)
        .socket_debug(cfg.socket_debug)
        .drop_privileges(true)
        .name_lookup(name_lookup)
        .build()?;
    let mut report = Report::new(io::stdout().lock());
    report.preamble(&cfg.host, addr, cfg.max_ttl)?;
    let cancel = tracer.cancel_token();
    let mut write_err = None;
    let result = tracer.run_with(|hop| {
        if write_err.is_none() {
            if let Err(err) = report.hop(hop) {
                write_err = Some(err);
                cancel.cancel();
            }
        }
    });
    if let Some(err) = write_err {
        return Err(err).context("failed to write report");
    }
    match result {
        Ok(reason) => {
            tracing::debug!(?reason, "trace complete");
            Ok(())
        }
        Err(err @ waypoint_core::Error::ListenerFailed(_)) if !privilege.has_privileges() => Err(
            anyhow!("{err}: missing privileges, {}", Privilege::hint()),
        ),
        Err(err) => Err(err.into()),
    }
}

/// Resolves responder names with the DNS resolver.
struct DnsNameLookup(DnsResolver);

impl NameLookup for DnsNameLookup {
    fn lookup_name(&self, addr: Ipv4Addr) -> Option<String> {
        match self.0.reverse_lookup(addr) {
            DnsEntry::Resolved(_, hostnames) => hostnames.into_iter().next(),
            DnsEntry::NotFound(_) | DnsEntry::Failed(_) | DnsEntry::Timeout(_) => None,
        }
    }
}

fn start_dns_resolver(cfg: &WaypointConfig) -> anyhow::Result<DnsResolver> {
    Ok(DnsResolver::start(waypoint_dns::Config::new(
        cfg.dns_resolve_method,
        cfg.dns_timeout,
        cfg.dns_ttl,
    ))?)
}

/// Resolve the target to the first IPv4 address found.
fn resolve_target(host: &str, resolver: &impl Resolver) -> anyhow::Result<Ipv4Addr> {
    let addrs: Vec<_> = resolver
        .lookup(host)
        .map_err(|err| anyhow!("lookup for {host} failed: {err}"))?
        .into_iter()
        .collect();
    if addrs.is_empty() {
        return Err(anyhow!("no addresses were found for {host}"));
    }
    first_ipv4(&addrs).ok_or_else(|| anyhow!("IPv4 address not found"))
}

fn first_ipv4(addrs: &[IpAddr]) -> Option<Ipv4Addr> {
    addrs.iter().find_map(|addr| match addr {
        IpAddr::V4(addr) => Some(*addr),
        IpAddr::V6(_) => None,
    })
}

/// Install a `tracing` subscriber writing to stderr when verbose logging is enabled.
fn configure_logging(cfg: &WaypointConfig) {
    if cfg.verbose {
        let fmt_span = match cfg.log_span_events {
            LogSpanEvents::Off => FmtSpan::NONE,
            LogSpanEvents::Active => FmtSpan::ACTIVE,
            LogSpanEvents::Full => FmtSpan::FULL,
        };
        match cfg.log_format {
            LogFormat::Compact => {
                tracing_subscriber::fmt()
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .with_writer(io::stderr)
                    .compact()
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::fmt()
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .with_writer(io::stderr)
                    .pretty()
                    .init();
            }
            LogFormat::Json => {
                tracing_subscriber::fmt()
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .with_writer(io::stderr)
                    .json()
                    .init();
            }
        }
    }
}
