use crate::probe::{NameLookup, NumericOnly};
use crate::config::{Correlation, ListenerConfig, ProberConfig, StrategyConfig};
use crate::error::Result;
use crate::{Error, Port, ProbesPerHop, TimeToLive, Tracer, MAX_TTL};
use std::fmt::{Debug, Formatter};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

/// Build a tracer.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use std::time::Duration;
/// use waypoint_core::{Builder, Port, ProbesPerHop};
///
/// let addr = std::net::Ipv4Addr::new(93, 184, 216, 34);
/// let tracer = Builder::new(addr)
///     .base_port(Port(33434))
///     .probes_per_hop(ProbesPerHop(1))
///     .probe_timeout(Duration::from_secs(1))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct Builder {
    target_addr: Ipv4Addr,
    first_ttl: TimeToLive,
    max_ttl: TimeToLive,
    base_port: Port,
    probes_per_hop: ProbesPerHop,
    probe_timeout: Duration,
    read_timeout: Duration,
    correlation: Correlation,
    socket_debug: bool,
    drop_privileges: bool,
    name_lookup: Arc<dyn NameLookup>,
}

impl Debug for Builder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("target_addr", &self.target_addr)
            .field("first_ttl", &self.first_ttl)
            .field("max_ttl", &self.max_ttl)
            .field("base_port", &self.base_port)
            .field("probes_per_hop", &self.probes_per_hop)
            .field("probe_timeout", &self.probe_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("correlation", &self.correlation)
            .field("socket_debug", &self.socket_debug)
            .field("drop_privileges", &self.drop_privileges)
            .finish_non_exhaustive()
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            target_addr: ProberConfig::default().target_addr,
            first_ttl: StrategyConfig::default().first_ttl,
            max_ttl: StrategyConfig::default().max_ttl,
            base_port: StrategyConfig::default().base_port,
            probes_per_hop: StrategyConfig::default().probes_per_hop,
            probe_timeout: StrategyConfig::default().probe_timeout,
            read_timeout: ListenerConfig::default().read_timeout,
            correlation: StrategyConfig::default().correlation,
            socket_debug: ProberConfig::default().socket_debug,
            drop_privileges: false,
            name_lookup: Arc::new(NumericOnly),
        }
    }
}

impl Builder {
    /// Build a tracer builder for a given target.
    #[must_use]
    pub fn new(target_addr: Ipv4Addr) -> Self {
        Self {
            target_addr,
            ..Default::default()
        }
    }

    /// Set the first time-to-live to probe.
    #[must_use]
    pub fn first_ttl(self, first_ttl: TimeToLive) -> Self {
        Self { first_ttl, ..self }
    }

    /// Set the maximum time-to-live to probe.
    #[must_use]
    pub fn max_ttl(self, max_ttl: TimeToLive) -> Self {
        Self { max_ttl, ..self }
    }

    /// Set the destination port of the first probe.
    ///
    /// Every subsequent probe uses the next port.
    #[must_use]
    pub fn base_port(self, base_port: Port) -> Self {
        Self { base_port, ..self }
    }

    #[must_use]
    pub fn probes_per_hop(self, probes_per_hop: ProbesPerHop) -> Self {
        Self {
            probes_per_hop,
            ..self
        }
    }

    /// Set how long to wait for the response to each probe.
    #[must_use]
    pub fn probe_timeout(self, probe_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            ..self
        }
    }

    /// Set how long the listener waits for the socket to become readable before
    /// checking whether it should stop.
    #[must_use]
    pub fn read_timeout(self, read_timeout: Duration) -> Self {
        Self {
            read_timeout,
            ..self
        }
    }

    #[must_use]
    pub fn correlation(self, correlation: Correlation) -> Self {
        Self {
            correlation,
            ..self
        }
    }

    /// Set `SO_DEBUG` on every probe socket.
    #[must_use]
    pub fn socket_debug(self, socket_debug: bool) -> Self {
        Self {
            socket_debug,
            ..self
        }
    }

    /// Drop privileges once the ICMP socket has been opened.
    #[must_use]
    pub fn drop_privileges(self, drop_privileges: bool) -> Self {
        Self {
            drop_privileges,
            ..self
        }
    }

    /// Set how responder names are resolved.
    ///
    /// Defaults to [`NumericOnly`].
    #[must_use]
    pub fn name_lookup(self, name_lookup: Arc<dyn NameLookup>) -> Self {
        Self {
            name_lookup,
            ..self
        }
    }

    /// Build the `Tracer`.
    pub fn build(self) -> Result<Tracer> {
        if self.first_ttl.0 == 0 {
            return Err(Error::BadConfig(String::from("first_ttl must be at least 1")));
        }
        if self.max_ttl.0 > MAX_TTL {
            return Err(Error::BadConfig(format!(
                "max_ttl {} > {MAX_TTL}",
                self.max_ttl.0
            )));
        }
        if self.first_ttl > self.max_ttl {
            return Err(Error::BadConfig(format!(
                "first_ttl {} > max_ttl {}",
                self.first_ttl.0, self.max_ttl.0
            )));
        }
        if self.probes_per_hop.0 == 0 {
            return Err(Error::BadConfig(String::from(
                "probes_per_hop must be at least 1",
            )));
        }
        if self.base_port.0 == 0 {
            return Err(Error::BadConfig(String::from("base_port must be at least 1")));
        }
        let total_probes = (u32::from(self.max_ttl.0) - u32::from(self.first_ttl.0) + 1)
            * u32::from(self.probes_per_hop.0);
        let last_port = u32::from(self.base_port.0) + total_probes - 1;
        if last_port > u32::from(u16::MAX) {
            return Err(Error::BadConfig(format!(
                "base_port {} with {total_probes} probes would exceed port {}",
                self.base_port.0,
                u16::MAX
            )));
        }
        Ok(Tracer::new(
            ListenerConfig {
                read_timeout: self.read_timeout,
            },
            ProberConfig {
                target_addr: self.target_addr,
                socket_debug: self.socket_debug,
            },
            StrategyConfig {
                first_ttl: self.first_ttl,
                max_ttl: self.max_ttl,
                base_port: self.base_port,
                probes_per_hop: self.probes_per_hop,
                probe_timeout: self.probe_timeout,
                correlation: self.correlation,
            },
            self.drop_privileges,
            self.name_lookup,
        ))
    }
}
