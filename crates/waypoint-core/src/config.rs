use crate::types::{Port, ProbesPerHop, TimeToLive};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use crate::config::Correlation;
    use std::time::Duration;

    /// The default value for `first-ttl`.
    pub const DEFAULT_FIRST_TTL: u8 = 1;

    /// The default value for `max-ttl`.
    pub const DEFAULT_MAX_TTL: u8 = 30;

    /// The default value for `base-port`.
    pub const DEFAULT_BASE_PORT: u16 = 34500;

    /// The default value for `probes-per-hop`.
    pub const DEFAULT_PROBES_PER_HOP: u8 = 3;

    /// The default value for `probe-timeout`.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

    /// The default value for `read-timeout`.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

    /// The default value for `correlation`.
    pub const DEFAULT_CORRELATION: Correlation = Correlation::Arrival;

    /// The default value for `socket-debug`.
    pub const DEFAULT_SOCKET_DEBUG: bool = false;
}

/// How responses are matched to the probe which is awaiting them.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Correlation {
    /// The next response delivered after a probe is sent belongs to that probe.
    Arrival,
    /// Only responses which quote the UDP destination port of the probe are accepted.
    ///
    /// Stale responses are discarded before each probe is sent.
    Embedded,
}

impl Display for Correlation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arrival => write!(f, "arrival"),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ListenerConfig {
    pub read_timeout: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            read_timeout: defaults::DEFAULT_READ_TIMEOUT,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ProberConfig {
    pub target_addr: Ipv4Addr,
    pub socket_debug: bool,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            target_addr: Ipv4Addr::UNSPECIFIED,
            socket_debug: defaults::DEFAULT_SOCKET_DEBUG,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct StrategyConfig {
    pub first_ttl: TimeToLive,
    pub max_ttl: TimeToLive,
    pub base_port: Port,
    pub probes_per_hop: ProbesPerHop,
    pub probe_timeout: Duration,
    pub correlation: Correlation,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            first_ttl: TimeToLive(defaults::DEFAULT_FIRST_TTL),
            max_ttl: TimeToLive(defaults::DEFAULT_MAX_TTL),
            base_port: Port(defaults::DEFAULT_BASE_PORT),
            probes_per_hop: ProbesPerHop(defaults::DEFAULT_PROBES_PER_HOP),
            probe_timeout: defaults::DEFAULT_PROBE_TIMEOUT,
            correlation: defaults::DEFAULT_CORRELATION,
        }
    }
}
