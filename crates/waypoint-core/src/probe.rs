use crate::types::{Port, Sequence, TimeToLive};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

/// A single outbound UDP probe.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Probe {
    /// The sequence number of the probe, strictly increasing across the trace.
    pub sequence: Sequence,
    /// The time-to-live of the probe.
    pub ttl: TimeToLive,
    /// The UDP destination port of the probe.
    pub dest_port: Port,
    /// The instant immediately before the probe was written to its socket.
    pub sent: Instant,
}

impl Probe {
    #[must_use]
    pub const fn new(sequence: Sequence, ttl: TimeToLive, dest_port: Port, sent: Instant) -> Self {
        Self {
            sequence,
            ttl,
            dest_port,
            sent,
        }
    }
}

/// The ICMP type for `destination unreachable` messages.
const ICMP_DESTINATION_UNREACHABLE: u8 = 3;

/// The ICMP code for `port unreachable` messages.
const ICMP_PORT_UNREACHABLE: u8 = 3;

/// The ICMP type for `time exceeded` messages.
const ICMP_TIME_EXCEEDED: u8 = 11;

/// A decoded ICMP message received from a router or the target.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProbeResponse {
    /// The address of the responder.
    pub addr: Ipv4Addr,
    /// The reverse resolved name of the responder, if known.
    pub name: Option<String>,
    pub icmp_type: u8,
    pub icmp_code: u8,
    /// The instant the datagram was read from the socket.
    pub received: Instant,
    /// The UDP destination port quoted in the ICMP error message, if any.
    pub original_dest_port: Option<Port>,
}

impl ProbeResponse {
    /// Does this response signal that the probe reached the target?
    #[must_use]
    pub const fn is_port_unreachable(&self) -> bool {
        self.icmp_type == ICMP_DESTINATION_UNREACHABLE && self.icmp_code == ICMP_PORT_UNREACHABLE
    }

    #[must_use]
    pub const fn is_time_exceeded(&self) -> bool {
        self.icmp_type == ICMP_TIME_EXCEEDED
    }

    /// The round trip time for `probe`.
    ///
    /// Returns a zero duration if the response was received before the probe was sent.
    #[must_use]
    pub fn latency(&self, probe: &Probe) -> Duration {
        self.received.saturating_duration_since(probe.sent)
    }

    /// Was this response read from the socket before `probe` was sent?
    #[must_use]
    pub fn predates(&self, probe: &Probe) -> bool {
        self.received < probe.sent
    }
}

/// Resolve the name of a responding router.
///
/// Names are resolved by the controller once a hop has completed, never while
/// a probe is waiting for its response.
#[cfg_attr(test, mockall::automock)]
pub trait NameLookup: Send + Sync {
    /// Returns `None` if the address has no name or the lookup failed.
    fn lookup_name(&self, addr: Ipv4Addr) -> Option<String>;
}

/// A `NameLookup` which never resolves names.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericOnly;

impl NameLookup for NumericOnly {
    fn lookup_name(&self, _addr: Ipv4Addr) -> Option<String> {
        None
    }
}

/// The identity of the router which responded for a hop.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Responder {
    pub addr: Ipv4Addr,
    pub name: Option<String>,
}

impl From<&ProbeResponse> for Responder {
    fn from(response: &ProbeResponse) -> Self {
        Self {
            addr: response.addr,
            name: response.name.clone(),
        }
    }
}

/// The outcome of a single probe.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProbeOutcome {
    /// A response was received after the given round trip time.
    Reply(Duration),
    /// No response was received before the probe timeout.
    Timeout,
    /// The probe could not be sent.
    SendFailed,
}

/// The results for all probes sent with a given time-to-live.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Hop {
    pub ttl: TimeToLive,
    /// The first router to respond for this hop, if any.
    pub responder: Option<Responder>,
    /// One entry for every probe sent for this hop, in send order.
    pub samples: Vec<ProbeOutcome>,
}

impl Hop {
    #[must_use]
    pub const fn new(ttl: TimeToLive) -> Self {
        Self {
            ttl,
            responder: None,
            samples: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(3, 3, true, false; "port unreachable")]
    #[test_case(3, 1, false, false; "host unreachable")]
    #[test_case(11, 0, false, true; "time exceeded")]
    #[test_case(0, 0, false, false; "echo reply")]
    fn test_response_kind(icmp_type: u8, icmp_code: u8, unreachable: bool, exceeded: bool) {
        let response = make_response(icmp_type, icmp_code, Instant::now());
        assert_eq!(unreachable, response.is_port_unreachable());
        assert_eq!(exceeded, response.is_time_exceeded());
    }

    #[test]
    fn test_latency() {
        let sent = Instant::now();
        let probe = Probe::new(Sequence(1), TimeToLive(1), Port(34500), sent);
        let response = make_response(11, 0, sent + Duration::from_micros(12_345));
        assert_eq!(Duration::from_micros(12_345), response.latency(&probe));
        assert!(!response.predates(&probe));
    }

    #[test]
    fn test_latency_never_negative() {
        let received = Instant::now();
        let probe = Probe::new(
            Sequence(1),
            TimeToLive(1),
            Port(34500),
            received + Duration::from_millis(1),
        );
        let response = make_response(11, 0, received);
        assert_eq!(Duration::ZERO, response.latency(&probe));
        assert!(response.predates(&probe));
    }

    #[test]
    fn test_numeric_only_never_resolves() {
        assert_eq!(None, NumericOnly.lookup_name(Ipv4Addr::new(10, 0, 0, 1)));
    }

    fn make_response(icmp_type: u8, icmp_code: u8, received: Instant) -> ProbeResponse {
        ProbeResponse {
            addr: Ipv4Addr::new(10, 0, 0, 1),
            name: None,
            icmp_type,
            icmp_code,
            received,
            original_dest_port: None,
        }
    }
}
