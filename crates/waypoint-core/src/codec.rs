use crate::constants::PAYLOAD_SIZE;
use crate::error::Result;
use crate::probe::{Probe, ProbeResponse};
use crate::types::Port;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use waypoint_packet::icmpv4::{IcmpPacket, IcmpType};
use waypoint_packet::ipv4::Ipv4Packet;
use waypoint_packet::udp::UdpPacket;
use waypoint_packet::IpProtocol;

const MAGIC: [u8; 2] = *b"WP";
const FORMAT_VERSION: u8 = 1;

const MAGIC_OFFSET: usize = 0;
const VERSION_OFFSET: usize = 2;
const TTL_OFFSET: usize = 3;
const SEQUENCE_OFFSET: usize = 4;
const PORT_OFFSET: usize = 6;
const TIMESTAMP_OFFSET: usize = 8;

/// Build the fixed size payload carried by a probe.
///
/// Layout (big-endian):
///
/// | bytes  | field                                   |
/// |--------|-----------------------------------------|
/// | 0..2   | magic `WP`                              |
/// | 2      | format version                          |
/// | 3      | time-to-live                            |
/// | 4..6   | sequence                                |
/// | 6..8   | destination port                        |
/// | 8..16  | send time, microseconds since the epoch |
///
/// The send time is the wall clock `timestamp`. Latency is measured with the
/// monotonic [`Probe::sent`] and never read back from the payload.
#[must_use]
pub fn encode_probe(probe: &Probe, timestamp: SystemTime) -> [u8; PAYLOAD_SIZE] {
    let micros = timestamp
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
        .unwrap_or_default();
    let mut payload = [0_u8; PAYLOAD_SIZE];
    payload[MAGIC_OFFSET..VERSION_OFFSET].copy_from_slice(&MAGIC);
    payload[VERSION_OFFSET] = FORMAT_VERSION;
    payload[TTL_OFFSET] = probe.ttl.0;
    payload[SEQUENCE_OFFSET..PORT_OFFSET].copy_from_slice(&probe.sequence.0.to_be_bytes());
    payload[PORT_OFFSET..TIMESTAMP_OFFSET].copy_from_slice(&probe.dest_port.0.to_be_bytes());
    payload[TIMESTAMP_OFFSET..].copy_from_slice(&micros.to_be_bytes());
    payload
}

/// Decode a raw `IPv4` datagram holding an ICMP message.
///
/// The responder address is the `IPv4` source address and the ICMP type and
/// code are read immediately after the `IPv4` header. If the message quotes a
/// UDP datagram its destination port is recorded, otherwise it is `None`.
///
/// The responder name is left unset.
pub fn decode_response(datagram: &[u8], received: Instant) -> Result<ProbeResponse> {
    let ipv4 = Ipv4Packet::new_view(datagram)?;
    let icmp = IcmpPacket::new_view(ipv4.payload())?;
    let icmp_type = icmp.get_icmp_type();
    let original_dest_port = match icmp_type {
        IcmpType::TimeExceeded | IcmpType::DestinationUnreachable => {
            quoted_dest_port(icmp.payload())
        }
        _ => None,
    };
    Ok(ProbeResponse {
        addr: ipv4.get_source(),
        name: None,
        icmp_type: icmp_type.id(),
        icmp_code: icmp.get_icmp_code().0,
        received,
        original_dest_port,
    })
}

fn quoted_dest_port(quote: &[u8]) -> Option<Port> {
    let ipv4 = Ipv4Packet::new_view(quote).ok()?;
    if ipv4.get_protocol() != IpProtocol::Udp {
        return None;
    }
    let udp = UdpPacket::new_view(ipv4.payload()).ok()?;
    Some(Port(udp.get_destination()))
}
