//! Packet wire format parsing and building.
//!
//! The following packet are supported:
//! - `IPv4`
//! - `ICMPv4`
//! - `UDP`
//!
//! # Endianness
//!
//! The internal representation is held in network byte order (big-endian) and
//! all accessor methods take and return data in host byte order, converting as
//! necessary for the given architecture.
//!
//! # Example
//!
//! The following example parses an `ICMPv4` port unreachable message received
//! on a raw socket and reads the destination port of the quoted `UDP` probe:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use waypoint_packet::icmpv4::{IcmpCode, IcmpPacket, IcmpType};
//! use waypoint_packet::ipv4::Ipv4Packet;
//! use waypoint_packet::udp::UdpPacket;
//!
//! let buf = hex_literal::hex!(
//!     "
//!     45 00 00 38 00 00 00 00 38 01 00 00 5d b8 d8 22
//!     c0 a8 01 15 03 03 00 00 00 00 00 00 45 00 00 2c
//!     00 00 40 00 01 11 00 00 c0 a8 01 15 5d b8 d8 22
//!     d2 35 86 c4 00 18 00 00
//!     "
//! );
//! let ipv4 = Ipv4Packet::new_view(&buf)?;
//! let icmp = IcmpPacket::new_view(ipv4.payload())?;
//! assert_eq!(IcmpType::DestinationUnreachable, icmp.get_icmp_type());
//! assert_eq!(IcmpCode(3), icmp.get_icmp_code());
//! let quoted = Ipv4Packet::new_view(icmp.payload())?;
//! let udp = UdpPacket::new_view(quoted.payload())?;
//! assert_eq!(34500, udp.get_destination());
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod buffer;

/// Packet errors.
pub mod error;

/// `ICMPv4` packets.
pub mod icmpv4;

/// `IPv4` packets.
pub mod ipv4;

/// `UDP` packets.
pub mod udp;

/// The IP packet next layer protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IpProtocol {
    Icmp,
    Udp,
    Other(u8),
}

impl IpProtocol {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Icmp => 1,
            Self::Udp => 17,
            Self::Other(id) => id,
        }
    }
}

impl From<u8> for IpProtocol {
    fn from(id: u8) -> Self {
        match id {
            1 => Self::Icmp,
            17 => Self::Udp,
            p => Self::Other(p),
        }
    }
}

/// Format a payload as a hexadecimal string.
#[must_use]
pub fn fmt_payload(bytes: &[u8]) -> String {
    use itertools::Itertools as _;
    format!("{:02x}", bytes.iter().format(" "))
}
