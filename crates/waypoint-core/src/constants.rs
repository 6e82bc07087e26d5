/// The maximum time-to-live value allowed.
pub const MAX_TTL: u8 = 254;

/// The size of the probe payload carried by every UDP probe.
pub const PAYLOAD_SIZE: usize = 16;

/// The size of the buffer used to read raw ICMP datagrams.
pub const MAX_PACKET_SIZE: usize = 1024;
