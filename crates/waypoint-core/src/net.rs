use crate::error::Result;
use crate::probe::{Probe, ProbeResponse};
use std::time::Instant;

/// Platform specific network code.
mod platform;

/// A network socket.
mod socket;

/// Sends UDP probes.
mod prober;

/// Receives ICMP responses.
pub mod listener;

/// A channel for sending probes and receiving responses.
pub mod channel;

/// The platform specific socket type.
pub use platform::SocketImpl;

/// An abstraction over the network for tracing.
#[cfg_attr(test, mockall::automock)]
pub trait Network {
    /// Send a `Probe`.
    ///
    /// Returns the instant immediately before the probe was written to its
    /// socket, after the socket was opened and connected.
    fn send_probe(&mut self, probe: Probe) -> Result<Instant>;

    /// Wait until `deadline` for the next `ProbeResponse`.
    ///
    /// Returns `None` if the deadline passes first.
    fn recv_probe(&mut self, deadline: Instant) -> Result<Option<ProbeResponse>>;
}
