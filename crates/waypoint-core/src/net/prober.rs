use crate::config::ProberConfig;
use crate::error::{Error, IoResult, Result};
use crate::net::socket::Socket;
use crate::probe::Probe;
use std::marker::PhantomData;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;
use tracing::instrument;

/// Sends UDP probes, each from a new socket.
pub struct Prober<S: Socket> {
    target_addr: Ipv4Addr,
    socket_debug: bool,
    socket: PhantomData<fn() -> S>,
}

impl<S: Socket> Prober<S> {
    #[must_use]
    pub fn new(config: &ProberConfig) -> Self {
        tracing::debug!(?config);
        Self {
            target_addr: config.target_addr,
            socket_debug: config.socket_debug,
            socket: PhantomData,
        }
    }

    /// Send `payload` to the target on the probe destination port with the probe TTL.
    ///
    /// Returns the instant taken immediately before the write. The socket is
    /// closed before this returns.
    #[instrument(skip_all, level = "trace")]
    pub fn send(&self, probe: &Probe, payload: &[u8]) -> Result<Instant> {
        self.dispatch(probe, payload).map_err(Error::ProbeFailed)
    }

    fn dispatch(&self, probe: &Probe, payload: &[u8]) -> IoResult<Instant> {
        let mut socket = S::new_udp_send_socket_ipv4()?;
        if self.socket_debug {
            if let Err(err) = socket.set_debug(true) {
                tracing::debug!(%err, "ignoring failure to enable socket debugging");
            }
        }
        socket.set_ttl(u32::from(probe.ttl.0))?;
        let addr = SocketAddr::new(IpAddr::V4(self.target_addr), probe.dest_port.0);
        socket.connect(addr)?;
        let sent = Instant::now();
        socket.send(payload)?;
        Ok(sent)
    }
}
