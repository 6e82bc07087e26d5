use crate::codec;
use crate::config::ListenerConfig;
use crate::constants::MAX_PACKET_SIZE;
use crate::error::{Error, Result};
use crate::net::socket::Socket;
use crate::probe::ProbeResponse;
use crossbeam::channel::{SendTimeoutError, Sender};
use std::io::ErrorKind;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Receives ICMP messages on a raw socket and publishes them as `ProbeResponse`s.
///
/// Responses are delivered as soon as they are decoded and carry no
/// responder name.
///
/// The socket is opened by [`Listener::open`] on the calling thread so that a
/// failure surfaces before any probe is sent. [`Listener::run`] is then moved
/// to a dedicated thread.
pub struct Listener<S: Socket> {
    socket: S,
    read_timeout: Duration,
    buf: [u8; MAX_PACKET_SIZE],
}

impl<S: Socket> Listener<S> {
    /// Open the raw ICMP socket.
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux.
    #[instrument(skip_all, level = "trace")]
    pub fn open(config: &ListenerConfig) -> Result<Self> {
        tracing::debug!(?config);
        let socket = S::new_icmp_recv_socket_ipv4().map_err(Error::ListenerFailed)?;
        Ok(Self::with_socket(socket, config))
    }

    pub(crate) fn with_socket(socket: S, config: &ListenerConfig) -> Self {
        Self {
            socket,
            read_timeout: config.read_timeout,
            buf: [0_u8; MAX_PACKET_SIZE],
        }
    }

    /// Receive and publish responses until `cancel` is cancelled or the
    /// receiving side of `tx` is dropped.
    #[instrument(skip_all, level = "trace")]
    pub fn run(mut self, tx: &Sender<ProbeResponse>, cancel: &CancellationToken) {
        while !cancel.is_cancelled() {
            match self.recv_response() {
                Ok(Some(response)) => {
                    if !self.deliver(tx, response, cancel) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(%err, "failed to receive ICMP message"),
            }
        }
        tracing::debug!("listener stopped");
    }

    /// Wait up to the read timeout for a single datagram and decode it.
    ///
    /// Returns `None` if nothing was read or the datagram could not be decoded.
    pub(crate) fn recv_response(&mut self) -> Result<Option<ProbeResponse>> {
        if !self.socket.is_readable(self.read_timeout)? {
            return Ok(None);
        }
        let bytes_read = match self.socket.read(&mut self.buf) {
            Ok(bytes_read) => bytes_read,
            Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
            Err(err) => return Err(Error::IoError(err)),
        };
        let received = Instant::now();
        match codec::decode_response(&self.buf[..bytes_read], received) {
            Ok(response) => {
                tracing::debug!(
                    addr = %response.addr,
                    icmp_type = response.icmp_type,
                    icmp_code = response.icmp_code,
                    "response received"
                );
                Ok(Some(response))
            }
            Err(err) => {
                tracing::debug!(%err, bytes_read, "dropping datagram");
                Ok(None)
            }
        }
    }

    /// Block until the response is taken, rechecking cancellation every read timeout.
    ///
    /// Returns false if the listener should stop.
    fn deliver(
        &self,
        tx: &Sender<ProbeResponse>,
        response: ProbeResponse,
        cancel: &CancellationToken,
    ) -> bool {
        let mut pending = response;
        loop {
            match tx.send_timeout(pending, self.read_timeout) {
                Ok(()) => return true,
                Err(SendTimeoutError::Timeout(response)) => {
                    if cancel.is_cancelled() {
                        return false;
                    }
                    pending = response;
                }
                Err(SendTimeoutError::Disconnected(_)) => return false,
            }
        }
    }
}
