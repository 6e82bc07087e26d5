use crate::error::IoResult as Result;
use std::net::SocketAddr;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
pub trait Socket
where
    Self: Sized,
{
    /// Create a raw IPv4 socket for receiving ICMP messages.
    fn new_icmp_recv_socket_ipv4() -> Result<Self>;
    /// Create an IPv4 datagram socket for sending a single UDP probe.
    fn new_udp_send_socket_ipv4() -> Result<Self>;
    fn set_ttl(&mut self, ttl: u32) -> Result<()>;
    fn set_debug(&mut self, enabled: bool) -> Result<()>;
    fn connect(&mut self, address: SocketAddr) -> Result<()>;
    /// Send on a connected socket.
    fn send(&mut self, buf: &[u8]) -> Result<()>;
    /// Returns true if the socket becomes readable before the timeout, false otherwise.
    fn is_readable(&mut self, timeout: Duration) -> Result<bool>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
}
