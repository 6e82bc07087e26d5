use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// A tracer error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A tracer error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid packet: {0}")]
    PacketError(#[from] waypoint_packet::error::Error),
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("failed to open ICMP listener: {0}")]
    ListenerFailed(IoError),
    #[error("probe failed to send: {0}")]
    ProbeFailed(IoError),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("privilege error: {0}")]
    PrivilegeError(#[from] waypoint_privilege::Error),
    #[error("tracer error: {0}")]
    Other(String),
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("connect error for {1}: {0}")]
    Connect(io::Error, SocketAddr),
    #[error("failed to {1}: {0}")]
    Other(io::Error, IoOperation),
}

impl IoError {
    /// The underlying [`io::ErrorKind`].
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Connect(e, _) | Self::Other(e, _) => e.kind(),
        }
    }
}

/// Io operation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IoOperation {
    NewSocket,
    SetNonBlocking,
    SetTtl,
    SetDebug,
    Send,
    Select,
    Read,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::SetNonBlocking => write!(f, "set non-blocking"),
            Self::SetTtl => write!(f, "set TTL"),
            Self::SetDebug => write!(f, "set SO_DEBUG"),
            Self::Send => write!(f, "send"),
            Self::Select => write!(f, "select"),
            Self::Read => write!(f, "read"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_io_error_display() {
        let err = IoError::Other(
            io::Error::from(io::ErrorKind::PermissionDenied),
            IoOperation::NewSocket,
        );
        assert_eq!(io::ErrorKind::PermissionDenied, err.kind());
        assert!(err.to_string().starts_with("failed to create new socket: "));
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 34500);
        let err = Error::ProbeFailed(IoError::Connect(
            io::Error::from(io::ErrorKind::ConnectionRefused),
            addr,
        ));
        assert!(err
            .to_string()
            .starts_with("probe failed to send: connect error for 10.0.0.1:34500: "));
    }
}
