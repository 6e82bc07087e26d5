use crate::codec;
use crate::config::ProberConfig;
use crate::error::{Error, Result};
use crate::net::prober::Prober;
use crate::net::socket::Socket;
use crate::net::Network;
use crate::probe::{Probe, ProbeResponse};
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::time::{Instant, SystemTime};
use tracing::instrument;

/// A channel for sending probes and receiving the responses delivered by the listener.
pub struct Channel<S: Socket> {
    prober: Prober<S>,
    responses: Receiver<ProbeResponse>,
}

impl<S: Socket> Channel<S> {
    #[must_use]
    pub fn new(config: &ProberConfig, responses: Receiver<ProbeResponse>) -> Self {
        Self {
            prober: Prober::new(config),
            responses,
        }
    }
}

impl<S: Socket> Network for Channel<S> {
    #[instrument(skip(self), level = "trace")]
    fn send_probe(&mut self, probe: Probe) -> Result<Instant> {
        let payload = codec::encode_probe(&probe, SystemTime::now());
        self.prober.send(&probe, &payload)
    }

    fn recv_probe(&mut self, deadline: Instant) -> Result<Option<ProbeResponse>> {
        match self.responses.recv_deadline(deadline) {
            Ok(response) => Ok(Some(response)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::Other(String::from("listener stopped unexpectedly")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use crate::net::socket::MockSocket;
    use crate::probe::{Hop, NumericOnly, ProbeOutcome, Responder};
    use crate::strategy::{CompletionReason, Strategy};
    use crate::types::{Port, ProbesPerHop, Sequence, TimeToLive};
    use crossbeam::channel::bounded;
    use mockall::predicate;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const TARGET: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
    const ROUTER: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

    fn make_response() -> ProbeResponse {
        ProbeResponse {
            addr: Ipv4Addr::new(10, 0, 0, 1),
            name: None,
            icmp_type: 11,
            icmp_code: 0,
            received: Instant::now(),
            original_dest_port: Some(Port(34500)),
        }
    }

    #[test]
    fn test_send_probe_encodes_payload() -> anyhow::Result<()> {
        let _m = crate::net::tests::MTX.lock();
        let probe = Probe::new(Sequence(4), TimeToLive(2), Port(34503), Instant::now());
        let ctx = MockSocket::new_udp_send_socket_ipv4_context();
        ctx.expect().times(1).returning(move || {
            let mut mocket = MockSocket::new();
            mocket.expect_set_ttl().times(1).returning(|_| Ok(()));
            mocket.expect_connect().times(1).returning(|_| Ok(()));
            mocket
                .expect_send()
                .withf(|buf| {
                    buf.len() == 16 && buf[..8] == hex_literal::hex!("57 50 01 02 00 04 86 c7")
                })
                .times(1)
                .returning(|_| Ok(()));
            Ok(mocket)
        });
        let (_tx, rx) = bounded(1);
        let mut channel = Channel::<MockSocket>::new(
            &ProberConfig {
                target_addr: Ipv4Addr::new(93, 184, 216, 34),
                socket_debug: false,
            },
            rx,
        );
        let before = Instant::now();
        let sent = channel.send_probe(probe)?;
        assert!(sent >= before);
        Ok(())
    }

    #[test]
    fn test_single_hop_to_target() -> anyhow::Result<()> {
        let _m = crate::net::tests::MTX.lock();
        let (tx, rx) = bounded(1);
        let ctx = MockSocket::new_udp_send_socket_ipv4_context();
        ctx.expect().times(1).returning(move || {
            let tx = tx.clone();
            let mut mocket = MockSocket::new();
            mocket
                .expect_set_ttl()
                .with(predicate::eq(1))
                .times(1)
                .returning(|_| Ok(()));
            mocket
                .expect_connect()
                .with(predicate::eq(SocketAddr::new(IpAddr::V4(TARGET), 34500)))
                .times(1)
                .returning(|_| Ok(()));
            mocket.expect_send().times(1).returning(move |_| {
                let response = ProbeResponse {
                    addr: ROUTER,
                    name: None,
                    icmp_type: 3,
                    icmp_code: 3,
                    received: Instant::now(),
                    original_dest_port: Some(Port(34500)),
                };
                tx.send(response).ok();
                Ok(())
            });
            Ok(mocket)
        });
        let channel = Channel::<MockSocket>::new(
            &ProberConfig {
                target_addr: TARGET,
                socket_debug: false,
            },
            rx,
        );
        let config = StrategyConfig {
            max_ttl: TimeToLive(3),
            probes_per_hop: ProbesPerHop(1),
            probe_timeout: Duration::from_secs(1),
            ..Default::default()
        };
        let mut hops = vec![];
        let strategy = Strategy::new(
            &config,
            CancellationToken::new(),
            Arc::new(NumericOnly),
            |hop: &Hop| hops.push(hop.clone()),
        );
        assert_eq!(CompletionReason::TargetFound, strategy.run(channel)?);
        assert_eq!(1, hops.len());
        assert_eq!(TimeToLive(1), hops[0].ttl);
        assert_eq!(
            Some(Responder {
                addr: ROUTER,
                name: None
            }),
            hops[0].responder
        );
        assert!(matches!(hops[0].samples[..], [ProbeOutcome::Reply(_)]));
        Ok(())
    }

    #[test]
    fn test_recv_probe() -> anyhow::Result<()> {
        let (tx, rx) = bounded(1);
        let mut channel = Channel::<MockSocket>::new(&ProberConfig::default(), rx);
        tx.send(make_response())?;
        let deadline = Instant::now() + Duration::from_secs(1);
        assert_eq!(Some(make_response().addr), channel.recv_probe(deadline)?.map(|r| r.addr));
        Ok(())
    }

    #[test]
    fn test_recv_probe_timeout() -> anyhow::Result<()> {
        let (_tx, rx) = bounded(1);
        let mut channel = Channel::<MockSocket>::new(&ProberConfig::default(), rx);
        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(None, channel.recv_probe(deadline)?);
        Ok(())
    }

    #[test]
    fn test_recv_probe_disconnected() {
        let (tx, rx) = bounded::<ProbeResponse>(1);
        drop(tx);
        let mut channel = Channel::<MockSocket>::new(&ProberConfig::default(), rx);
        let err = channel.recv_probe(Instant::now()).unwrap_err();
        assert!(matches!(err, Error::Other(_)));
    }
}
