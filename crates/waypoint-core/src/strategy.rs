use self::state::TracerState;
use crate::config::{Correlation, StrategyConfig};
use crate::error::Result;
use crate::net::Network;
use crate::probe::{Hop, NameLookup, Probe, ProbeOutcome, ProbeResponse, Responder};
use crate::types::TimeToLive;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// The longest the controller waits on the network before rechecking cancellation.
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Indicates what triggered the completion of the trace.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompletionReason {
    /// A probe elicited an ICMP port unreachable.
    TargetFound,
    /// Every TTL up to the maximum was probed without reaching the target.
    MaxTtlReached,
    /// The trace was cancelled.
    Cancelled,
}

/// Trace a path to a target one hop at a time.
pub struct Strategy<F> {
    config: StrategyConfig,
    cancel: CancellationToken,
    names: Arc<dyn NameLookup>,
    publish: F,
}

impl<F> Debug for Strategy<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut(&Hop)> Strategy<F> {
    #[instrument(skip_all, level = "trace")]
    pub fn new(
        config: &StrategyConfig,
        cancel: CancellationToken,
        names: Arc<dyn NameLookup>,
        publish: F,
    ) -> Self {
        tracing::debug!(?config);
        Self {
            config: *config,
            cancel,
            names,
            publish,
        }
    }

    /// Probe every TTL in turn and publish each completed `Hop`.
    ///
    /// Every hop is sent `probes_per_hop` probes, one at a time. The name of
    /// the responder is resolved once every probe of the hop has completed.
    /// The trace stops after the first hop which elicited a port unreachable.
    #[instrument(skip_all, level = "trace")]
    pub fn run<N: Network>(mut self, mut network: N) -> Result<CompletionReason> {
        let mut state = TracerState::new(self.config);
        for ttl in self.config.first_ttl.0..=self.config.max_ttl.0 {
            let ttl = TimeToLive(ttl);
            let mut hop = Hop::new(ttl);
            let mut target_found = false;
            for _ in 0..self.config.probes_per_hop.0 {
                if self.cancel.is_cancelled() {
                    return Ok(CompletionReason::Cancelled);
                }
                let (outcome, response) = self.probe(&mut network, &mut state, ttl)?;
                if let Some(response) = response {
                    if hop.responder.is_none() {
                        hop.responder = Some(Responder::from(&response));
                    }
                    target_found |= response.is_port_unreachable();
                }
                hop.samples.push(outcome);
            }
            if let Some(responder) = &mut hop.responder {
                responder.name = self.names.lookup_name(responder.addr);
            }
            if self.cancel.is_cancelled() {
                return Ok(CompletionReason::Cancelled);
            }
            tracing::debug!(ttl = ttl.0, responder = ?hop.responder, samples = ?hop.samples, "hop complete");
            (self.publish)(&hop);
            if target_found {
                return Ok(CompletionReason::TargetFound);
            }
        }
        Ok(CompletionReason::MaxTtlReached)
    }

    /// Send a single probe and wait for its response.
    fn probe<N: Network>(
        &self,
        network: &mut N,
        state: &mut TracerState,
        ttl: TimeToLive,
    ) -> Result<(ProbeOutcome, Option<ProbeResponse>)> {
        if self.config.correlation == Correlation::Embedded {
            Self::drain(network)?;
        }
        let probe = state.next_probe(ttl, Instant::now());
        let probe = match network.send_probe(probe) {
            Ok(sent) => Probe { sent, ..probe },
            Err(err) => {
                tracing::warn!(
                    %err,
                    sequence = probe.sequence.0,
                    ttl = ttl.0,
                    port = probe.dest_port.0,
                    "failed to send probe"
                );
                return Ok((ProbeOutcome::SendFailed, None));
            }
        };
        let deadline = probe.sent + self.config.probe_timeout;
        tracing::trace!(
            sequence = probe.sequence.0,
            ttl = ttl.0,
            port = probe.dest_port.0,
            "probe sent"
        );
        match self.await_response(network, &probe, deadline)? {
            Some(response) => {
                let latency = response.latency(&probe);
                Ok((ProbeOutcome::Reply(latency), Some(response)))
            }
            None => Ok((ProbeOutcome::Timeout, None)),
        }
    }

    /// Wait for the response to `probe` until `deadline`.
    ///
    /// The network is always polled at least once, so a zero timeout still
    /// accepts a response which is already waiting.
    fn await_response<N: Network>(
        &self,
        network: &mut N,
        probe: &Probe,
        deadline: Instant,
    ) -> Result<Option<ProbeResponse>> {
        loop {
            let slice = deadline.min(Instant::now() + CANCEL_CHECK_INTERVAL);
            if let Some(response) = network.recv_probe(slice)? {
                if self.accepts(probe, &response) {
                    return Ok(Some(response));
                }
                tracing::debug!(
                    addr = %response.addr,
                    original_dest_port = ?response.original_dest_port,
                    expected_port = probe.dest_port.0,
                    "discarding unrelated response"
                );
            }
            if Instant::now() >= deadline || self.cancel.is_cancelled() {
                return Ok(None);
            }
        }
    }

    /// A response read before `probe` was sent belongs to an earlier probe
    /// and is never accepted.
    fn accepts(&self, probe: &Probe, response: &ProbeResponse) -> bool {
        if response.predates(probe) {
            return false;
        }
        match self.config.correlation {
            Correlation::Arrival => true,
            Correlation::Embedded => response.original_dest_port == Some(probe.dest_port),
        }
    }

    /// Discard responses which arrived after their probe timed out.
    fn drain<N: Network>(network: &mut N) -> Result<()> {
        while let Some(stale) = network.recv_probe(Instant::now())? {
            tracing::debug!(addr = %stale.addr, original_dest_port = ?stale.original_dest_port, "discarding stale response");
        }
        Ok(())
    }
}

/// Mutable state needed for the tracing algorithm.
///
/// This is contained within a submodule to ensure that mutations are only
/// performed via methods on the `TracerState` struct.
mod state {
    use crate::config::StrategyConfig;
    use crate::probe::Probe;
    use crate::types::{Port, Sequence, TimeToLive};
    use std::time::Instant;

    #[derive(Debug)]
    pub struct TracerState {
        base_port: Port,
        /// The number of probes created so far.
        sent: u16,
    }

    impl TracerState {
        pub const fn new(config: StrategyConfig) -> Self {
            Self {
                base_port: config.base_port,
                sent: 0,
            }
        }

        /// Create the next probe.
        ///
        /// The Nth probe (counting from zero) has sequence N + 1 and
        /// destination port `base_port + N`.
        pub fn next_probe(&mut self, ttl: TimeToLive, sent: Instant) -> Probe {
            let probe = Probe::new(
                Sequence(self.sent.saturating_add(1)),
                ttl,
                Port(self.base_port.0.saturating_add(self.sent)),
                sent,
            );
            self.sent = self.sent.saturating_add(1);
            probe
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::types::ProbesPerHop;

        #[test]
        fn test_next_probe() {
            let config = StrategyConfig {
                base_port: Port(33000),
                probes_per_hop: ProbesPerHop(2),
                ..Default::default()
            };
            let mut state = TracerState::new(config);
            let now = Instant::now();
            let probes = (1..=3)
                .map(|ttl| state.next_probe(TimeToLive(ttl), now))
                .collect::<Vec<_>>();
            assert_eq!(
                vec![
                    (Sequence(1), TimeToLive(1), Port(33000)),
                    (Sequence(2), TimeToLive(2), Port(33001)),
                    (Sequence(3), TimeToLive(3), Port(33002)),
                ],
                probes
                    .iter()
                    .map(|p| (p.sequence, p.ttl, p.dest_port))
                    .collect::<Vec<_>>()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, IoError, IoOperation};
    use crate::net::MockNetwork;
    use crate::probe::{MockNameLookup, NumericOnly};
    use crate::types::{Port, ProbesPerHop, Sequence};
    use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
    use itertools::Itertools;
    use mockall::predicate;
    use std::collections::VecDeque;
    use std::io;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;
    use std::thread;
    use test_case::test_case;

    const ROUTER: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);

    fn make_config(first: u8, max: u8, probes: u8) -> StrategyConfig {
        StrategyConfig {
            first_ttl: TimeToLive(first),
            max_ttl: TimeToLive(max),
            probes_per_hop: ProbesPerHop(probes),
            probe_timeout: Duration::ZERO,
            ..Default::default()
        }
    }

    fn response(addr: Ipv4Addr, icmp_type: u8, icmp_code: u8, port: u16) -> ProbeResponse {
        ProbeResponse {
            addr,
            name: None,
            icmp_type,
            icmp_code,
            received: Instant::now(),
            original_dest_port: Some(Port(port)),
        }
    }

    fn time_exceeded(addr: Ipv4Addr, port: u16) -> Option<ProbeResponse> {
        Some(response(addr, 11, 0, port))
    }

    fn port_unreachable(addr: Ipv4Addr, port: u16) -> Option<ProbeResponse> {
        Some(response(addr, 3, 3, port))
    }

    /// A network which records every probe sent and replays `replies`, one per receive.
    ///
    /// Each reply is stamped as received when it is taken from the network.
    fn make_network(
        replies: Vec<Option<ProbeResponse>>,
    ) -> (MockNetwork, Arc<Mutex<Vec<Probe>>>) {
        let sent = Arc::new(Mutex::new(vec![]));
        let mut network = MockNetwork::new();
        let recorder = sent.clone();
        network.expect_send_probe().returning(move |probe| {
            recorder.lock().unwrap().push(probe);
            Ok(Instant::now())
        });
        let mut replies = VecDeque::from(replies);
        network.expect_recv_probe().returning(move |_| {
            Ok(replies.pop_front().flatten().map(|response| ProbeResponse {
                received: Instant::now(),
                ..response
            }))
        });
        (network, sent)
    }

    fn run(
        config: &StrategyConfig,
        network: impl Network,
    ) -> anyhow::Result<(CompletionReason, Vec<Hop>)> {
        run_with_names(config, network, Arc::new(NumericOnly))
    }

    fn run_with_names(
        config: &StrategyConfig,
        network: impl Network,
        names: Arc<dyn NameLookup>,
    ) -> anyhow::Result<(CompletionReason, Vec<Hop>)> {
        let mut hops = vec![];
        let strategy = Strategy::new(config, CancellationToken::new(), names, |hop: &Hop| {
            hops.push(hop.clone());
        });
        let reason = strategy.run(network)?;
        Ok((reason, hops))
    }

    #[test]
    fn test_single_hop_target() -> anyhow::Result<()> {
        let config = make_config(1, 3, 1);
        let (network, sent) = make_network(vec![port_unreachable(ROUTER, 34500)]);
        let (reason, hops) = run(&config, network)?;
        assert_eq!(CompletionReason::TargetFound, reason);
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
        assert_eq!(1, sent.lock().unwrap().len());
        Ok(())
    }

    #[test]
    fn test_responder_name_resolved_once_per_hop() -> anyhow::Result<()> {
        let config = make_config(1, 2, 3);
        let (network, _) = make_network(vec![
            time_exceeded(ROUTER, 34500),
            time_exceeded(ROUTER, 34501),
            None,
            None,
            None,
            None,
        ]);
        let mut names = MockNameLookup::new();
        names
            .expect_lookup_name()
            .with(predicate::eq(ROUTER))
            .times(1)
            .returning(|_| Some(String::from("gw.local")));
        let (_, hops) = run_with_names(&config, network, Arc::new(names))?;
        assert_eq!(
            Some(Responder {
                addr: ROUTER,
                name: Some(String::from("gw.local"))
            }),
            hops[0].responder
        );
        assert_eq!(None, hops[1].responder);
        Ok(())
    }

    /// A network which answers only the first probe sent, `delay` after sending it.
    struct DelayedReplyNetwork {
        delay: Duration,
        probes: usize,
        tx: Sender<ProbeResponse>,
        rx: Receiver<ProbeResponse>,
    }

    impl DelayedReplyNetwork {
        fn new(delay: Duration) -> Self {
            let (tx, rx) = bounded(1);
            Self {
                delay,
                probes: 0,
                tx,
                rx,
            }
        }
    }

    impl Network for DelayedReplyNetwork {
        fn send_probe(&mut self, probe: Probe) -> Result<Instant> {
            self.probes += 1;
            if self.probes == 1 {
                let tx = self.tx.clone();
                let delay = self.delay;
                let port = probe.dest_port.0;
                thread::spawn(move || {
                    thread::sleep(delay);
                    tx.send(response(ROUTER, 11, 0, port)).ok();
                });
            }
            Ok(Instant::now())
        }

        fn recv_probe(&mut self, deadline: Instant) -> Result<Option<ProbeResponse>> {
            match self.rx.recv_deadline(deadline) {
                Ok(response) => Ok(Some(response)),
                Err(RecvTimeoutError::Timeout) => Ok(None),
                Err(RecvTimeoutError::Disconnected) => Err(Error::Other(String::from("closed"))),
            }
        }
    }

    #[test]
    fn test_slow_name_lookup_does_not_delay_responses() -> anyhow::Result<()> {
        let config = StrategyConfig {
            probe_timeout: Duration::from_millis(200),
            ..make_config(1, 1, 2)
        };
        let network = DelayedReplyNetwork::new(Duration::from_millis(20));
        let mut names = MockNameLookup::new();
        names.expect_lookup_name().times(1).returning(|_| {
            thread::sleep(Duration::from_millis(300));
            Some(String::from("slow.example"))
        });
        let (_, hops) = run_with_names(&config, network, Arc::new(names))?;
        match hops[0].samples[..] {
            [ProbeOutcome::Reply(rtt), ProbeOutcome::Timeout] => {
                assert!(rtt >= Duration::from_millis(20), "{rtt:?}");
                assert!(rtt < Duration::from_millis(200), "{rtt:?}");
            }
            ref samples => panic!("unexpected samples {samples:?}"),
        }
        assert_eq!(
            Some(String::from("slow.example")),
            hops[0].responder.as_ref().and_then(|r| r.name.clone())
        );
        Ok(())
    }

    #[test_case(1, 1, 1; "one probe one hop")]
    #[test_case(1, 30, 3; "defaults")]
    #[test_case(5, 8, 2; "from ttl 5")]
    #[test_case(254, 254, 4; "max ttl only")]
    fn test_probes_per_hop(first: u8, max: u8, probes: u8) -> anyhow::Result<()> {
        let config = make_config(first, max, probes);
        let (network, sent) = make_network(vec![]);
        let (reason, hops) = run(&config, network)?;
        assert_eq!(CompletionReason::MaxTtlReached, reason);
        assert_eq!(
            (first..=max).collect::<Vec<_>>(),
            hops.iter().map(|hop| hop.ttl.0).collect::<Vec<_>>()
        );
        let sent = sent.lock().unwrap();
        let per_ttl = sent.iter().counts_by(|probe| probe.ttl.0);
        assert_eq!(usize::from(max - first) + 1, per_ttl.len());
        assert!(per_ttl.values().all(|&count| count == usize::from(probes)));
        Ok(())
    }

    #[test]
    fn test_ports_and_sequences_increase_across_hops() -> anyhow::Result<()> {
        let config = StrategyConfig {
            base_port: Port(40000),
            ..make_config(1, 3, 3)
        };
        let (network, sent) = make_network(vec![]);
        run(&config, network)?;
        let sent = sent.lock().unwrap();
        assert_eq!(
            (40000..40009).collect::<Vec<_>>(),
            sent.iter().map(|p| p.dest_port.0).collect::<Vec<_>>()
        );
        assert_eq!(
            (1..=9).collect::<Vec<_>>(),
            sent.iter().map(|p| p.sequence.0).collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_all_timeouts_advance_to_next_hop() -> anyhow::Result<()> {
        let config = make_config(5, 6, 3);
        let (network, _) = make_network(vec![
            None,
            None,
            None,
            time_exceeded(ROUTER, 34503),
            None,
            None,
        ]);
        let (reason, hops) = run(&config, network)?;
        assert_eq!(CompletionReason::MaxTtlReached, reason);
        assert_eq!(2, hops.len());
        assert_eq!(TimeToLive(5), hops[0].ttl);
        assert_eq!(None, hops[0].responder);
        assert_eq!(vec![ProbeOutcome::Timeout; 3], hops[0].samples);
        assert_eq!(TimeToLive(6), hops[1].ttl);
        assert_eq!(Some(ROUTER), hops[1].responder.as_ref().map(|r| r.addr));
        assert!(matches!(
            hops[1].samples[..],
            [
                ProbeOutcome::Reply(_),
                ProbeOutcome::Timeout,
                ProbeOutcome::Timeout
            ]
        ));
        Ok(())
    }

    #[test]
    fn test_target_found_completes_hop() -> anyhow::Result<()> {
        let target = Ipv4Addr::new(93, 184, 216, 34);
        let config = make_config(1, 30, 3);
        let (network, sent) = make_network(vec![
            time_exceeded(ROUTER, 34500),
            time_exceeded(ROUTER, 34501),
            time_exceeded(ROUTER, 34502),
            port_unreachable(target, 34503),
            None,
            port_unreachable(target, 34505),
        ]);
        let (reason, hops) = run(&config, network)?;
        assert_eq!(CompletionReason::TargetFound, reason);
        assert_eq!(2, hops.len());
        assert_eq!(Some(target), hops[1].responder.as_ref().map(|r| r.addr));
        assert_eq!(3, hops[1].samples.len());
        assert_eq!(ProbeOutcome::Timeout, hops[1].samples[1]);
        assert_eq!(6, sent.lock().unwrap().len());
        Ok(())
    }

    #[test]
    fn test_first_responder_identifies_hop() -> anyhow::Result<()> {
        let other = Ipv4Addr::new(10, 0, 0, 2);
        let config = make_config(1, 1, 3);
        let (network, _) = make_network(vec![
            None,
            time_exceeded(ROUTER, 34501),
            time_exceeded(other, 34502),
        ]);
        let (_, hops) = run(&config, network)?;
        assert_eq!(Some(ROUTER), hops[0].responder.as_ref().map(|r| r.addr));
        Ok(())
    }

    #[test_case(Correlation::Arrival, 0; "arrival")]
    #[test_case(Correlation::Embedded, 1; "embedded after drain")]
    fn test_response_read_before_send_is_discarded(
        correlation: Correlation,
        drained: usize,
    ) -> anyhow::Result<()> {
        let config = StrategyConfig {
            correlation,
            ..make_config(1, 1, 1)
        };
        let stale = response(ROUTER, 11, 0, 34500);
        let mut network = MockNetwork::new();
        network
            .expect_send_probe()
            .times(1)
            .returning(|_| Ok(Instant::now() + Duration::from_millis(1)));
        let mut replies = VecDeque::from(vec![None; drained]);
        replies.push_back(Some(stale));
        network
            .expect_recv_probe()
            .returning(move |_| Ok(replies.pop_front().flatten()));
        let (_, hops) = run(&config, network)?;
        assert_eq!(None, hops[0].responder);
        assert_eq!(vec![ProbeOutcome::Timeout], hops[0].samples);
        Ok(())
    }

    #[test]
    fn test_send_failure_skips_probe() -> anyhow::Result<()> {
        let config = make_config(1, 1, 3);
        let mut network = MockNetwork::new();
        let mut attempt = 0;
        network.expect_send_probe().times(3).returning(move |_| {
            attempt += 1;
            if attempt == 2 {
                Err(Error::ProbeFailed(IoError::Other(
                    io::Error::from(io::ErrorKind::PermissionDenied),
                    IoOperation::NewSocket,
                )))
            } else {
                Ok(Instant::now())
            }
        });
        network
            .expect_recv_probe()
            .times(2)
            .returning(|_| Ok(time_exceeded(ROUTER, 34500)));
        let (_, hops) = run(&config, network)?;
        assert!(matches!(
            hops[0].samples[..],
            [
                ProbeOutcome::Reply(_),
                ProbeOutcome::SendFailed,
                ProbeOutcome::Reply(_)
            ]
        ));
        Ok(())
    }

    #[test]
    fn test_recv_error_aborts() {
        let config = make_config(1, 2, 1);
        let mut network = MockNetwork::new();
        network
            .expect_send_probe()
            .times(1)
            .returning(|_| Ok(Instant::now()));
        network
            .expect_recv_probe()
            .times(1)
            .returning(|_| Err(Error::Other(String::from("listener stopped"))));
        let strategy = Strategy::new(
            &config,
            CancellationToken::new(),
            Arc::new(NumericOnly),
            |_: &Hop| {},
        );
        assert!(strategy.run(network).is_err());
    }

    #[test]
    fn test_cancelled_before_start() -> anyhow::Result<()> {
        let config = make_config(1, 30, 3);
        let mut network = MockNetwork::new();
        network.expect_send_probe().never();
        network.expect_recv_probe().never();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut published = 0;
        let strategy = Strategy::new(&config, cancel, Arc::new(NumericOnly), |_: &Hop| {
            published += 1;
        });
        assert_eq!(CompletionReason::Cancelled, strategy.run(network)?);
        assert_eq!(0, published);
        Ok(())
    }

    #[test]
    fn test_cancelled_mid_trace() -> anyhow::Result<()> {
        let config = make_config(1, 30, 1);
        let (network, sent) = make_network(vec![]);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let mut hops = 0;
        let strategy = Strategy::new(&config, cancel, Arc::new(NumericOnly), |_: &Hop| {
            hops += 1;
            if hops == 2 {
                token.cancel();
            }
        });
        assert_eq!(CompletionReason::Cancelled, strategy.run(network)?);
        assert_eq!(2, hops);
        assert_eq!(2, sent.lock().unwrap().len());
        Ok(())
    }

    #[test]
    fn test_arrival_accepts_any_response() -> anyhow::Result<()> {
        let config = make_config(1, 1, 1);
        let (network, _) = make_network(vec![time_exceeded(ROUTER, 1)]);
        let (_, hops) = run(&config, network)?;
        assert!(matches!(hops[0].samples[..], [ProbeOutcome::Reply(_)]));
        Ok(())
    }

    #[test]
    fn test_embedded_discards_unrelated_responses() -> anyhow::Result<()> {
        let config = StrategyConfig {
            correlation: Correlation::Embedded,
            probe_timeout: Duration::from_secs(5),
            ..make_config(1, 1, 1)
        };
        let other = Ipv4Addr::new(10, 9, 9, 9);
        let (network, _) = make_network(vec![
            // drained before sending
            time_exceeded(other, 1),
            None,
            // received while waiting
            time_exceeded(other, 2),
            Some(ProbeResponse {
                original_dest_port: None,
                ..response(other, 0, 0, 0)
            }),
            time_exceeded(ROUTER, 34500),
        ]);
        let (_, hops) = run(&config, network)?;
        assert_eq!(Some(ROUTER), hops[0].responder.as_ref().map(|r| r.addr));
        assert!(matches!(hops[0].samples[..], [ProbeOutcome::Reply(_)]));
        Ok(())
    }

    #[test]
    fn test_embedded_times_out_without_match() -> anyhow::Result<()> {
        let config = StrategyConfig {
            correlation: Correlation::Embedded,
            ..make_config(1, 1, 1)
        };
        let (network, _) = make_network(vec![None, time_exceeded(ROUTER, 34999)]);
        let (_, hops) = run(&config, network)?;
        assert_eq!(None, hops[0].responder);
        assert_eq!(vec![ProbeOutcome::Timeout], hops[0].samples);
        Ok(())
    }

    #[test]
    fn test_sequence_starts_at_one() -> anyhow::Result<()> {
        let (network, sent) = make_network(vec![]);
        run(&make_config(3, 3, 1), network)?;
        assert_eq!(Sequence(1), sent.lock().unwrap()[0].sequence);
        Ok(())
    }
}
