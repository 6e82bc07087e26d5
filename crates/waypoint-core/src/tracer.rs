use crate::probe::NameLookup;
use crate::config::{Correlation, ListenerConfig, ProberConfig, StrategyConfig};
use crate::error::Result;
use crate::probe::Hop;
use crate::strategy::CompletionReason;
use crate::{Port, ProbesPerHop, TimeToLive};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A traceroute implementation.
///
/// See the [`crate`] documentation for more information.
///
/// Note that this is type cheaply cloneable.
#[derive(Debug, Clone)]
pub struct Tracer {
    inner: Arc<inner::TracerInner>,
}

impl Tracer {
    /// Create a `Tracer`.
    ///
    /// Use the [`crate::Builder`] type to create a [`Tracer`].
    #[must_use]
    pub(crate) fn new(
        listener_config: ListenerConfig,
        prober_config: ProberConfig,
        strategy_config: StrategyConfig,
        drop_privileges: bool,
        name_lookup: Arc<dyn NameLookup>,
    ) -> Self {
        Self {
            inner: Arc::new(inner::TracerInner::new(
                listener_config,
                prober_config,
                strategy_config,
                drop_privileges,
                name_lookup,
            )),
        }
    }

    /// Run the [`Tracer`].
    ///
    /// This method blocks until the target is found, every TTL up to the
    /// maximum has been probed, the trace is cancelled or the trace fails.
    ///
    /// # See Also
    ///
    /// - [`Tracer::run_with`] - Run the tracer with a custom hop handler.
    pub fn run(&self) -> Result<CompletionReason> {
        self.inner.run_with(|_| {})
    }

    /// Run the [`Tracer`] with a custom hop handler.
    ///
    /// The handler is called on the calling thread once for every hop, in TTL
    /// order, as soon as all probes for that hop have completed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use waypoint_core::Builder;
    ///
    /// let tracer = Builder::new(std::net::Ipv4Addr::new(1, 1, 1, 1)).build()?;
    /// tracer.run_with(|hop| println!("{} {:?}", hop.ttl.0, hop.responder))?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Fails with [`crate::Error::ListenerFailed`] if the ICMP socket cannot be opened.
    pub fn run_with<F: FnMut(&Hop)>(&self, func: F) -> Result<CompletionReason> {
        self.inner.run_with(func)
    }

    /// The token which cancels this trace.
    ///
    /// Cancelling stops the trace before the next probe is sent or while it
    /// is waiting for a response, and `run` returns
    /// [`CompletionReason::Cancelled`].
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.inner.cancel_token()
    }

    #[must_use]
    pub fn target_addr(&self) -> Ipv4Addr {
        self.inner.prober_config().target_addr
    }

    #[must_use]
    pub fn first_ttl(&self) -> TimeToLive {
        self.inner.strategy_config().first_ttl
    }

    #[must_use]
    pub fn max_ttl(&self) -> TimeToLive {
        self.inner.strategy_config().max_ttl
    }

    #[must_use]
    pub fn base_port(&self) -> Port {
        self.inner.strategy_config().base_port
    }

    #[must_use]
    pub fn probes_per_hop(&self) -> ProbesPerHop {
        self.inner.strategy_config().probes_per_hop
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        self.inner.strategy_config().probe_timeout
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.inner.listener_config().read_timeout
    }

    #[must_use]
    pub fn correlation(&self) -> Correlation {
        self.inner.strategy_config().correlation
    }

    #[must_use]
    pub fn socket_debug(&self) -> bool {
        self.inner.prober_config().socket_debug
    }

    #[must_use]
    pub fn drop_privileges(&self) -> bool {
        self.inner.drop_privileges()
    }
}

mod inner {
    use crate::probe::NameLookup;
    use crate::config::{ListenerConfig, ProberConfig, StrategyConfig};
    use crate::error::{Error, Result};
    use crate::net::channel::Channel;
    use crate::net::listener::Listener;
    use crate::net::SocketImpl;
    use crate::probe::Hop;
    use crate::strategy::{CompletionReason, Strategy};
    use crossbeam::channel::bounded;
    use std::fmt::{Debug, Formatter};
    use std::sync::Arc;
    use std::thread;
    use tokio_util::sync::CancellationToken;
    use tracing::instrument;
    use waypoint_privilege::Privilege;

    /// The name of the thread which runs the listener.
    const LISTENER_THREAD_NAME: &str = "waypoint-listener";

    pub(super) struct TracerInner {
        listener_config: ListenerConfig,
        prober_config: ProberConfig,
        strategy_config: StrategyConfig,
        drop_privileges: bool,
        name_lookup: Arc<dyn NameLookup>,
        cancel: CancellationToken,
    }

    impl Debug for TracerInner {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TracerInner")
                .field("listener_config", &self.listener_config)
                .field("prober_config", &self.prober_config)
                .field("strategy_config", &self.strategy_config)
                .field("drop_privileges", &self.drop_privileges)
                .field("cancel", &self.cancel)
                .finish_non_exhaustive()
        }
    }

    impl TracerInner {
        pub(super) fn new(
            listener_config: ListenerConfig,
            prober_config: ProberConfig,
            strategy_config: StrategyConfig,
            drop_privileges: bool,
            name_lookup: Arc<dyn NameLookup>,
        ) -> Self {
            Self {
                listener_config,
                prober_config,
                strategy_config,
                drop_privileges,
                name_lookup,
                cancel: CancellationToken::new(),
            }
        }

        pub(super) fn run_with<F: FnMut(&Hop)>(&self, func: F) -> Result<CompletionReason> {
            self.run_internal(func).inspect_err(|err| {
                tracing::error!(?err);
            })
        }

        pub(super) fn cancel_token(&self) -> CancellationToken {
            self.cancel.clone()
        }

        pub(super) const fn listener_config(&self) -> &ListenerConfig {
            &self.listener_config
        }

        pub(super) const fn prober_config(&self) -> &ProberConfig {
            &self.prober_config
        }

        pub(super) const fn strategy_config(&self) -> &StrategyConfig {
            &self.strategy_config
        }

        pub(super) const fn drop_privileges(&self) -> bool {
            self.drop_privileges
        }

        /// Open the listener, start it on its own thread and then probe.
        ///
        /// The listener socket is open before the first probe is sent. The
        /// listener is stopped and joined before this returns.
        #[instrument(skip_all, level = "trace")]
        fn run_internal<F: FnMut(&Hop)>(&self, func: F) -> Result<CompletionReason> {
            let listener = Listener::<SocketImpl>::open(&self.listener_config)?;
            if self.drop_privileges {
                Privilege::drop_privileges()?;
            }
            let (tx, rx) = bounded(1);
            let listener_cancel = self.cancel.child_token();
            let token = listener_cancel.clone();
            let handle = thread::Builder::new()
                .name(String::from(LISTENER_THREAD_NAME))
                .spawn(move || listener.run(&tx, &token))
                .map_err(|err| Error::Other(err.to_string()))?;
            let channel = Channel::<SocketImpl>::new(&self.prober_config, rx);
            let strategy = Strategy::new(
                &self.strategy_config,
                self.cancel.clone(),
                self.name_lookup.clone(),
                func,
            );
            let result = strategy.run(channel);
            listener_cancel.cancel();
            handle
                .join()
                .map_err(|_| Error::Other(String::from("listener thread panicked")))?;
            tracing::debug!(?result, "trace finished");
            result
        }
    }
}
