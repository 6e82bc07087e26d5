use crate::config::Config;
use crate::resolver::{DnsEntry, ResolvedIpAddrs, Resolver, Result};
use std::net::IpAddr;
use std::sync::Arc;

/// A cheaply cloneable, caching, forward and reverse DNS resolver.
///
/// This type is `Send` and `Sync` and so may be shared between threads.
#[derive(Clone)]
pub struct DnsResolver {
    inner: Arc<inner::DnsResolver>,
}

impl DnsResolver {
    /// Create and start a new `DnsResolver`.
    pub fn start(config: Config) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(inner::DnsResolver::start(config)?),
        })
    }

    /// Get the `Config`.
    #[must_use]
    pub fn config(&self) -> &Config {
        self.inner.config()
    }

    /// Flush the cache of responses.
    pub fn flush(&self) {
        self.inner.flush();
    }
}

impl Resolver for DnsResolver {
    fn lookup(&self, hostname: impl AsRef<str>) -> Result<ResolvedIpAddrs> {
        self.inner.lookup(hostname.as_ref())
    }
    fn reverse_lookup(&self, addr: impl Into<IpAddr>) -> DnsEntry {
        self.inner.reverse_lookup(addr.into())
    }
}

/// Private impl of resolver.
mod inner {
    use crate::config::{Config, ResolveMethod};
    use crate::resolver::{DnsEntry, Error, ResolvedIpAddrs, Result};
    use crossbeam::channel::bounded;
    use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
    use hickory_resolver::error::ResolveErrorKind;
    use hickory_resolver::system_conf::read_system_conf;
    use hickory_resolver::Resolver;
    use itertools::Itertools;
    use parking_lot::RwLock;
    use std::collections::HashMap;
    use std::net::IpAddr;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, SystemTime};

    /// The name of the threads which perform system reverse lookups.
    const SYSTEM_LOOKUP_THREAD_NAME: &str = "waypoint-rdns";

    /// A cache entry for a reverse DNS lookup.
    #[derive(Debug, Clone)]
    pub(super) struct CacheEntry {
        /// The DNS entry to cache.
        pub(super) entry: DnsEntry,
        /// The timestamp of the entry.
        pub(super) timestamp: SystemTime,
    }

    impl CacheEntry {
        pub(super) const fn new(entry: DnsEntry, timestamp: SystemTime) -> Self {
            Self { entry, timestamp }
        }

        /// May this entry be returned without performing the lookup again?
        ///
        /// Timed out lookups are always retried.
        pub(super) fn is_fresh(&self, now: SystemTime, ttl: Duration) -> bool {
            !matches!(self.entry, DnsEntry::Timeout(_))
                && now.duration_since(self.timestamp).unwrap_or_default() <= ttl
        }
    }

    #[derive(Clone)]
    enum DnsProvider {
        Hickory(Arc<Resolver>),
        DnsLookup,
    }

    /// Resolver implementation.
    pub(super) struct DnsResolver {
        config: Config,
        provider: DnsProvider,
        addr_cache: RwLock<HashMap<IpAddr, CacheEntry>>,
    }

    impl DnsResolver {
        pub(super) fn start(config: Config) -> Result<Self> {
            tracing::debug!(?config);
            let provider = match config.resolve_method {
                ResolveMethod::System => DnsProvider::DnsLookup,
                ResolveMethod::Resolv => {
                    let (resolver_cfg, options) = read_system_conf()?;
                    hickory_provider(resolver_cfg, options, &config)?
                }
                ResolveMethod::Google => {
                    hickory_provider(ResolverConfig::google(), ResolverOpts::default(), &config)?
                }
                ResolveMethod::Cloudflare => hickory_provider(
                    ResolverConfig::cloudflare(),
                    ResolverOpts::default(),
                    &config,
                )?,
            };
            Ok(Self {
                config,
                provider,
                addr_cache: RwLock::new(HashMap::new()),
            })
        }

        pub(super) const fn config(&self) -> &Config {
            &self.config
        }

        /// Lookup the addresses of `hostname`, IPv4 addresses first.
        pub(super) fn lookup(&self, hostname: &str) -> Result<ResolvedIpAddrs> {
            let all = match &self.provider {
                DnsProvider::Hickory(resolver) => resolver
                    .lookup_ip(hostname)
                    .map_err(|err| Error::LookupFailed(Box::new(err)))?
                    .iter()
                    .collect::<Vec<_>>(),
                DnsProvider::DnsLookup => dns_lookup::lookup_host(hostname)
                    .map_err(|err| Error::LookupFailed(Box::new(err)))?,
            };
            tracing::debug!(hostname, ?all);
            Ok(ResolvedIpAddrs(ipv4_first(all)))
        }

        pub(super) fn reverse_lookup(&self, addr: IpAddr) -> DnsEntry {
            let now = SystemTime::now();
            if let Some(cached) = self.addr_cache.read().get(&addr) {
                if cached.is_fresh(now, self.config.ttl) {
                    return cached.entry.clone();
                }
            }
            let entry = reverse_lookup(&self.provider, addr, self.config.timeout);
            tracing::trace!(%addr, ?entry);
            self.addr_cache
                .write()
                .insert(addr, CacheEntry::new(entry.clone(), now));
            entry
        }

        pub(super) fn flush(&self) {
            self.addr_cache.write().clear();
        }
    }

    /// A hickory resolver bounded by the configured timeout which prefers IPv4.
    fn hickory_provider(
        resolver_cfg: ResolverConfig,
        mut options: ResolverOpts,
        config: &Config,
    ) -> Result<DnsProvider> {
        options.timeout = config.timeout;
        options.ip_strategy = LookupIpStrategy::Ipv4thenIpv6;
        let resolver = Resolver::new(resolver_cfg, options)?;
        Ok(DnsProvider::Hickory(Arc::new(resolver)))
    }

    /// Order addresses IPv4 first, keeping the resolver order within each family.
    pub(super) fn ipv4_first(all: Vec<IpAddr>) -> Vec<IpAddr> {
        all.into_iter()
            .unique()
            .sorted_by_key(IpAddr::is_ipv6)
            .collect()
    }

    fn reverse_lookup(provider: &DnsProvider, addr: IpAddr, timeout: Duration) -> DnsEntry {
        match provider {
            DnsProvider::DnsLookup => system_reverse_lookup(addr, timeout),
            DnsProvider::Hickory(resolver) => match resolver.reverse_lookup(addr) {
                Ok(name) => {
                    let hostnames = name
                        .into_iter()
                        .map(|mut s| {
                            s.0.set_fqdn(false);
                            s
                        })
                        .map(|s| s.to_string())
                        .collect();
                    DnsEntry::Resolved(addr, hostnames)
                }
                Err(err) => match err.kind() {
                    ResolveErrorKind::NoRecordsFound { .. } => DnsEntry::NotFound(addr),
                    ResolveErrorKind::Timeout => DnsEntry::Timeout(addr),
                    _ => DnsEntry::Failed(addr),
                },
            },
        }
    }

    /// Reverse lookup using the OS resolver, abandoning the lookup after `timeout`.
    ///
    /// The OS resolver cannot be interrupted and so the lookup runs on its own
    /// thread, which is left to finish in the background if it times out.
    fn system_reverse_lookup(addr: IpAddr, timeout: Duration) -> DnsEntry {
        let (tx, rx) = bounded(1);
        let spawned = thread::Builder::new()
            .name(String::from(SYSTEM_LOOKUP_THREAD_NAME))
            .spawn(move || tx.send(dns_lookup::lookup_addr(&addr)).ok());
        if let Err(err) = spawned {
            tracing::warn!(%err, "failed to spawn reverse lookup thread");
            return DnsEntry::Failed(addr);
        }
        // we can't distinguish between a failed lookup or a genuine error, and
        // the OS resolver returns the numeric address when there is no name.
        match rx.recv_timeout(timeout) {
            Ok(Ok(name)) if name != addr.to_string() => DnsEntry::Resolved(addr, vec![name]),
            Ok(_) => DnsEntry::NotFound(addr),
            Err(_) => DnsEntry::Timeout(addr),
        }
    }
}
