//! This crate provides a cheaply cloneable, caching, forward and reverse DNS
//! resolver.
//!
//! Reverse lookups are blocking but bounded by the configured timeout. The
//! outcome of every reverse lookup is cached per address and reused until it
//! is older than the configured time-to-live (TTL). Lookups which timed out
//! are not reused and will be retried.
//!
//! # Example
//!
//! The following example resolves a hostname using the Cloudflare 1.1.1.1
//! public DNS service and then performs a reverse lookup of the first address:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use waypoint_dns::{Builder, DnsResolver, ResolveMethod, Resolver};
//!
//! let config = Builder::new()
//!     .resolve_method(ResolveMethod::Cloudflare)
//!     .build();
//! let resolver = DnsResolver::start(config)?;
//! let addrs = resolver.lookup("example.com")?;
//! if let Some(addr) = addrs.iter().next() {
//!     let entry = resolver.reverse_lookup(*addr);
//!     println!("{addr} is {entry}");
//! }
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod config;
mod dns_resolver;
mod resolver;

pub use config::{Builder, Config, ResolveMethod};
pub use dns_resolver::DnsResolver;
pub use resolver::{DnsEntry, Error, ResolvedIpAddrs, Resolver, Result};
