use crate::config::{DnsResolveMethodConfig, LogFormat, LogSpanEvents};
use std::time::Duration;

/// The default value for `numeric`.
pub const DEFAULT_NUMERIC: bool = false;

/// The default value for `strict`.
pub const DEFAULT_STRICT: bool = false;

/// The default value for `dns-resolve-method`.
pub const DEFAULT_DNS_RESOLVE_METHOD: DnsResolveMethodConfig = DnsResolveMethodConfig::System;

/// The default value for `dns-timeout`.
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_millis(5000);

/// The default value for `dns-ttl`.
pub const DEFAULT_DNS_TTL: Duration = Duration::from_secs(300);

/// The default value for `log-format`.
pub const DEFAULT_LOG_FORMAT: LogFormat = LogFormat::Pretty;

/// The default value for `log-filter`.
pub const DEFAULT_LOG_FILTER: &str = "waypoint=debug";

/// The default value for `log-span-events`.
pub const DEFAULT_LOG_SPAN_EVENTS: LogSpanEvents = LogSpanEvents::Off;
