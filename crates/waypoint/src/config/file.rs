use crate::config::{constants, DnsResolveMethodConfig, LogFormat, LogSpanEvents};
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use waypoint_core::defaults;

/// Read the config from the given path.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> anyhow::Result<ConfigFile> {
    let contents = fs::read_to_string(path.as_ref())
        .with_context(|| format!("config file not found: {}", path.as_ref().display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("invalid config file: {}", path.as_ref().display()))
}

/// The toml configuration file.
///
/// Every section and every value is optional.
#[derive(Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub waypoint: Option<ConfigWaypoint>,
    pub strategy: Option<ConfigStrategy>,
    pub dns: Option<ConfigDns>,
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigWaypoint {
    pub log_format: Option<LogFormat>,
    pub log_filter: Option<String>,
    pub log_span_events: Option<LogSpanEvents>,
}

impl Default for ConfigWaypoint {
    fn default() -> Self {
        Self {
            log_format: Some(constants::DEFAULT_LOG_FORMAT),
            log_filter: Some(String::from(constants::DEFAULT_LOG_FILTER)),
            log_span_events: Some(constants::DEFAULT_LOG_SPAN_EVENTS),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigStrategy {
    pub first_ttl: Option<u8>,
    pub max_ttl: Option<u8>,
    pub port: Option<u16>,
    pub queries: Option<u8>,
    #[serde(default, deserialize_with = "humantime_deser")]
    pub wait: Option<Duration>,
    pub debug: Option<bool>,
    pub strict: Option<bool>,
}

impl Default for ConfigStrategy {
    fn default() -> Self {
        Self {
            first_ttl: Some(defaults::DEFAULT_FIRST_TTL),
            max_ttl: Some(defaults::DEFAULT_MAX_TTL),
            port: Some(defaults::DEFAULT_BASE_PORT),
            queries: Some(defaults::DEFAULT_PROBES_PER_HOP),
            wait: Some(defaults::DEFAULT_PROBE_TIMEOUT),
            debug: Some(defaults::DEFAULT_SOCKET_DEBUG),
            strict: Some(constants::DEFAULT_STRICT),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigDns {
    pub numeric: Option<bool>,
    pub dns_resolve_method: Option<DnsResolveMethodConfig>,
    #[serde(default, deserialize_with = "humantime_deser")]
    pub dns_timeout: Option<Duration>,
    #[serde(default, deserialize_with = "humantime_deser")]
    pub dns_ttl: Option<Duration>,
}

impl Default for ConfigDns {
    fn default() -> Self {
        Self {
            numeric: Some(constants::DEFAULT_NUMERIC),
            dns_resolve_method: Some(constants::DEFAULT_DNS_RESOLVE_METHOD),
            dns_timeout: Some(constants::DEFAULT_DNS_TIMEOUT),
            dns_ttl: Some(constants::DEFAULT_DNS_TTL),
        }
    }
}

fn humantime_deser<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    humantime::parse_duration(&String::deserialize(deserializer)?)
        .map_err(serde::de::Error::custom)
        .map(Some)
}
