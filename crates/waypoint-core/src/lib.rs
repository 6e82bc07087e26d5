//! Waypoint - UDP path discovery.
//!
//! This crate provides the probe/response correlation engine used by the
//! `waypoint` command line tool.
//!
//! UDP probes are sent to the target with increasing time-to-live values,
//! one at a time, and the ICMP messages they elicit are received on a raw
//! socket by a listener running on its own thread. Each response is matched
//! to the probe that is waiting for it and the results for every hop are
//! published as soon as the hop completes. The trace ends when the target
//! answers with an ICMP port unreachable or the maximum time-to-live has been
//! probed.
//!
//! # Example
//!
//! The following example traces to a target with the default configuration
//! and prints each hop:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use std::net::Ipv4Addr;
//! use waypoint_core::Builder;
//!
//! let reason = Builder::new(Ipv4Addr::new(93, 184, 216, 34))
//!     .build()?
//!     .run_with(|hop| println!("{hop:?}"))?;
//! println!("{reason:?}");
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Tracer`].
//! - [`Tracer::run`] - Run the tracer on the current thread.
//! - [`Tracer::run_with`] - Run the tracer with a custom hop handler.
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::use_self,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![deny(unsafe_code)]

mod builder;
mod codec;
mod config;
mod constants;
mod error;
mod net;
mod probe;
mod strategy;
mod tracer;
mod types;

pub use builder::Builder;
pub use codec::{decode_response, encode_probe};
pub use config::{defaults, Correlation};
pub use constants::{MAX_PACKET_SIZE, MAX_TTL, PAYLOAD_SIZE};
pub use error::{Error, IoError, IoOperation, Result};
pub use probe::{Hop, NameLookup, NumericOnly, Probe, ProbeOutcome, ProbeResponse, Responder};
pub use strategy::CompletionReason;
pub use tracer::Tracer;
pub use types::{Port, ProbesPerHop, Sequence, TimeToLive};
pub use tokio_util::sync::CancellationToken;
