use itertools::Itertools;
use std::io::Write;
use std::net::Ipv4Addr;
use waypoint_core::{Hop, ProbeOutcome, Responder, PAYLOAD_SIZE};

/// Writes a trace report in the classic traceroute layout.
pub struct Report<W: Write> {
    writer: W,
}

impl<W: Write> Report<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the line which precedes the first hop.
    pub fn preamble(&mut self, host: &str, addr: Ipv4Addr, max_ttl: u8) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "traceroute to {host} ({addr}), {max_ttl} hops max, {PAYLOAD_SIZE} byte packets"
        )?;
        self.writer.flush()
    }

    /// Write the line for a completed hop.
    pub fn hop(&mut self, hop: &Hop) -> std::io::Result<()> {
        writeln!(self.writer, "{}", format_hop(hop))?;
        self.writer.flush()
    }
}

/// Format a hop as `ttl  name (addr)  x.xxx ms  *`.
///
/// Probes which could not be sent are omitted.
fn format_hop(hop: &Hop) -> String {
    let responder = hop.responder.as_ref().map(format_responder);
    let samples = hop.samples.iter().filter_map(format_sample);
    std::iter::once(hop.ttl.0.to_string())
        .chain(responder)
        .chain(samples)
        .join("  ")
}

fn format_responder(responder: &Responder) -> String {
    match &responder.name {
        Some(name) => format!("{name} ({})", responder.addr),
        None => format!("{addr} ({addr})", addr = responder.addr),
    }
}

fn format_sample(outcome: &ProbeOutcome) -> Option<String> {
    match outcome {
        ProbeOutcome::Reply(rtt) => Some(format!("{:.3} ms", rtt.as_secs_f64() * 1000_f64)),
        ProbeOutcome::Timeout => Some(String::from("*")),
        ProbeOutcome::SendFailed => None,
    }
}
