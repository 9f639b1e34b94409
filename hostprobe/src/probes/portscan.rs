//! Local open-port scan probe (`nmap -sT -O localhost`).
//!
//! Privileged and slow: the scan takes seconds and is the probe most
//! likely to hang or be missing entirely. The assembler runs it under its
//! own deadline so it can never stall the rest of the cycle.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{run_command, ProbeResult};

static PORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)/tcp\s+(\S+)\s+(\S+)").expect("valid port line regex"));

/// One scanned port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntry {
    pub port: String,
    pub state: String,
    pub service: String,
}

/// TCP-connect + OS-fingerprint scan of the local host.
pub async fn port_scan() -> ProbeResult<Vec<PortEntry>> {
    let out = run_command("sudo", &["nmap", "-sT", "-O", "localhost"]).await?;
    Ok(parse_scan(&out))
}

/// Collect `<port>/tcp <state> <service>` lines into ordered entries.
pub fn parse_scan(output: &str) -> Vec<PortEntry> {
    output
        .lines()
        .filter_map(|line| PORT_LINE.captures(line))
        .map(|caps| PortEntry {
            port: caps[1].to_string(),
            state: caps[2].to_string(),
            service: caps[3].to_string(),
        })
        .collect()
}
