//! Snapshot data model and the per-cycle assembler.
//!
//! A [`Snapshot`] is one complete, self-contained telemetry record. The
//! assembler guarantees every documented field is present every cycle: a
//! failed probe degrades to its placeholder string and is logged, never
//! propagated. The receiver's parser therefore needs no optional-field
//! handling.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::probes::portscan::{self, PortEntry};
use crate::probes::system::SystemProbes;
use crate::probes::{battery, bluetooth, disk, host_identity, network, ssh, ProbeResult};

pub const NO_HOSTNAME_INFO: &str = "No hostname info available";
pub const NO_IP_INFO: &str = "No IP address found";
pub const NO_CPU_INFO: &str = "No CPU info available";
pub const NO_MEMORY_INFO: &str = "No memory info available";
pub const NO_UPTIME_INFO: &str = "No uptime info available";
pub const NO_HARDWARE_INFO: &str = "No hardware info available";
pub const NO_VENDOR_INFO: &str = "No vendor info available";
pub const NO_OS_INFO: &str = host_identity::NO_OS_INFO;
pub const NO_FIREWALL_INFO: &str = "No firewall info available";
pub const NO_DISK_INFO: &str = "No disk info available";
pub const NO_LINK_INFO: &str = network::NO_LINK_INFO;
pub const NO_BATTERY_INFO: &str = battery::NO_BATTERY_INFO;
pub const NO_BLUETOOTH_INFO: &str = "No Bluetooth info available";
pub const NO_SCAN_INFO: &str = "No scan info available";
pub const NO_OPEN_PORTS: &str = "No open ports detected";
pub const SCAN_TIMED_OUT: &str = "Port scan timed out";

/// Port-scan field: the ordered port list when the scan produced entries,
/// otherwise a message string such as [`NO_OPEN_PORTS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortScanResult {
    Ports(Vec<PortEntry>),
    Message(String),
}

impl PortScanResult {
    fn message(msg: &str) -> Self {
        Self::Message(msg.to_string())
    }
}

/// One complete telemetry record for a single collection cycle.
///
/// Immutable once handed to the transport; discarded after encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub hostname: String,
    pub ip: String,
    pub cpu_model: String,
    pub total_memory: String,
    pub used_memory: String,
    pub uptime: String,
    pub hardware_model: String,
    pub hardware_vendor: String,
    pub os_name: String,
    pub firewall_status: String,
    pub disk_usage: String,
    pub network_link: String,
    pub battery: String,
    pub bluetooth: String,
    pub ssh_peers: Vec<String>,
    pub open_ports: PortScanResult,
    /// Cycle-local RFC 3339 timestamp, not source-data time.
    pub timestamp: String,
}

/// Wire-level wrapper: the snapshot under one fixed key.
///
/// No schema version and no sequence number; the collector treats the
/// connection as one TCP-ordered stream of messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "host_report")]
    pub report: Snapshot,
}

impl Envelope {
    pub fn new(report: Snapshot) -> Self {
        Self { report }
    }
}

/// Runs every enabled probe once per cycle and merges the results.
pub struct SnapshotAssembler {
    config: ProbeConfig,
    system: SystemProbes,
    /// A missing scan tool is a provisioning failure, reported once.
    scan_tool_warned: bool,
}

impl SnapshotAssembler {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            system: SystemProbes::new(),
            scan_tool_warned: false,
        }
    }

    /// Assemble one complete snapshot.
    ///
    /// Stats-interface probes run first (they need `&mut` access to the
    /// shared handles); the command probes are independent and run
    /// concurrently, so cycle latency is bounded by the slowest probe
    /// rather than the sum. The port scan additionally runs under its own
    /// deadline.
    pub async fn assemble(&mut self) -> Snapshot {
        let hostname = degrade("hostname", self.system.hostname(), NO_HOSTNAME_INFO);
        let ip = degrade("ip", self.system.primary_ipv4(), NO_IP_INFO);
        let cpu_model = degrade("cpu_model", self.system.cpu_model(), NO_CPU_INFO);
        let (total_memory, used_memory) = match self.system.memory() {
            Ok(pair) => pair,
            Err(e) => {
                warn!(probe = "memory", error = %e, "probe degraded");
                (NO_MEMORY_INFO.to_string(), NO_MEMORY_INFO.to_string())
            }
        };
        let uptime = degrade("uptime", self.system.uptime(), NO_UPTIME_INFO);

        let enable = self.config.enable.clone();
        let scan_deadline = Duration::from_secs(self.config.port_scan_timeout_secs);

        let (hw_model, hw_vendor, os, firewall, disk_usage, link, battery, bluetooth, peers, scan) =
            tokio::join!(
                maybe(enable.hardware, host_identity::hardware_model()),
                maybe(enable.hardware, host_identity::hardware_vendor()),
                maybe(enable.os, host_identity::os_name()),
                maybe(enable.firewall, host_identity::firewall_status()),
                maybe(enable.disk, disk::disk_usage()),
                maybe(
                    enable.network,
                    network::link_descriptor(&self.config.network_interface)
                ),
                maybe(
                    enable.battery,
                    battery::battery_status(&self.config.battery_device)
                ),
                maybe(enable.bluetooth, bluetooth::bluetooth_state()),
                maybe(enable.ssh, ssh::ssh_peers()),
                async {
                    if !enable.port_scan {
                        return None;
                    }
                    Some(timeout(scan_deadline, portscan::port_scan()).await)
                },
            );

        let ssh_peers = match peers {
            Some(Ok(peers)) => peers,
            Some(Err(e)) => {
                warn!(probe = "ssh", error = %e, "probe degraded");
                Vec::new()
            }
            None => Vec::new(),
        };

        let bluetooth = match bluetooth {
            Some(Ok(state)) => state.as_str().to_string(),
            Some(Err(e)) => {
                warn!(probe = "bluetooth", error = %e, "probe degraded");
                NO_BLUETOOTH_INFO.to_string()
            }
            None => NO_BLUETOOTH_INFO.to_string(),
        };

        let open_ports = self.fold_scan(scan);

        Snapshot {
            hostname,
            ip,
            cpu_model,
            total_memory,
            used_memory,
            uptime,
            hardware_model: degrade_opt("hardware_model", hw_model, NO_HARDWARE_INFO),
            hardware_vendor: degrade_opt("hardware_vendor", hw_vendor, NO_VENDOR_INFO),
            os_name: degrade_opt("os_name", os, NO_OS_INFO),
            firewall_status: degrade_opt("firewall", firewall, NO_FIREWALL_INFO),
            disk_usage: degrade_opt("disk", disk_usage, NO_DISK_INFO),
            network_link: degrade_opt("network", link, NO_LINK_INFO),
            battery: degrade_opt("battery", battery, NO_BATTERY_INFO),
            bluetooth,
            ssh_peers,
            open_ports,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    fn fold_scan(
        &mut self,
        outcome: Option<Result<ProbeResult<Vec<PortEntry>>, tokio::time::error::Elapsed>>,
    ) -> PortScanResult {
        match outcome {
            None => PortScanResult::message(NO_SCAN_INFO),
            Some(Err(_elapsed)) => {
                warn!(probe = "port_scan", "scan deadline exceeded, cycle proceeds");
                PortScanResult::message(SCAN_TIMED_OUT)
            }
            Some(Ok(Ok(entries))) if entries.is_empty() => {
                PortScanResult::message(NO_OPEN_PORTS)
            }
            Some(Ok(Ok(entries))) => PortScanResult::Ports(entries),
            Some(Ok(Err(e @ ProbeError::Unavailable(_)))) => {
                if self.scan_tool_warned {
                    debug!(probe = "port_scan", error = %e, "scan tool still unavailable");
                } else {
                    warn!(probe = "port_scan", error = %e, "scan tool unavailable");
                    self.scan_tool_warned = true;
                }
                PortScanResult::message(NO_SCAN_INFO)
            }
            Some(Ok(Err(e))) => {
                warn!(probe = "port_scan", error = %e, "probe degraded");
                PortScanResult::message(NO_SCAN_INFO)
            }
        }
    }
}

/// Run a probe future only when enabled; disabled probes render their
/// placeholder without logging.
async fn maybe<T, F>(enabled: bool, fut: F) -> Option<ProbeResult<T>>
where
    F: std::future::Future<Output = ProbeResult<T>>,
{
    if enabled {
        Some(fut.await)
    } else {
        None
    }
}

fn degrade(probe: &'static str, result: ProbeResult, placeholder: &str) -> String {
    match result {
        Ok(v) => v,
        Err(e) => {
            warn!(probe = probe, error = %e, "probe degraded");
            placeholder.to_string()
        }
    }
}

fn degrade_opt(probe: &'static str, result: Option<ProbeResult>, placeholder: &str) -> String {
    match result {
        Some(result) => degrade(probe, result, placeholder),
        None => placeholder.to_string(),
    }
}
