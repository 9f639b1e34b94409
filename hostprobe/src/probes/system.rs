//! Probes backed by the in-process system stats interface (`sysinfo`).
//!
//! These have a much lower failure surface than the command-scraping
//! probes, but restricted or heavily virtualized environments can still
//! leave individual values unreported, so every accessor returns a
//! [`ProbeResult`] like the rest.

use sysinfo::{Networks, System};

use super::ProbeResult;
use crate::error::ProbeError;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Stats-interface probes: hostname, primary IPv4, CPU model, memory,
/// uptime. Holds the `sysinfo` handles so refreshes reuse allocations
/// across cycles.
pub struct SystemProbes {
    system: System,
    networks: Networks,
}

impl SystemProbes {
    pub fn new() -> Self {
        Self {
            system: System::new_all(),
            networks: Networks::new_with_refreshed_list(),
        }
    }

    /// Host name as reported by the OS.
    pub fn hostname(&self) -> ProbeResult {
        if let Some(name) = System::host_name() {
            return Ok(name);
        }
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .ok_or_else(|| ProbeError::unavailable("hostname not reported"))
    }

    /// First IPv4 address on an interface that is not loopback.
    pub fn primary_ipv4(&mut self) -> ProbeResult {
        self.networks.refresh(true);

        for (name, data) in self.networks.list() {
            if name == "lo" {
                continue;
            }
            for ip_network in data.ip_networks() {
                let addr = ip_network.addr;
                if addr.is_ipv4() && !addr.is_loopback() {
                    return Ok(addr.to_string());
                }
            }
        }

        Err(ProbeError::unavailable("no non-loopback IPv4 address"))
    }

    /// CPU model string of the first logical CPU.
    pub fn cpu_model(&mut self) -> ProbeResult {
        self.system.refresh_cpu_usage();
        self.system
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .ok_or_else(|| ProbeError::unavailable("no CPU reported"))
    }

    /// Total and used memory as formatted strings:
    /// `"7.76 GB"` and `"3.02 GB (38.91%)"`.
    pub fn memory(&mut self) -> ProbeResult<(String, String)> {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let used = self.system.used_memory();
        if total == 0 {
            return Err(ProbeError::unavailable("total memory reported as zero"));
        }

        Ok(format_memory(total, used))
    }

    /// Uptime formatted as `"<h>h<m>m<s>s"`.
    pub fn uptime(&self) -> ProbeResult {
        let secs = System::uptime();
        if secs == 0 {
            return Err(ProbeError::unavailable("uptime not reported"));
        }
        Ok(format_uptime(secs))
    }
}

impl Default for SystemProbes {
    fn default() -> Self {
        Self::new()
    }
}

/// Render total/used memory in GB with the used percentage appended.
pub fn format_memory(total_bytes: u64, used_bytes: u64) -> (String, String) {
    let total = format!("{:.2} GB", total_bytes as f64 / GIB);
    let pct = if total_bytes > 0 {
        used_bytes as f64 / total_bytes as f64 * 100.0
    } else {
        0.0
    };
    let used = format!("{:.2} GB ({:.2}%)", used_bytes as f64 / GIB, pct);
    (total, used)
}

/// Render an uptime in seconds as `"<h>h<m>m<s>s"`.
pub fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{}h{}m{}s", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_memory() {
        let total = (7.76 * GIB) as u64;
        let used = (3.02 * GIB) as u64;
        let (total_s, used_s) = format_memory(total, used);
        assert_eq!(total_s, "7.76 GB");
        assert!(used_s.starts_with("3.02 GB ("));
        assert!(used_s.ends_with("%)"));
    }

    #[test]
    fn test_format_memory_zero_total() {
        let (total_s, used_s) = format_memory(0, 0);
        assert_eq!(total_s, "0.00 GB");
        assert_eq!(used_s, "0.00 GB (0.00%)");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0h0m0s");
        assert_eq!(format_uptime(59), "0h0m59s");
        assert_eq!(format_uptime(3_723), "1h2m3s");
        // Hours are not rolled into days.
        assert_eq!(format_uptime(93_784), "26h3m4s");
    }
}
