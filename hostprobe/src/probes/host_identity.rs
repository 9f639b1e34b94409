//! Hardware identity, OS identity and firewall status probes.
//!
//! All four shell out to system-information tools (dmidecode and ufw need
//! sudo) and scan the output for a known label. A missing tool is `Unavailable`; a tool that
//! runs but never prints the label yields the probe's sentinel string.
//! The two outcomes are deliberately distinct: the first is an environment
//! problem worth logging, the second is a legitimate answer.

use super::{labeled_value, run_command, ProbeResult};

/// Sentinel when `hostnamectl` output carries no "Operating System" line.
pub const NO_OS_INFO: &str = "No OS info available";

/// Sentinel when `ufw status` output carries no "Status" line.
pub const NO_FIREWALL_STATUS: &str = "No status info available";

/// Hardware product name via `dmidecode -s system-product-name`.
pub async fn hardware_model() -> ProbeResult {
    let out = run_command("sudo", &["dmidecode", "-s", "system-product-name"]).await?;
    Ok(out.trim().to_string())
}

/// Hardware manufacturer via `dmidecode -s system-manufacturer`.
pub async fn hardware_vendor() -> ProbeResult {
    let out = run_command("sudo", &["dmidecode", "-s", "system-manufacturer"]).await?;
    Ok(out.trim().to_string())
}

/// Operating system name from the "Operating System" line of `hostnamectl`.
pub async fn os_name() -> ProbeResult {
    let out = run_command("hostnamectl", &[]).await?;
    Ok(parse_os_name(&out))
}

/// Firewall status from the "Status" line of `ufw status`.
pub async fn firewall_status() -> ProbeResult {
    let out = run_command("sudo", &["ufw", "status"]).await?;
    Ok(parse_firewall_status(&out))
}

/// Extract the OS name from `hostnamectl` output.
pub fn parse_os_name(output: &str) -> String {
    labeled_value(output, "Operating System").unwrap_or_else(|| NO_OS_INFO.to_string())
}

/// Extract the firewall status from `ufw status` output.
pub fn parse_firewall_status(output: &str) -> String {
    labeled_value(output, "Status").unwrap_or_else(|| NO_FIREWALL_STATUS.to_string())
}
