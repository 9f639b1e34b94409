//! Network link probe (`ip addr`).
//!
//! Advisory only: an absent interface degrades to [`NO_LINK_INFO`] rather
//! than erroring, so a laptop roaming between interfaces never spoils the
//! cycle.

use super::{run_command, ProbeResult};

/// Placeholder when the configured interface is absent or carries no
/// link-layer address.
pub const NO_LINK_INFO: &str = "No link info";

/// Link descriptor for the configured primary interface, e.g.
/// `"enp0s3:link/ether"`.
pub async fn link_descriptor(interface: &str) -> ProbeResult {
    let out = run_command("ip", &["addr"]).await?;
    Ok(parse_link_descriptor(&out, interface))
}

/// Confirm `interface` appears in `ip addr` output with a `link/ether`
/// line following it.
pub fn parse_link_descriptor(output: &str, interface: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if !line.contains(interface) {
            continue;
        }
        // The link-layer line follows the interface header; the scan
        // runs to the end of the output.
        for following in &lines[i..] {
            if following.contains("link/ether") {
                return format!("{}:link/ether", interface);
            }
        }
    }

    NO_LINK_INFO.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP_ADDR_OUTPUT: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
    inet 127.0.0.1/8 scope host lo
2: enp0s3: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP
    link/ether 08:00:27:4e:66:a1 brd ff:ff:ff:ff:ff:ff
    inet 192.168.11.42/24 brd 192.168.11.255 scope global dynamic enp0s3
";

    #[test]
    fn test_parse_link_descriptor() {
        assert_eq!(
            parse_link_descriptor(IP_ADDR_OUTPUT, "enp0s3"),
            "enp0s3:link/ether"
        );
    }

    #[test]
    fn test_parse_link_descriptor_interface_absent() {
        assert_eq!(parse_link_descriptor(IP_ADDR_OUTPUT, "wlan0"), NO_LINK_INFO);
    }

    #[test]
    fn test_parse_link_descriptor_no_ether_line() {
        let out = "1: lo: <LOOPBACK,UP,LOWER_UP>\n    link/loopback 00:00:00:00:00:00\n";
        assert_eq!(parse_link_descriptor(out, "lo"), NO_LINK_INFO);
    }
}
