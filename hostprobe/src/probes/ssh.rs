//! Active inbound SSH session probe (`ss -tuna`).

use super::{run_command, ProbeResult};

/// Remote IPs with an established connection to port 22, de-duplicated,
/// loopback excluded. May legitimately be empty.
pub async fn ssh_peers() -> ProbeResult<Vec<String>> {
    let out = run_command("ss", &["-tuna"]).await?;
    Ok(parse_established_peers(&out))
}

/// Extract remote peer addresses from an `ss -tuna` table.
///
/// A session line must mention port 22 and carry the ESTAB marker. The
/// peer endpoint is the last whitespace field; the port suffix is stripped
/// on the final colon so bracketed IPv6 peers survive.
pub fn parse_established_peers(output: &str) -> Vec<String> {
    let mut peers: Vec<String> = Vec::new();

    for line in output.lines() {
        if !line.contains(":22") || !line.contains("ESTAB") {
            continue;
        }
        let Some(endpoint) = line.split_whitespace().last() else {
            continue;
        };
        let Some((ip, _port)) = endpoint.rsplit_once(':') else {
            continue;
        };
        let ip = ip.trim_matches(|c| c == '[' || c == ']');
        if is_loopback(ip) {
            continue;
        }
        if !peers.iter().any(|p| p == ip) {
            peers.push(ip.to_string());
        }
    }

    peers
}

fn is_loopback(ip: &str) -> bool {
    ip == "127.0.0.1" || ip == "localhost" || ip == "::1"
}
