//! Aggregate disk usage probe (`df -h --total`).

use super::{run_command, ProbeResult};
use crate::error::ProbeError;

/// Aggregate disk usage across all mounted filesystems, rendered as one
/// human-readable line.
pub async fn disk_usage() -> ProbeResult {
    let out = run_command("df", &["-h", "--total"]).await?;
    parse_total_line(&out)
}

/// Find the `total` aggregate row emitted by `df --total` and render its
/// size/used/available/percent fields.
pub fn parse_total_line(output: &str) -> ProbeResult {
    for line in output.lines() {
        if !line.contains("total") {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() >= 5 {
            return Ok(format!(
                "Total Space: {} | Used Space: {} | Available Space: {} | Percentage of Use: {}",
                fields[1], fields[2], fields[3], fields[4]
            ));
        }
        return Err(ProbeError::parse(format!(
            "total row has {} fields, expected at least 5",
            fields.len()
        )));
    }

    Err(ProbeError::parse("no total row in df output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DF_OUTPUT: &str = "\
Filesystem      Size  Used Avail Use% Mounted on
udev            3.9G     0  3.9G   0% /dev
tmpfs           796M  1.1M  795M   1% /run
/dev/sda1        49G   12G   35G  26% /
tmpfs           3.9G     0  3.9G   0% /dev/shm
total            58G   13G   43G  24% -
";

    #[test]
    fn test_parse_total_line() {
        let line = parse_total_line(DF_OUTPUT).unwrap();
        assert_eq!(
            line,
            "Total Space: 58G | Used Space: 13G | Available Space: 43G | Percentage of Use: 24%"
        );
    }

    #[test]
    fn test_parse_total_line_missing_row() {
        let out = "Filesystem Size Used Avail Use% Mounted on\n/dev/sda1 49G 12G 35G 26% /\n";
        assert!(matches!(
            parse_total_line(out),
            Err(ProbeError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_total_line_truncated_row() {
        let out = "total 58G 13G\n";
        assert!(matches!(
            parse_total_line(out),
            Err(ProbeError::Parse(_))
        ));
    }
}
