//! Probes for individual metric domains.
//!
//! Each probe wraps one unreliable data source: a command-line tool, a
//! kernel interface, or the in-process stats interface. The parsing half of
//! every probe is a pure function from raw text to a typed result so it can
//! be tested against fixture output without the tool installed.
//!
//! Failure contract: a missing or erroring source reports
//! [`ProbeError::Unavailable`], output that does not match the expected
//! shape reports [`ProbeError::Parse`], and a source that succeeds but
//! lacks the expected label returns its documented sentinel string. The
//! snapshot assembler degrades failures to placeholders; nothing here can
//! abort a cycle.

pub mod battery;
pub mod bluetooth;
pub mod disk;
pub mod host_identity;
pub mod network;
pub mod portscan;
pub mod ssh;
pub mod system;

use tokio::process::Command;

use crate::error::ProbeError;

/// Result of a single probe invocation.
pub type ProbeResult<T = String> = Result<T, ProbeError>;

/// Run an external command and return its stdout as UTF-8 text.
///
/// A missing binary or a non-zero exit both map to
/// [`ProbeError::Unavailable`]; callers never need to distinguish the two.
/// The child is killed when the returned future is dropped, so a probe
/// abandoned at its deadline does not leak the process.
pub(crate) async fn run_command(program: &str, args: &[&str]) -> ProbeResult {
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ProbeError::unavailable(format!("{}: {}", program, e)))?;

    if !output.status.success() {
        return Err(ProbeError::unavailable(format!(
            "{} exited with {}",
            program, output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Scan command output for a `Label: value` line and return the trimmed
/// value, or `None` if no line carries the label.
pub(crate) fn labeled_value(output: &str, label: &str) -> Option<String> {
    for line in output.lines() {
        if line.contains(label) {
            if let Some((_, value)) = line.split_once(':') {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_value_found() {
        let output = "  Static hostname: box\n  Operating System: Debian GNU/Linux 12\n";
        assert_eq!(
            labeled_value(output, "Operating System"),
            Some("Debian GNU/Linux 12".to_string())
        );
    }

    #[test]
    fn test_labeled_value_missing_label() {
        let output = "  Static hostname: box\n";
        assert_eq!(labeled_value(output, "Operating System"), None);
    }

    #[test]
    fn test_labeled_value_no_colon() {
        assert_eq!(labeled_value("Operating System Debian", "Operating System"), None);
    }

    #[tokio::test]
    async fn test_run_command_missing_binary_is_unavailable() {
        let err = run_command("hostprobe-no-such-tool", &[]).await.unwrap_err();
        assert!(matches!(err, ProbeError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_run_command_nonzero_exit_is_unavailable() {
        let err = run_command("false", &[]).await.unwrap_err();
        assert!(matches!(err, ProbeError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_abandoned_command_does_not_leak_child() {
        use std::time::Duration;

        let result = tokio::time::timeout(
            Duration::from_millis(200),
            run_command("sleep", &["12345"]),
        )
        .await;
        assert!(result.is_err(), "sleep finished before the deadline");

        // The kill signal is delivered on drop; give the child a moment
        // to exit and be reaped.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let survivors = std::process::Command::new("pgrep")
            .args(["-f", "^sleep 12345$"])
            .output()
            .unwrap();
        assert!(
            !survivors.status.success(),
            "child survived the deadline, pids: {}",
            String::from_utf8_lossy(&survivors.stdout)
        );
    }
}
