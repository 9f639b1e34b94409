//! Battery status probe (`upower -i <device>`).

use super::{run_command, ProbeResult};

/// Sentinel when the device report carries none of the expected labels.
pub const NO_BATTERY_INFO: &str = "No Battery info available";

/// Battery state for the configured UPower device path, comma-joined as
/// `{state, time, percentage}`.
pub async fn battery_status(device: &str) -> ProbeResult {
    let out = run_command("upower", &["-i", device]).await?;
    Ok(parse_battery(&out))
}

/// Pick the labeled battery fields out of `upower -i` output.
///
/// When both "time to full" and "time to empty" appear (brief overlap
/// around a charger plug/unplug), "time to full" wins: a charging battery
/// reports fill time, a discharging one reports drain time.
pub fn parse_battery(output: &str) -> String {
    let mut state = None;
    let mut time_to_empty = None;
    let mut time_to_full = None;
    let mut percentage = None;

    for line in output.lines() {
        let line = line.trim();
        if line.contains("time to empty") {
            time_to_empty = Some(line.to_string());
        } else if line.contains("time to full") {
            time_to_full = Some(line.to_string());
        } else if line.contains("state") {
            state = Some(line.to_string());
        } else if line.contains("percentage") {
            percentage = Some(line.to_string());
        }
    }

    let mut parts = Vec::new();
    if let Some(state) = state {
        parts.push(state);
    }
    if let Some(time) = time_to_full.or(time_to_empty) {
        parts.push(time);
    }
    if let Some(percentage) = percentage {
        parts.push(percentage);
    }

    if parts.is_empty() {
        return NO_BATTERY_INFO.to_string();
    }
    parts.join(", ")
}
