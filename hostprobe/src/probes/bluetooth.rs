//! Bluetooth adapter state probe (`hciconfig`).

use std::fmt;

use super::{run_command, ProbeResult};

/// Three-state Bluetooth adapter classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BluetoothState {
    /// No `hci` adapter interface in the output.
    Absent,
    /// An adapter exists but is administratively down.
    Off,
    /// An adapter exists and is up.
    On,
}

impl BluetoothState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "ABSENT",
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }
}

impl fmt::Display for BluetoothState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter state of the first Bluetooth controller.
pub async fn bluetooth_state() -> ProbeResult<BluetoothState> {
    let out = run_command("hciconfig", &[]).await?;
    Ok(classify(&out))
}

/// Classify `hciconfig` output into the three adapter states.
pub fn classify(output: &str) -> BluetoothState {
    if !output.contains("hci") {
        return BluetoothState::Absent;
    }
    if output.contains("DOWN") {
        return BluetoothState::Off;
    }
    BluetoothState::On
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_absent() {
        assert_eq!(classify(""), BluetoothState::Absent);
        assert_eq!(classify("\n"), BluetoothState::Absent);
    }

    #[test]
    fn test_classify_off() {
        let out = "\
hci0:	Type: Primary  Bus: USB
	BD Address: 00:1A:7D:DA:71:13  ACL MTU: 310:10  SCO MTU: 64:8
	DOWN
	RX bytes:574 acl:0 sco:0 events:30 errors:0
";
        assert_eq!(classify(out), BluetoothState::Off);
    }

    #[test]
    fn test_classify_on() {
        let out = "\
hci0:	Type: Primary  Bus: USB
	BD Address: 00:1A:7D:DA:71:13  ACL MTU: 310:10  SCO MTU: 64:8
	UP RUNNING PSCAN
	RX bytes:1274 acl:0 sco:0 events:51 errors:0
";
        assert_eq!(classify(out), BluetoothState::On);
    }
}
