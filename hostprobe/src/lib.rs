//! Host telemetry probe.
//!
//! Samples operating-system and hardware state on a fixed interval and
//! streams one normalized JSON snapshot per cycle to a collector over a
//! persistent WebSocket connection:
//!
//! - [`probes`] - one probe per metric domain, each an isolated parser
//!   over one unreliable data source
//! - [`snapshot`] - the `Snapshot` record, wire `Envelope` and the
//!   per-cycle assembler with its degrade-instead-of-abort policy
//! - [`transport`] - the persistent collector connection
//! - [`scheduler`] - the collection loop with reconnect backoff
//! - [`config`] - JSON5 configuration
//! - [`error`] - probe and transport error types

pub mod config;
pub mod error;
pub mod probes;
pub mod scheduler;
pub mod snapshot;
pub mod transport;

// Re-export commonly used types at the crate root
pub use config::{AgentConfig, ConfigError, EnabledProbes, LoggingConfig, ProbeConfig};
pub use error::{ProbeError, TransportError};
pub use scheduler::{Backoff, Scheduler};
pub use snapshot::{Envelope, PortScanResult, Snapshot, SnapshotAssembler};
pub use transport::CollectorClient;

/// Initialize tracing with the given level, honoring `RUST_LOG` when set.
pub fn init_tracing(level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))?;

    Ok(())
}
