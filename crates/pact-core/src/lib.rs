pub mod config;
pub mod error;
pub mod op_state;
pub mod sync;

pub use config::{ApiConfig, CalendarConfig, Config, ValidationResult};
pub use error::{AppError, ConfigError, NetworkError};
pub use op_state::{PendingOps, RowOp};
pub use sync::{ChangeKind, Subscription, ViewSyncBus, ViewSyncEvent, COLLECTION_CHANGED};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Pact core initialized");
    Ok(())
}
