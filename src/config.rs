//! Startup configuration
//!
//! The target address is compiled in and can be overridden per run on the
//! command line. Nothing is read from the environment or persisted.

use clap::Args;

/// Rover WebSocket endpoint used when none is given
pub const DEFAULT_ADDRESS: &str = "192.168.4.1:81";

/// Command-line options shared by every binary that connects to a rover
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Rover address as host:port (ws:// prefix optional)
    #[arg(short, long, default_value = DEFAULT_ADDRESS)]
    pub address: String,
}

impl Default for TargetArgs {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
        }
    }
}
