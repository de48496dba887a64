//! Jury node: runs the case lifecycle as a service.
//!
//! The node is the central coordinator that:
//! - Opens the LMDB store and checks its integrity
//! - Builds the case lifecycle and wires its events into metrics
//! - Runs the periodic sweep that closes expired cases
//! - Serves the HTTP API
//! - Shuts everything down cleanly on SIGINT/SIGTERM

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod shutdown;
pub mod sweeper;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::JuryNode;
pub use shutdown::ShutdownController;
pub use sweeper::{run_sweep, spawn_sweeper};
