//! Daemon: event store, socket IPC, statistics.
//!
//! This crate provides the timeblock server daemon that handles:
//! - Unix socket IPC for client communication
//! - The in-memory event store with conflict checking
//! - Statistics aggregation and SVG chart rendering
//! - Holiday and weather enrichment of event details
//!
//! # Example
//!
//! ```rust,no_run
//! use timeblock_server::{ServerConfig, SocketServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let server = SocketServer::new(config).await?;
//!
//!     // Handle connections...
//!     Ok(())
//! }
//! ```

mod chart;
mod config;
mod error;
mod handler;
mod signals;
mod socket;
mod store;

pub use chart::render_chart;
pub use config::{DEFAULT_FORECAST_POINT, ServerConfig, default_socket_path};
pub use error::{ServerError, ServerResult};
pub use handler::{
    RequestHandler, ServerState, SharedState, make_connection_handler, new_shared_state,
};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
pub use socket::{Connection, SocketServer};
pub use store::EventStore;
