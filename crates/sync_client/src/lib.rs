//! Offline write queue for the folio admin.
//!
//! Writes made while the server is unreachable are stored in a local
//! [`Queue`] and replayed through the sync endpoints once a health probe
//! succeeds again.

pub mod client;
pub mod config;
pub mod error;
pub mod queue;
pub mod replay;

pub use client::{Endpoint, HttpTransport, SyncTransport};
pub use error::{AppError, ClientError, Result};
pub use queue::{NewChange, Queue, QueuedChange};
pub use replay::{ReplayReport, Replayer, SyncState, endpoint_for};
