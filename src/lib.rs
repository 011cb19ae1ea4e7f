//! Adminlite Data-Access Core
//!
//! Session-bootstrap and dual-mode data-access layer for the adminlite
//! content-management dashboard: a live REST backend when reachable, an
//! in-memory fallback store when it is not, and one normalized internal
//! model either way.

pub mod client;
pub mod core;
pub mod gateway;
pub mod models;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use crate::core::{AdminError, Config, Logger, Result, RevalidationBus};
pub use client::transport::{HttpTransport, ReqwestTransport};
pub use client::ApiClient;
pub use gateway::{DataSource, ResourceGateway, Served};
pub use models::{RecordId, Resource, Role, User};
pub use session::{Session, SessionBootstrapper, SessionState, TokenStore};
pub use store::MockFallbackStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
