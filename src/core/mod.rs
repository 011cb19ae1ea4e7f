//! Core functionality: configuration, errors, logging, revalidation bus

pub mod config;
pub mod error;
pub mod event_bus;
pub mod logging;

pub use config::Config;
pub use error::{AdminError, ErrorDetail, Result};
pub use event_bus::RevalidationBus;
pub use logging::Logger;
