//! Session lifecycle: token persistence and startup bootstrap

pub mod bootstrap;
pub mod token;

pub use bootstrap::{Session, SessionBootstrapper, SessionState};
pub use token::{CookieAttributes, SameSite, TokenStore};
