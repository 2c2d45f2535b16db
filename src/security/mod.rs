//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! GET /metrics
//!     → basic_auth.rs (decode Authorization: Basic)
//!     → credentials.rs (bcrypt compare against the password file)
//!     → Prometheus exposition, or 401 + WWW-Authenticate
//! ```
//!
//! # Design Decisions
//! - Fail closed: a missing or unreadable password file denies every request
//! - The password file is read once at startup
//! - bcrypt runs on the blocking pool, off the request executor

pub mod basic_auth;
pub mod credentials;

pub use basic_auth::basic_auth;
pub use credentials::{hash_password, Credentials, CredentialsError};
