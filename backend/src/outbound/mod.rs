//! Adapters implementing the domain ports.
//!
//! - `persistence`: Diesel/PostgreSQL repositories.
//! - `memory`: the same repositories over in-process tables.
//! - `security`: bcrypt password digests and signed bearer tokens.
//! - `email`: queued best-effort delivery through SendGrid or the log.
//! - `storage`: filesystem object store for uploads.

pub mod email;
pub mod memory;
pub mod persistence;
pub mod security;
pub mod storage;
