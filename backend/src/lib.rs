//! Marketplace backend library.
//!
//! Hexagonal layout: [`domain`] holds the model, services and ports;
//! [`inbound`] adapts HTTP requests onto services; [`outbound`] implements
//! the ports over PostgreSQL, memory, bcrypt, JWT, SendGrid and the local
//! filesystem.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::{TRACE_ID_HEADER, Trace};
