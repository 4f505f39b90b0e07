//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod auth;
pub mod dto;
pub mod enquiries;
pub mod error;
pub mod health;
pub mod notifications;
pub mod products;
pub mod routes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;
pub mod validation;

pub use error::ApiResult;
