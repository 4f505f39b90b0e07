//! Test helpers for inbound HTTP components.

pub use crate::test_support::TestApp;

/// Fresh application state over empty in-memory tables.
pub fn fixture_state() -> TestApp {
    TestApp::new()
}
