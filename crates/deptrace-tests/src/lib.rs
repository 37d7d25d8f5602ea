//! Shared fixtures for deptrace end-to-end tests

pub mod fixtures;
pub mod test_env;

// Re-export key testing utilities
pub use fixtures::{AnalysisFixture, dependencies_body, versions_body};
pub use test_env::TestEnvironment;
