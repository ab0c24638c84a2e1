//! proctor-client — learning-backend REST integration.
//!
//! Implements the `LearningApi` trait for the platform's REST backend,
//! plus a configurable mock for driving the session flow in tests.

pub mod config;
pub mod mock;
pub mod rest;

pub use config::{create_api, load_config, load_config_from, ProctorConfig};
pub use mock::MockLearningApi;
pub use rest::RestLearningApi;
