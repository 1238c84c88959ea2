//! Test and development helpers.
pub mod mock_provider;
