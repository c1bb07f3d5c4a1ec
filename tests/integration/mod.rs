//! Integration tests for portal-batch
//!
//! These tests run the batch client against the real actix server.

pub mod config_validation_tests;
pub mod end_to_end_tests;
