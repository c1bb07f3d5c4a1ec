//! Test suite for portal-batch
//!
//! ## Test Categories
//!
//! ### 1. Common Utilities (`common/`)
//! - A real portal server on an ephemeral port
//! - Client construction against that server
//!
//! ### 2. Integration Tests (`integration/`)
//! - Batch client against the actix batch endpoint, end to end
//! - Configuration loading and validation
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all tests
//! cargo test
//!
//! # Run only unit tests
//! cargo test --lib
//!
//! # Run integration tests
//! cargo test --test lib
//! ```

pub mod common;
pub mod integration;
