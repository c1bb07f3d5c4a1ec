//! Services module
//!
//! Business data served by the portal routes

pub mod catalog;

pub use catalog::{CatalogStore, Lead, NewLead, Project, Service};
