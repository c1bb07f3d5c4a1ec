//! Core data model shared by the client and the server

pub mod batch;
