//! Batch wire format
//!
//! Types exchanged between the client dispatcher and the `/api/batch`
//! endpoint, plus correlation id generation.

mod id;
mod types;


pub use id::RequestIdGenerator;
pub use types::{
    BATCH_PATH, BatchOptions, BatchRequest, BatchRequestPayload, BatchResponse, BatchResult,
    HttpMethod, QueryParams,
};
