// Job applications: records, the in-memory pipeline, and the Generate/Send flows.

pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod service;
