//! Request and response types for the HTTP API

pub mod query;
pub mod response;
