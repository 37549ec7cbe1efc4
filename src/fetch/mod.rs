//! Shared fetch policy and HTTP transport.

pub mod client;
pub mod policy;

pub use client::{HttpTransport, Transport};
pub use policy::FetchPolicy;
