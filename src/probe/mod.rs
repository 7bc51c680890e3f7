// src/probe/mod.rs
mod prober;
mod result;

pub use prober::{describe_transport_error, HttpProber, Prober};
pub use result::{ProbeRequest, ProbeResult, TIMEOUT_ERROR};
