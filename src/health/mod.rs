// src/health/mod.rs
mod checker;
mod ordering;

pub use checker::{CheckError, ServiceHealthChecker};
pub use ordering::sort_for_display;
