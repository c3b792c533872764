// src/lib.rs

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod summary;

pub use error::{ReportError, Result};
