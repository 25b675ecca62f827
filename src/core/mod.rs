//! Core Module
//!
//! This module contains the fundamental components of the data-access layer:
//! the database accessor itself, the driver seam it runs on, and the shared
//! error taxonomy.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{DataError, Result};
