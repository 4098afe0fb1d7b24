//! Utility modules for qlogo-fetch
//!
//! - `files`: Directory management, atomic writes and identifier lists
//! - `http`: HTTP client utilities

pub mod files;
pub mod http;
