//! Data models for the jokes server.

mod joke;

pub use joke::*;
