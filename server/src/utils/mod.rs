//! Shared utility functions

pub mod crypto;
pub mod file;
