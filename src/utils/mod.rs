//! Shared helpers.

pub mod exec;
pub mod hash;
pub mod mime;
pub mod path;
