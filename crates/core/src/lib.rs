//! Core business logic for scisync.

pub mod services;

pub use services::*;
