//! User entity wiring for the generic resource actor.

pub mod entity;
pub mod error;

pub use error::*;
