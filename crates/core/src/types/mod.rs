//! Core types for Tangelo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::OrderRef;
