//! Tangelo Core - Shared types library.
//!
//! This crate provides common types used across Tangelo components:
//! - `storefront` - Public-facing e-commerce site and checkout
//! - `integration-tests` - End-to-end tests against a running storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and order references

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
