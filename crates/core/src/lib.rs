//! Pet Buddy Core - Shared types library.
//!
//! This crate provides the domain types used across the Pet Buddy components:
//! - `server` - The REST backend
//! - `cli` - Operator commands (admin roles, indexes)
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. Conversions to BSON are gated behind the `bson`
//! feature so the crate stays usable without the document store driver.
//!
//! # Modules
//!
//! - [`types`] - Emails, document ids, amounts, statuses and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
