//! Shared utilities.
//!
//! - [`errors`]: application error type and envelope rendering
//! - [`jwt`]: token creation and verification
//! - [`password`]: password hashing and verification
//! - [`response`]: uniform success envelope
//! - [`serde`]: custom serde deserialization helpers

pub mod errors;
pub mod jwt;
pub mod password;
pub mod response;
pub mod serde;
