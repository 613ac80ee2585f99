//! Request middleware and extractors.
//!
//! [`auth`] provides the `AuthUser` extractor: handlers that take it only run
//! for requests carrying a valid `Authorization: Bearer <token>` header.

pub mod auth;
