//! Application configuration, loaded from environment variables.
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: token secret and expiry
//! - [`storage`]: upload directory for profile images

pub mod cors;
pub mod database;
pub mod jwt;
pub mod storage;
