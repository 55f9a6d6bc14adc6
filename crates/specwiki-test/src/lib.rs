//! Test harnesses for specwiki.
//!
//! Provides `TestServer` for end-to-end tests of the serving mode against
//! the shared fixtures under `tests/fixtures`.

pub mod server;

pub use server::{fixture_model, fixture_path, TestError, TestServer};
