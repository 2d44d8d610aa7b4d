//! Integration tests run against the in-memory store

mod api_tests;
mod lifecycle_tests;
