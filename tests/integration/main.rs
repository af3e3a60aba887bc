//! Integration tests for the scrape pipeline and result store
//!
//! These tests use wiremock to serve pages and tempfile to hold SQLite
//! databases, exercising the public API end to end.

mod repository_tests;
mod scrape_tests;
