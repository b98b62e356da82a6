//! Integration test crate for the MTK ledger.
//!
//! This crate exists solely to run end-to-end tests against the public API.
//! It has no public API - all functionality is in the test modules.

#![forbid(unsafe_code)]
