//! Integration tests for the reveal flow
//!
//! These tests run the repository, auth checks, and reveal machine
//! against a real on-disk store the way the CLI wires them together.

pub mod admin_unlock;
pub mod helpers;
pub mod reveal_flow;
pub mod store_watch;
