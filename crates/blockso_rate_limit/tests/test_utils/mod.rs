//! Test utilities for rate limiting tests.
//!
//! This module provides a scripted upstream that records when it was called.

pub mod scripted_api;

#[allow(unused_imports)]
pub use scripted_api::{ScriptedApi, StubFailure, StubReply, StubResponse};
