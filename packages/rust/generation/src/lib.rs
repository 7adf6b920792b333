//! Prompt building, pacing, and the generation service client.
//!
//! This crate provides:
//! - [`prompt`] — definition and article prompt templates
//! - [`TextGenerator`] — the generation collaborator seam, with [`OpenAiClient`]
//!   as the HTTP implementation
//! - [`RateLimiter`] — pacing between calls, with [`FixedIntervalGate`]

pub mod client;
pub mod limiter;
pub mod prompt;

pub use client::{OpenAiClient, TextGenerator};
pub use limiter::{FixedIntervalGate, RateLimiter};
pub use prompt::{PromptMode, build_prompt};
