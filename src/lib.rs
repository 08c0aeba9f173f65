//! Dream interpretation service
//!
//! Accepts a free-text dream description, asks an LLM provider (OpenAI or
//! Gemini, with an optional single fallback hop) for a reading, and
//! normalizes the reply into an interpretation, up to six lucky numbers and a
//! confidence label.

pub mod ai;
pub mod app;
pub mod error;
pub mod fallback;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
