//! Chat transport adapter.
//!
//! A thin HTTP boundary between the chat platform and the core pipeline:
//! it turns incoming messages into coordinator calls and renders prompts
//! and delivery outcomes back as JSON. No business logic lives here.

pub mod handlers;
pub mod models;
