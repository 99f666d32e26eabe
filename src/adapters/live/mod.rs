//! Live adapters that talk to real HTTP APIs.

pub mod blotato;
pub mod gemini;
pub mod media_host;
pub mod openai;
