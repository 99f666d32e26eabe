//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`.

pub mod media_host;
pub mod publisher;
pub mod text_generator;

pub use media_host::MediaHost;
pub use publisher::{PostTransport, TransportResponse};
pub use text_generator::{CompletionRequest, TextGenerator};
