//! Record/replay of port interactions for deterministic runs and tests.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;

/// Port name of the text generator.
pub const TEXT_GENERATOR_PORT: &str = "text_generator";

/// Port name of the publish transport.
pub const PUBLISHER_PORT: &str = "publisher";
