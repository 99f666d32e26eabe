//! Adapter implementations for port traits.
//!
//! - `live/`: HTTP clients for the generation, publishing and media APIs
//! - `recording/`: wrap a live adapter and write each call to a cassette
//! - `replaying/`: answer calls from a recorded cassette, no network

pub mod live;
pub mod recording;
pub mod replaying;
