//! ArUco dictionaries and a dependency-free marker detector.
//!
//! - embedded `DICT_4X4_50` / `DICT_4X4_100` tables ([`builtins`]),
//! - code matching under rotation ([`Matcher`]),
//! - a threshold-and-blob [`QuadDetector`] implementing
//!   [`marker_triptych_core::MarkerDetector`],
//! - marker rendering and a [`SyntheticSource`] for camera-free runs.

pub mod builtins;
mod decode;
mod detect;
mod dictionary;
mod matcher;
mod render;
mod synthetic;
mod threshold;

pub use decode::{CellDecoder, DecodeConfig, Observation};
pub use detect::{QuadDetector, QuadDetectorParams};
pub use dictionary::Dictionary;
pub use matcher::{rotate_code_u64, Match, Matcher};
pub use render::{marker_gray, paint_marker, MarkerLayout};
pub use synthetic::{SyntheticConfig, SyntheticSource};
