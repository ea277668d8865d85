//! Timing Scope: sanity checks for a transport engine's position/time
//! mappings.
//!
//! A dump holds two sections, `time from pos` and `pos from time`, each a list
//! of `position ; time` rows. [`data`] turns it into series, pulse markers and
//! inferred tempo; [`app`] plots them.

pub mod app;
pub mod capture;
pub mod color;
pub mod data;
pub mod state;
pub mod synth;
pub mod ui;
