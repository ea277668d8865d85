/// Data layer: dump parsing, pulse detection, tempo inference.
///
/// Architecture:
/// ```text
///   dump text ("time from pos" / "pos from time" sections)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  split sections → build two Series
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  pulse    │   │  tempo    │  per Series
///   └──────────┘   └──────────┘
///        │              │
///        ▼              ▼
///   ┌──────────────────────┐
///   │ analysis::Analysis     │  handed to the plots / summary / export
///   └──────────────────────┘
/// ```

pub mod analysis;
pub mod error;
pub mod loader;
pub mod model;
pub mod pulse;
pub mod tempo;
