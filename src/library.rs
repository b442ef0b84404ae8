//! Archive model and loaders.
//!
//! An archive is a list of eras, each holding an ordered list of tracks. It
//! can be scanned from a directory tree (one subdirectory per era) or read
//! from a TOML catalog.

mod catalog;
mod display;
mod model;
mod scan;

pub use catalog::load_catalog;
pub use display::{duration_label, parse_duration_label, slug};
pub use model::*;
pub use scan::scan;
