//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the archive, the visible
//! section, selection and search state.

mod model;

pub use model::*;
