//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the playback session,
//! list selection, active view and the metadata edit form.

mod model;

pub use model::*;
