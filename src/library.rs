//! Track catalog: directory scanning plus the artist/lyrics metadata store.

mod metadata;
mod model;
mod scan;

pub use metadata::{MetadataMap, MetadataStore};
pub use model::{Track, TrackMetadata, UNKNOWN_ARTIST};
pub use scan::scan;
