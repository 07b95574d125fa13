pub mod path;
pub mod track;

pub use path::Path;
pub use track::{BoardPoint, Track, TrackSet};
