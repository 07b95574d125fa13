pub mod error;
pub mod fixture;
pub mod geometry;
pub mod host;
pub mod math;
pub mod operations;
pub mod plot;

pub use error::{Result, ViaFenceError};
pub use geometry::{BoardPoint, Track, TrackSet};
pub use math::Point2;
pub use operations::{generate_via_fence, FenceOptions, ViaFence};
