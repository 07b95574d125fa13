pub mod fence;
pub mod offset;

pub use fence::{generate_via_fence, FenceOptions, FenceRail, ViaFence, ViaKind, ViaPoint};
pub use offset::{ClipperEngine, EndCap, OffsetEngine};
