pub mod camera;
pub mod config;
/// Terrain Occlusion - CPU hierarchical occlusion culling for voxel worlds
/// Fixed-point rasterization of chunk boxes into a Morton-ordered bitmask
pub mod occlusion;
pub mod perf;

pub use camera::Camera;
pub use config::{ConfigError, OcclusionConfig};
pub use occlusion::{
    HierarchicalBitmask, PackedBox, RasterMode, SceneContext, TerrainOccluder, RANGE_EXTREME,
    RANGE_FAR, RANGE_MID, RANGE_NEAR,
};
pub use perf::{CounterSnapshot, FunctionCounters, OcclusionStats, FUNCTION_COUNTERS};
