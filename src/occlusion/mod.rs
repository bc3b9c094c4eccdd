/// CPU occlusion culling for voxel terrain
/// Fixed-point software rasterization into a hierarchical occupancy bitmask
pub mod bitmask;
pub mod constants;
pub mod faces;
pub mod occluder;
pub mod packed_box;
pub mod projection;
pub mod raster_dump;
pub mod rasterizer;
pub mod scene;

pub use bitmask::{HierarchicalBitmask, PixelAddress};
pub use faces::{BoxCorners, BoxFace, BoxProjector, DrawListFaceCuller, FaceSet};
pub use occluder::TerrainOccluder;
pub use packed_box::{PackedBox, RANGE_EXTREME, RANGE_FAR, RANGE_MID, RANGE_NEAR};
pub use projection::{ClipPolygon, FixedPointProjector, ProjectedVertex};
pub use raster_dump::{DumpError, RasterDumper, RasterSnapshot};
pub use rasterizer::{EdgeFunctionRasterizer, RasterMode, TriangleSetup};
pub use scene::SceneContext;
