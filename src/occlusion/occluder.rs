/// Frame-scoped occlusion queries and writes for chunk boxes
///
/// Usage per frame:
/// 1. [`TerrainOccluder::clear_scene`] and [`TerrainOccluder::prepare_scene`]
/// 2. for every chunk, near to far: [`TerrainOccluder::prepare_chunk`], then
///    any mix of visibility tests and occluder writes for that chunk.
use super::bitmask::HierarchicalBitmask;
use super::faces::BoxProjector;
use super::packed_box::PackedBox;
use super::projection::{ClipPolygon, FixedPointProjector, ProjectedVertex, MAX_POLY_VERTS};
use super::raster_dump::{DumpError, RasterDumper};
use super::rasterizer::{EdgeFunctionRasterizer, RasterMode};
use super::scene::SceneContext;
use crate::config::OcclusionConfig;
use crate::count_call;
use crate::perf::{OcclusionStats, FUNCTION_COUNTERS};
use glam::{DVec3, IVec3, Mat4, Vec3, Vec4};
use std::time::Duration;

pub struct TerrainOccluder {
    bitmask: HierarchicalBitmask,
    scene: SceneContext,
    stats: OcclusionStats,
    dumper: Option<RasterDumper>,
}

impl Default for TerrainOccluder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainOccluder {
    pub fn new() -> Self {
        Self {
            bitmask: HierarchicalBitmask::new(),
            scene: SceneContext::new(),
            stats: OcclusionStats::default(),
            dumper: None,
        }
    }

    /// Like [`TerrainOccluder::new`], with the raster dump worker started
    /// when `debug_raster` is set. A worker that fails to start is logged
    /// and the occluder runs without it.
    pub fn from_config(config: &OcclusionConfig) -> Self {
        let mut occluder = Self::new();
        if config.debug_raster {
            match RasterDumper::spawn(
                config.raster_path.clone(),
                Duration::from_millis(config.dump_interval_ms),
            ) {
                Ok(dumper) => occluder.dumper = Some(dumper),
                Err(err) => log::warn!("occlusion raster dump disabled: {err}"),
            }
        }
        occluder
    }

    pub fn clear_scene(&mut self) {
        count_call!(FUNCTION_COUNTERS.bitmask_clear_calls);

        if self.stats.boxes_tested > 0 || self.stats.boxes_drawn > 0 {
            log::debug!(
                "occlusion frame: {} tested, {} culled, {} drawn, {} triangles, {} clipped faces, {} full bins",
                self.stats.boxes_tested,
                self.stats.boxes_culled(),
                self.stats.boxes_drawn,
                self.stats.triangles_rasterized,
                self.stats.faces_clipped,
                self.bitmask.full_low_bin_count()
            );
        }

        self.bitmask.clear();
        self.stats = OcclusionStats::default();
    }

    /// `view` is rotation only; the camera translation is applied per chunk.
    pub fn prepare_scene(&mut self, projection: Mat4, view: Mat4, camera: DVec3) {
        self.scene.prepare_scene(projection, view, camera);
    }

    pub fn prepare_chunk(&mut self, origin: IVec3) {
        self.scene.prepare_chunk(origin);
    }

    #[inline]
    pub fn is_chunk_visible(&mut self) -> bool {
        self.is_box_visible(PackedBox::FULL_CHUNK)
    }

    #[inline]
    pub fn occlude_chunk(&mut self) {
        self.occlude_box(PackedBox::FULL_CHUNK);
    }

    /// True if any camera-facing pixel of the box is not yet occupied.
    ///
    /// A camera inside the box always sees it.
    pub fn is_box_visible(&mut self, packed: PackedBox) -> bool {
        count_call!(FUNCTION_COUNTERS.boxes_tested);
        self.stats.boxes_tested += 1;

        let visible = self.process_box(packed, RasterMode::Test);
        if visible {
            count_call!(FUNCTION_COUNTERS.boxes_visible);
            self.stats.boxes_visible += 1;
        }

        log::trace!(
            "box {:?} at {} visible: {}",
            packed,
            self.scene.origin(),
            visible
        );
        visible
    }

    /// Mark every camera-facing pixel of the box as occupied.
    pub fn occlude_box(&mut self, packed: PackedBox) {
        count_call!(FUNCTION_COUNTERS.boxes_drawn);
        self.stats.boxes_drawn += 1;
        self.process_box(packed, RasterMode::Draw);
    }

    /// Draw boxes in order until one ranks coarser than `range_limit`.
    pub fn occlude_box_list(&mut self, boxes: &[PackedBox], range_limit: u8) {
        for &packed in boxes {
            if packed.range() > range_limit {
                break;
            }
            self.occlude_box(packed);
        }
    }

    /// Test boxes in order until one is visible or one ranks coarser than
    /// `range_limit`.
    pub fn is_any_box_visible(&mut self, boxes: &[PackedBox], range_limit: u8) -> bool {
        for &packed in boxes {
            if packed.range() > range_limit {
                break;
            }
            if self.is_box_visible(packed) {
                return true;
            }
        }
        false
    }

    /// Queue a raster dump if enabled and due.
    pub fn output_raster(&mut self) {
        let Some(dumper) = self.dumper.as_mut() else {
            return;
        };
        if let Err(err) = dumper.submit(&self.bitmask) {
            log::warn!("occlusion raster dump dropped: {err}");
            if matches!(err, DumpError::WorkerGone) {
                self.dumper = None;
            }
        }
    }

    #[inline]
    pub fn bitmask(&self) -> &HierarchicalBitmask {
        &self.bitmask
    }

    #[inline]
    pub fn scene(&self) -> &SceneContext {
        &self.scene
    }

    #[inline]
    pub fn stats(&self) -> OcclusionStats {
        self.stats
    }

    #[inline]
    pub fn has_raster_dump(&self) -> bool {
        self.dumper.is_some()
    }

    fn process_box(&mut self, packed: PackedBox, mode: RasterMode) -> bool {
        let min = Vec3::new(packed.x0() as f32, packed.y0() as f32, packed.z0() as f32);
        let max = Vec3::new(packed.x1() as f32, packed.y1() as f32, packed.z1() as f32);

        let faces = BoxProjector::facing_faces(self.scene.offset(), min, max);
        if faces.is_empty() {
            return mode == RasterMode::Test;
        }

        let corners = BoxProjector::project_corners(self.scene.mvp(), min, max);
        let mut covered = false;

        for face in faces.iter() {
            let hit = self.rasterize_face(corners.face_quad(face), mode);
            if hit && mode == RasterMode::Test {
                return true;
            }
            covered |= hit;
        }

        covered
    }

    /// Rasterize one face quad, clipping it to the guard band if needed.
    fn rasterize_face(&mut self, quad: [Vec4; 4], mode: RasterMode) -> bool {
        count_call!(FUNCTION_COUNTERS.faces_rasterized);

        if !quad.iter().all(|v| v.is_finite()) {
            count_call!(FUNCTION_COUNTERS.faces_unevaluable);
            self.stats.faces_unevaluable += 1;
            log::warn!("skipping face with non-finite clip coordinates");
            return mode == RasterMode::Test;
        }

        if quad.iter().all(|&v| FixedPointProjector::is_clip_inside_guard_band(v)) {
            let projected = quad.map(project_clamped);
            self.stats.triangles_rasterized += 2;
            return EdgeFunctionRasterizer::rasterize_quad(&mut self.bitmask, projected, mode);
        }

        count_call!(FUNCTION_COUNTERS.faces_clipped);
        self.stats.faces_clipped += 1;

        let polygon = ClipPolygon::from_slice(&quad).clip_to_guard_band();
        if polygon.is_empty() {
            return false;
        }

        let mut projected = [ProjectedVertex::default(); MAX_POLY_VERTS];
        for (out, &clip) in projected.iter_mut().zip(polygon.vertices()) {
            *out = project_clamped(clip);
        }
        let projected = &projected[..polygon.len()];

        self.stats.triangles_rasterized += projected.len().saturating_sub(2) as u32;
        EdgeFunctionRasterizer::rasterize_polygon(&mut self.bitmask, projected, mode)
    }
}

#[inline]
fn project_clamped(clip: Vec4) -> ProjectedVertex {
    ProjectedVertex::from_clip(clip).clamped_to_guard_band()
}
