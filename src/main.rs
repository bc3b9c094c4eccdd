/// Occlusion demo
/// Generates a noise heightfield, then culls its chunk sections near to far
use glam::{DVec3, IVec3};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
use noise::{NoiseFn, Perlin};
use rayon::prelude::*;
use std::process::ExitCode;
use std::time::Instant;
use terrain_occlusion::occlusion::DrawListFaceCuller;
use terrain_occlusion::*;

const CHUNK: i32 = 16;
const VIEW_RADIUS: i32 = 12;
const SECTION_COUNT: i32 = 6;
const FRAMES: u32 = 8;
const SEED: u32 = 12345;

/// Height range of one 16×16 chunk column, whole and per 8×8 quadrant.
#[derive(Debug, Clone, Copy)]
struct ColumnHeights {
    min: i32,
    max: i32,
    quadrant_min: [i32; 4],
    quadrant_max: [i32; 4],
}

struct Heightfield {
    radius: i32,
    columns: Vec<ColumnHeights>,
}

impl Heightfield {
    fn generate(radius: i32, seed: u32) -> Self {
        let perlin = Perlin::new(seed);
        let side = radius * 2;

        let columns = (0..side * side)
            .into_par_iter()
            .map(|i| {
                let cx = i % side - radius;
                let cz = i / side - radius;
                Self::sample_column(&perlin, cx, cz)
            })
            .collect();

        Self { radius, columns }
    }

    fn sample_column(perlin: &Perlin, cx: i32, cz: i32) -> ColumnHeights {
        let mut column = ColumnHeights {
            min: i32::MAX,
            max: i32::MIN,
            quadrant_min: [i32::MAX; 4],
            quadrant_max: [i32::MIN; 4],
        };

        for z in 0..CHUNK {
            for x in 0..CHUNK {
                let height = sample_terrain_height(perlin, cx * CHUNK + x, cz * CHUNK + z);
                let quadrant = ((z >> 3) << 1 | (x >> 3)) as usize;

                column.min = column.min.min(height);
                column.max = column.max.max(height);
                column.quadrant_min[quadrant] = column.quadrant_min[quadrant].min(height);
                column.quadrant_max[quadrant] = column.quadrant_max[quadrant].max(height);
            }
        }

        column
    }

    fn column(&self, cx: i32, cz: i32) -> Option<&ColumnHeights> {
        let side = self.radius * 2;
        let (ix, iz) = (cx + self.radius, cz + self.radius);
        if ix < 0 || iz < 0 || ix >= side || iz >= side {
            return None;
        }
        self.columns.get((iz * side + ix) as usize)
    }
}

#[inline]
fn sample_terrain_height(perlin: &Perlin, x: i32, z: i32) -> i32 {
    let scale = 0.01;
    let noise_value = perlin.get([x as f64 * scale, z as f64 * scale]);
    40 + (noise_value * 24.0) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Empty,
    Solid,
    Partial,
}

/// Blocks at or below the column height are solid. Returns the solid
/// extent (0..=16) of a height inside a section starting at `base_y`.
#[inline]
fn solid_top(height: i32, base_y: i32) -> u8 {
    (height + 1 - base_y).clamp(0, CHUNK) as u8
}

fn classify(column: &ColumnHeights, base_y: i32) -> SectionKind {
    if column.max < base_y {
        SectionKind::Empty
    } else if column.min >= base_y + CHUNK - 1 {
        SectionKind::Solid
    } else {
        SectionKind::Partial
    }
}

/// Quadrant boxes up to the tallest block of each quadrant.
fn visibility_boxes(column: &ColumnHeights, base_y: i32) -> Vec<PackedBox> {
    (0..4)
        .filter_map(|q| {
            let top = solid_top(column.quadrant_max[q], base_y);
            if top == 0 {
                return None;
            }
            let (x0, z0) = ((q as u8 & 1) * 8, (q as u8 >> 1) * 8);
            Some(PackedBox::pack(x0, 0, z0, x0 + 8, top, z0 + 8, RANGE_NEAR))
        })
        .collect()
}

/// Guaranteed-solid slabs, coarse first: the whole-column floor, then
/// per-quadrant floors.
fn occluder_boxes(column: &ColumnHeights, base_y: i32) -> Vec<PackedBox> {
    let mut boxes = Vec::with_capacity(5);

    let floor = solid_top(column.min, base_y);
    if floor > 0 {
        boxes.push(PackedBox::pack(0, 0, 0, 16, floor, 16, RANGE_NEAR));
    }

    for q in 0..4 {
        let top = solid_top(column.quadrant_min[q], base_y);
        if top > floor {
            let (x0, z0) = ((q as u8 & 1) * 8, (q as u8 >> 1) * 8);
            boxes.push(PackedBox::pack(x0, floor, z0, x0 + 8, top, z0 + 8, RANGE_MID));
        }
    }

    boxes
}

#[derive(Debug, Default)]
struct FrameReport {
    sections: u32,
    visible: u32,
    culled: u32,
    draw_lists: u32,
}

fn run_frame(
    occluder: &mut TerrainOccluder,
    camera: &Camera,
    heightfield: &Heightfield,
    sections: &mut [IVec3],
    config: &OcclusionConfig,
) -> FrameReport {
    perf_scope!("occlusion frame");

    occluder.clear_scene();
    occluder.prepare_scene(camera.projection_matrix(), camera.view_rotation(), camera.position);
    let face_culler = DrawListFaceCuller::new(camera.region());

    let center = |s: &IVec3| (s.as_dvec3() + 0.5) * CHUNK as f64;
    sections.sort_by(|a, b| {
        let da = center(a).distance_squared(camera.position);
        let db = center(b).distance_squared(camera.position);
        da.total_cmp(&db)
    });

    let mut report = FrameReport::default();

    for &section in sections.iter() {
        let Some(column) = heightfield.column(section.x, section.z) else {
            continue;
        };
        let base_y = section.y * CHUNK;
        let kind = classify(column, base_y);
        if kind == SectionKind::Empty {
            continue;
        }

        report.sections += 1;
        occluder.prepare_chunk(section * CHUNK);

        let visible = match kind {
            SectionKind::Solid => occluder.is_chunk_visible(),
            _ => occluder.is_any_box_visible(&visibility_boxes(column, base_y), RANGE_EXTREME),
        };

        if visible {
            report.visible += 1;
            report.draw_lists += face_culler.visible_faces(section).face_count();
        } else {
            report.culled += 1;
        }

        match kind {
            SectionKind::Solid => occluder.occlude_chunk(),
            _ => occluder.occlude_box_list(&occluder_boxes(column, base_y), config.default_range_limit),
        }
    }

    occluder.output_raster();
    report
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match OcclusionConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => OcclusionConfig::default(),
    };
    log::info!("occlusion config: {config:?}");

    let gen_start = Instant::now();
    let heightfield = Heightfield::generate(VIEW_RADIUS, SEED);
    log::info!(
        "heightfield: {} columns in {:.2}ms",
        heightfield.columns.len(),
        gen_start.elapsed().as_secs_f64() * 1000.0
    );

    let mut sections: Vec<IVec3> = (-VIEW_RADIUS..VIEW_RADIUS)
        .flat_map(|z| (-VIEW_RADIUS..VIEW_RADIUS).map(move |x| (x, z)))
        .flat_map(|(x, z)| (0..SECTION_COUNT).map(move |y| IVec3::new(x, y, z)))
        .collect();

    let mut occluder = TerrainOccluder::from_config(&config);
    let mut camera = Camera::new(DVec3::new(8.0, 72.0, -VIEW_RADIUS as f64 * CHUNK as f64 * 0.5));
    camera.rotate(0.0, 0.25);

    for frame in 0..FRAMES {
        let frame_start = Instant::now();
        let report = run_frame(&mut occluder, &camera, &heightfield, &mut sections, &config);
        let stats = occluder.stats();

        log::info!(
            "frame {frame}: {} sections, {} visible, {} culled ({:.1}%), {} draw lists, {} clipped faces, {:.2}ms",
            report.sections,
            report.visible,
            report.culled,
            report.culled as f64 / report.sections.max(1) as f64 * 100.0,
            report.draw_lists,
            stats.faces_clipped,
            frame_start.elapsed().as_secs_f64() * 1000.0
        );

        camera.move_local(1.0, 0.0, 0.0, 1.0);
        camera.rotate(0.15, 0.0);
    }

    if cfg!(feature = "profiling") {
        FUNCTION_COUNTERS.snapshot().log_report();
    }

    ExitCode::SUCCESS
}
