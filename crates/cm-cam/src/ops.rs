//! Operation compilers (L3): turn one operation's geometry into an ordered
//! list of cutter-centre `CamPath`s. Each function here mirrors one entry
//! of spec section 4.2; `compile_operation` is the single dispatch point
//! the post layer calls.

use cm_core::geometry::{CamPath, FillRule, IntegerPath, IntegerPaths, IntegerPoint};
use cm_geom::{clip, merge_paths, offset, ClipOp};
use serde::{Deserialize, Serialize};

use crate::error::CamError;

/// The kinds of operation this core can compile. V-carve is listed because
/// callers need to be able to describe the intent even though compiling it
/// always fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Pocket,
    OutlineInside,
    OutlineOutside,
    Engrave,
    Perforate,
    Drill,
    VCarve,
}

/// Parameters shared by every area-clearing operation.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    pub cutter_diameter: i64,
    pub overlap: f64,
    pub climb: bool,
    /// Total cut width for Outline operations; ignored otherwise.
    pub width: i64,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            cutter_diameter: 0,
            overlap: 0.0,
            climb: false,
            width: 0,
        }
    }
}

/// Compile one operation descriptor's geometry into its tool paths.
pub fn compile_operation(
    kind: OperationKind,
    geometry: &IntegerPaths,
    config: &CompileConfig,
) -> Result<Vec<CamPath>, CamError> {
    match kind {
        OperationKind::Pocket => compile_pocket(geometry, config),
        OperationKind::OutlineInside => compile_outline(geometry, config, true),
        OperationKind::OutlineOutside => compile_outline(geometry, config, false),
        OperationKind::Engrave => Ok(compile_engrave(geometry)),
        OperationKind::Perforate => Ok(compile_perforate(geometry)),
        OperationKind::Drill => Ok(compile_drill(geometry)),
        OperationKind::VCarve => compile_vcarve(),
    }
}

/// Clears the interior of `geometry` with a spiral moving inward: an
/// outermost pass at half the cutter diameter inside the boundary, then
/// successive passes offset further in by `cutterDiameter * (1 - overlap)`
/// until the remaining area is too small to offset further. The outermost
/// pass is emitted last so the cutter finishes where a retract is cheapest.
pub fn compile_pocket(geometry: &IntegerPaths, config: &CompileConfig) -> Result<Vec<CamPath>, CamError> {
    let half = config.cutter_diameter / 2;
    let g0 = offset(geometry, -half);
    let step = (((config.cutter_diameter as f64) * (1.0 - config.overlap)).round() as i64).max(1);

    let passes = spiral_offsets(&g0, step);

    let mut accumulated: Vec<IntegerPath> = Vec::new();
    for pass in passes.iter().rev() {
        accumulated.extend(pass.paths().iter().cloned());
    }

    if config.climb {
        accumulated = accumulated.iter().map(|p| p.reversed()).collect();
    }

    let threshold = (config.cutter_diameter as f64 / 1000.0).max(1.0);
    Ok(merge_paths(&g0, accumulated, threshold))
}

/// Repeatedly offsets `seed` inward by `step` until the area stops
/// shrinking (either the contour vanished, or the offset curve folded over
/// itself rather than collapsing — see the caveat on `cm_geom::offset`).
/// Returns outermost-first.
fn spiral_offsets(seed: &IntegerPaths, step: i64) -> Vec<IntegerPaths> {
    let mut result = Vec::new();
    let mut current = seed.clone();
    let mut prev_area: Option<i128> = None;

    let cap = spiral_iteration_cap(seed, step);
    for _ in 0..cap {
        if current.is_empty() {
            break;
        }
        let area: i128 = current.paths().iter().map(|p| p.signed_area2().abs()).sum();
        if let Some(prev) = prev_area {
            if area >= prev {
                break;
            }
        }
        prev_area = Some(area);
        result.push(current.clone());
        current = offset(&current, -step);
    }

    result
}

fn spiral_iteration_cap(seed: &IntegerPaths, step: i64) -> usize {
    let bb = match seed.bounding_box() {
        Some(bb) => bb,
        None => return 0,
    };
    let largest_dim = bb.width().max(bb.height()).max(1);
    let step = step.max(1);
    (((largest_dim / step) as usize) + 4).min(10_000)
}

/// Cuts a band of width `config.width` along `geometry`'s boundary: Inside
/// starts half a cutter diameter inward and grows further in; Outside
/// starts half a cutter diameter outward and grows further out.
pub fn compile_outline(
    geometry: &IntegerPaths,
    config: &CompileConfig,
    inside: bool,
) -> Result<Vec<CamPath>, CamError> {
    let half = config.cutter_diameter / 2;
    let each_width = (((config.cutter_diameter as f64) * (1.0 - config.overlap)).round() as i64).max(1);
    let sign: i64 = if inside { -1 } else { 1 };

    let start = offset(geometry, sign * half);
    let outer = offset(geometry, sign * (config.width - half));
    let bounds = if inside {
        clip(&start, &outer, ClipOp::Diff, FillRule::NonZero)
    } else {
        clip(&outer, &start, ClipOp::Diff, FillRule::NonZero)
    };

    let need_reverse = if inside { config.climb } else { !config.climb };

    // `current_center` is the cutter-centre offset of the current pass;
    // the material it actually removes reaches out to `current_center +
    // half` (the cutter's far edge), so the first pass already covers a
    // full `cutterDiameter` of width, not just `half`. Iteration stops once
    // that far edge reaches `config.width`; the last stepped pass is
    // clamped so its centre lands at exactly `width - half` rather than
    // overshooting past the requested width.
    let mut all_paths: Vec<IntegerPath> = Vec::new();
    let mut current = start;
    let mut current_center = half;
    let cap = spiral_iteration_cap(geometry, each_width).max(4);

    for _ in 0..cap {
        if current.is_empty() {
            break;
        }
        all_paths.extend(current.paths().iter().cloned());
        if current_center + half >= config.width {
            break;
        }
        let mut step = each_width;
        let mut next_center = current_center + step;
        if next_center + half > config.width {
            next_center = config.width - half;
            step = next_center - current_center;
        }
        if step <= 0 {
            break;
        }
        current_center = next_center;
        current = offset(&current, sign * step);
    }

    if need_reverse {
        all_paths = all_paths.iter().map(|p| p.reversed()).collect();
    }

    let threshold = (config.cutter_diameter as f64 / 1000.0).max(1.0);
    Ok(merge_paths(&bounds, all_paths, threshold))
}

/// One pass per input path, following the contour literally; cutter
/// diameter plays no part. Every path is explicitly closed (first point
/// duplicated at the end, matching the emitter's expectation for engrave
/// paths specifically) and marked safe to close directly.
pub fn compile_engrave(geometry: &IntegerPaths) -> Vec<CamPath> {
    geometry
        .paths()
        .iter()
        .map(|p| {
            let mut pts = p.points().to_vec();
            if let (Some(&first), Some(&last)) = (pts.first(), pts.last()) {
                if first != last {
                    pts.push(first);
                }
            }
            CamPath::new(IntegerPath::new(pts), true)
        })
        .collect()
}

/// One zero-length path per contour centroid. The emitter recognises
/// zero-length paths and plunges straight to full depth rather than
/// layering passes.
pub fn compile_perforate(geometry: &IntegerPaths) -> Vec<CamPath> {
    point_ops(geometry)
}

/// Identical compilation to Perforate; kept as a distinct entry point
/// because it is a distinct operation kind at the job-descriptor level.
pub fn compile_drill(geometry: &IntegerPaths) -> Vec<CamPath> {
    point_ops(geometry)
}

fn point_ops(geometry: &IntegerPaths) -> Vec<CamPath> {
    geometry
        .paths()
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| {
            let c = centroid(p);
            CamPath::new(IntegerPath::new(vec![c, c]), true)
        })
        .collect()
}

fn centroid(path: &IntegerPath) -> IntegerPoint {
    let n = path.len().max(1) as f64;
    let (sx, sy) = path
        .points()
        .iter()
        .fold((0i128, 0i128), |(sx, sy), p| (sx + p.x as i128, sy + p.y as i128));
    IntegerPoint::new((sx as f64 / n).round() as i64, (sy as f64 / n).round() as i64)
}

/// V-carve is reserved; this core refuses to compile it rather than
/// approximate it with a flat pass.
fn compile_vcarve() -> Result<Vec<CamPath>, CamError> {
    Err(CamError::Unsupported("v-carve".into()))
}
