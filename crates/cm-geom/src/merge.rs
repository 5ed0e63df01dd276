//! Joining adjacent cutter-centre paths into continuous `CamPath`s, and the
//! crossing test operation compilers use to decide whether a path may be
//! closed without retracting to safe Z.

use cm_core::geometry::{CamPath, IntegerPath, IntegerPaths};

use crate::path::crosses;

/// Greedily concatenate `paths` where one path's open end lies within
/// `threshold` of the next path's start and the connecting segment does not
/// cross `clip`. Order is preserved for paths that don't merge with
/// anything; each output path's `safe_to_close` reflects whether its own
/// implicit closing segment crosses `clip`.
pub fn merge_paths(clip: &IntegerPaths, paths: Vec<IntegerPath>, threshold: f64) -> Vec<CamPath> {
    let mut merged: Vec<IntegerPath> = Vec::new();

    for p in paths {
        if p.is_empty() {
            continue;
        }
        let mut appended = false;
        if let Some(last) = merged.last_mut() {
            let open_end = *last.points().last().unwrap();
            let new_start = *p.points().first().unwrap();
            if open_end.distance_to(new_start) <= threshold && !crosses(clip, open_end, new_start)
            {
                let mut pts = last.points().to_vec();
                let tail = if new_start == open_end { &p.points()[1..] } else { p.points() };
                pts.extend_from_slice(tail);
                *last = IntegerPath::new(pts);
                appended = true;
            }
        }
        if !appended {
            merged.push(p);
        }
    }

    merged
        .into_iter()
        .map(|p| {
            let start = *p.points().first().unwrap();
            let end = *p.points().last().unwrap();
            let safe_to_close = !crosses(clip, end, start);
            CamPath::new(p, safe_to_close)
        })
        .collect()
}
