//! Boolean polygon algebra (union / difference / intersection / xor) in the
//! fixed-point integer coordinate space.
//!
//! This is a direct pairwise-intersection clipper, not an active-edge-list
//! Vatti sweep: every edge of one operand is tested against every edge of
//! the other (`O(n*m)`), intersection points are inserted to split both
//! operands into non-crossing fragments, each fragment is classified as
//! interior or exterior to the other operand by nudging its midpoint to
//! either side and ray-casting, and the surviving directed fragments are
//! traced back into closed loops by always taking the tightest clockwise
//! turn at each vertex. It is not built for pathological edge counts, but it
//! produces exactly the operations this crate's callers need: rectangles,
//! offset polygons, and drill/perforate point sets.

use std::collections::HashMap;

use cm_core::geometry::{FillRule, IntegerPath, IntegerPaths, IntegerPoint};

use crate::path::{classify, segment_intersection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOp {
    Union,
    Diff,
    Intersect,
    Xor,
}

type Edge = (IntegerPoint, IntegerPoint);

/// `a OP b` under the given fill rule. Degenerate inputs (empty soups,
/// zero-area contours) always produce empty output, never an error — see
/// the module docs on `offset` for the same convention.
pub fn clip(a: &IntegerPaths, b: &IntegerPaths, op: ClipOp, rule: FillRule) -> IntegerPaths {
    // Two structurally identical operands are a degenerate case for the
    // general fragment classifier below: every fragment of A sits exactly
    // on B's boundary, which a non-perturbed ray cast resolves as "inside"
    // more often than not, deleting the whole result. Short-circuit it.
    if a == b {
        return match op {
            ClipOp::Union | ClipOp::Intersect => resolve_self(a, rule),
            ClipOp::Diff | ClipOp::Xor => IntegerPaths::empty(),
        };
    }

    let a_empty = a.is_empty();
    let b_empty = b.is_empty();

    match op {
        ClipOp::Union => {
            if a_empty && b_empty {
                return IntegerPaths::empty();
            }
            if a_empty {
                return resolve_self(b, rule);
            }
            if b_empty {
                return resolve_self(a, rule);
            }
        }
        ClipOp::Intersect => {
            if a_empty || b_empty {
                return IntegerPaths::empty();
            }
        }
        ClipOp::Diff => {
            if a_empty {
                return IntegerPaths::empty();
            }
            if b_empty {
                return resolve_self(a, rule);
            }
        }
        ClipOp::Xor => {
            if a_empty && b_empty {
                return IntegerPaths::empty();
            }
            if a_empty {
                return resolve_self(b, rule);
            }
            if b_empty {
                return resolve_self(a, rule);
            }
        }
    }

    let ra = resolve_self(a, rule);
    let rb = resolve_self(b, rule);

    let a_edges: Vec<Edge> = ra.paths().iter().flat_map(|p| p.edges()).collect();
    let b_edges: Vec<Edge> = rb.paths().iter().flat_map(|p| p.edges()).collect();

    if a_edges.is_empty() || b_edges.is_empty() {
        return match op {
            ClipOp::Intersect => IntegerPaths::empty(),
            ClipOp::Union | ClipOp::Xor => {
                if a_edges.is_empty() { rb } else { ra }
            }
            ClipOp::Diff => {
                if a_edges.is_empty() { IntegerPaths::empty() } else { ra }
            }
        };
    }

    let split_a = split_against(&a_edges, &b_edges);
    let split_b = split_against(&b_edges, &a_edges);

    let mut directed = Vec::with_capacity(split_a.len() + split_b.len());

    for (p, q) in split_a {
        if p == q {
            continue;
        }
        let inside_b = midpoint_inside(p, q, &b_edges, rule);
        let (keep, reverse) = a_side_rule(op, inside_b);
        if keep {
            directed.push(if reverse { (q, p) } else { (p, q) });
        }
    }

    for (p, q) in split_b {
        if p == q {
            continue;
        }
        let inside_a = midpoint_inside(p, q, &a_edges, rule);
        let (keep, reverse) = b_side_rule(op, inside_a);
        if keep {
            directed.push(if reverse { (q, p) } else { (p, q) });
        }
    }

    trace_loops(&directed)
}

fn a_side_rule(op: ClipOp, inside_other: bool) -> (bool, bool) {
    match op {
        ClipOp::Union => (!inside_other, false),
        ClipOp::Intersect => (inside_other, false),
        ClipOp::Diff => (!inside_other, false),
        ClipOp::Xor => (true, inside_other),
    }
}

fn b_side_rule(op: ClipOp, inside_other: bool) -> (bool, bool) {
    match op {
        ClipOp::Union => (!inside_other, false),
        ClipOp::Intersect => (inside_other, false),
        ClipOp::Diff => (inside_other, true),
        ClipOp::Xor => (true, inside_other),
    }
}

fn midpoint_inside(p: IntegerPoint, q: IntegerPoint, edges: &[Edge], rule: FillRule) -> bool {
    let mx = (p.x as f64 + q.x as f64) / 2.0;
    let my = (p.y as f64 + q.y as f64) / 2.0;
    classify(mx, my, edges, rule)
}

/// Resolve a single polygon set against itself: splits self-intersections
/// (e.g. the reflex loops a Minkowski offset's rounded joins can produce),
/// classifies each resulting fragment by which side has the filled interior,
/// and retraces the outer boundary. This is also the normalisation used for
/// `clip` when one operand is empty, and it is what makes `clip(g, g,
/// Union, _)` return (a re-traced form of) `g` rather than nothing: a
/// fragment whose interior lies on the same side on both of its
/// occurrences in `g` is kept once, in the orientation that puts the
/// interior on its left.
pub(crate) fn resolve_self(paths: &IntegerPaths, rule: FillRule) -> IntegerPaths {
    let edges: Vec<Edge> = paths.paths().iter().flat_map(|p| p.edges()).collect();
    resolve_edges(&edges, rule)
}

pub(crate) fn resolve_edges(edges: &[Edge], rule: FillRule) -> IntegerPaths {
    if edges.is_empty() {
        return IntegerPaths::empty();
    }

    let split = split_against(edges, edges);
    let mut directed = Vec::with_capacity(split.len());

    for (a, b) in split {
        if a == b {
            continue;
        }
        let mx = (a.x as f64 + b.x as f64) / 2.0;
        let my = (a.y as f64 + b.y as f64) / 2.0;
        let dx = b.x as f64 - a.x as f64;
        let dy = b.y as f64 - a.y as f64;
        let len = (dx * dx + dy * dy).sqrt().max(1e-9);
        let eps = 0.5;
        let (lx, ly) = (mx - dy / len * eps, my + dx / len * eps);
        let (rx, ry) = (mx + dy / len * eps, my - dx / len * eps);
        let left_in = classify(lx, ly, edges, rule);
        let right_in = classify(rx, ry, edges, rule);

        if left_in && !right_in {
            directed.push((a, b));
        } else if right_in && !left_in {
            directed.push((b, a));
        }
        // both sides filled or both empty: fully interior or fully
        // exterior fragment, contributes nothing to the boundary.
    }

    trace_loops(&directed)
}

/// Split every edge of `xs` at its proper intersections with edges of `ys`,
/// returning the ordered fragments covering the same point set as `xs`.
fn split_against(xs: &[Edge], ys: &[Edge]) -> Vec<Edge> {
    let mut out = Vec::new();
    for &(a, b) in xs {
        let mut cuts: Vec<(f64, IntegerPoint)> = Vec::new();
        for &(c, d) in ys {
            if let Some((x, y)) = segment_intersection(a, b, c, d) {
                let t = param_t(a, b, x, y);
                cuts.push((t, IntegerPoint::new(x.round() as i64, y.round() as i64)));
            }
        }
        cuts.sort_by(|p, q| p.0.partial_cmp(&q.0).unwrap());

        let mut prev = a;
        for (_, pt) in cuts {
            if pt != prev {
                out.push((prev, pt));
                prev = pt;
            }
        }
        if prev != b {
            out.push((prev, b));
        }
    }
    out
}

fn param_t(a: IntegerPoint, b: IntegerPoint, x: f64, y: f64) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    if dx.abs() > dy.abs() {
        (x - a.x as f64) / dx
    } else {
        (y - a.y as f64) / dy
    }
}

/// Trace closed loops out of a set of directed, non-crossing boundary
/// fragments by always taking the tightest clockwise turn at each vertex.
fn trace_loops(directed: &[Edge]) -> IntegerPaths {
    let mut adj: HashMap<IntegerPoint, Vec<usize>> = HashMap::new();
    for (idx, &(a, _)) in directed.iter().enumerate() {
        adj.entry(a).or_default().push(idx);
    }

    let mut used = vec![false; directed.len()];
    let mut loops = Vec::new();

    for start_idx in 0..directed.len() {
        if used[start_idx] {
            continue;
        }
        let start = directed[start_idx].0;
        let mut loop_pts = Vec::new();
        let mut cur_idx = start_idx;

        loop {
            used[cur_idx] = true;
            let (from, to) = directed[cur_idx];
            loop_pts.push(from);
            if to == start {
                break;
            }

            let candidates = adj.get(&to).cloned().unwrap_or_default();
            let unused: Vec<usize> = candidates.into_iter().filter(|&i| !used[i]).collect();
            if unused.is_empty() {
                break;
            }

            let incoming = (to.x as f64 - from.x as f64, to.y as f64 - from.y as f64);
            let mut best_idx = unused[0];
            let mut best_angle = f64::MAX;
            for &cand in &unused {
                let (_, cto) = directed[cand];
                let out_dir = (cto.x as f64 - to.x as f64, cto.y as f64 - to.y as f64);
                let angle = clockwise_angle(incoming, out_dir);
                if angle < best_angle {
                    best_angle = angle;
                    best_idx = cand;
                }
            }
            cur_idx = best_idx;
        }

        if loop_pts.len() >= 3 {
            loops.push(IntegerPath::new(loop_pts));
        }
    }

    IntegerPaths::new(loops)
}

/// Angle, in `[0, 2*PI)`, that `u` must be rotated clockwise (in this
/// Y-down coordinate space) to reach `v`.
fn clockwise_angle(u: (f64, f64), v: (f64, f64)) -> f64 {
    let cross = u.0 * v.1 - u.1 * v.0;
    let dot = u.0 * v.0 + u.1 * v.1;
    let mut angle = cross.atan2(dot);
    if angle <= 0.0 {
        angle += std::f64::consts::TAU;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: i64, max: i64) -> IntegerPaths {
        IntegerPaths::new(vec![IntegerPath::new(vec![
            IntegerPoint::new(min, min),
            IntegerPoint::new(max, min),
            IntegerPoint::new(max, max),
            IntegerPoint::new(min, max),
        ])])
    }

    #[test]
    fn test_union_with_self_is_identity() {
        let sq = square(0, 10);
        let out = clip(&sq, &sq, ClipOp::Union, FillRule::NonZero);
        assert_eq!(out.paths().len(), 1);
        let bb = out.bounding_box().unwrap();
        assert_eq!(bb.min_x, 0);
        assert_eq!(bb.max_x, 10);
    }

    #[test]
    fn test_disjoint_union_keeps_both() {
        let a = square(0, 10);
        let b = square(20, 30);
        let out = clip(&a, &b, ClipOp::Union, FillRule::EvenOdd);
        assert_eq!(out.paths().len(), 2);
    }

    #[test]
    fn test_overlapping_intersect() {
        let a = square(0, 10);
        let b = square(5, 15);
        let out = clip(&a, &b, ClipOp::Intersect, FillRule::EvenOdd);
        assert_eq!(out.paths().len(), 1);
        let bb = out.bounding_box().unwrap();
        assert_eq!(bb.min_x, 5);
        assert_eq!(bb.max_x, 10);
        assert_eq!(bb.min_y, 5);
        assert_eq!(bb.max_y, 10);
    }

    #[test]
    fn test_overlapping_diff_shrinks_bbox() {
        let a = square(0, 10);
        let b = square(5, 15);
        let out = clip(&a, &b, ClipOp::Diff, FillRule::EvenOdd);
        assert!(!out.is_empty());
        let bb = out.bounding_box().unwrap();
        // remainder of A after removing the overlap with B stays within A's box
        assert!(bb.min_x >= 0 && bb.max_x <= 10);
    }

    #[test]
    fn test_diff_with_empty_b_is_identity() {
        let a = square(0, 10);
        let b = IntegerPaths::empty();
        let out = clip(&a, &b, ClipOp::Diff, FillRule::EvenOdd);
        assert_eq!(out.paths().len(), 1);
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = square(0, 10);
        let b = square(20, 30);
        let out = clip(&a, &b, ClipOp::Intersect, FillRule::EvenOdd);
        assert!(out.is_empty());
    }
}
