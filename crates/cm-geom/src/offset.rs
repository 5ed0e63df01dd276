//! Minkowski offset: grow or shrink a polygon set by a signed radius.

use cm_core::geometry::{FillRule, IntegerPaths, IntegerPoint};

use crate::clip::resolve_edges;

type Edge = (IntegerPoint, IntegerPoint);

/// Minkowski sum of `paths` with a disk of radius `|delta|`. Positive delta
/// grows the shape, negative shrinks it. Joins are rounded, approximated as
/// a polyline with chord tolerance `max(1, |delta| / 256)`. If a contour
/// shrinks past collapse it is simply absent from the output — this
/// function never fails.
///
/// Per-edge the shape is shifted outward (or inward) along its normal, and
/// every original vertex gets an arc stitching the two adjacent shifted
/// edges together — at convex vertices this fills the gap the shift opens
/// up, at concave vertices it overlaps the shifted edges, which would
/// otherwise leave a self-intersecting loop. Both are the same move a
/// production offset implementation makes; the self-intersecting loops a
/// concave vertex produces are cancelled afterward by re-resolving the
/// raw edge soup under the non-zero fill rule, the same cleanup technique
/// Clipper-family offsetters use.
///
/// Shrinking a contour by more than its narrowest half-width folds the
/// offset curve over itself rather than collapsing it outright; the
/// non-zero cleanup does not distinguish that fold from a normal interior,
/// so callers that rely on "shrink far enough and it disappears" (the
/// pocket compiler's spiral termination) should treat a contour whose
/// bounding box stops shrinking between iterations as collapsed, not just
/// check for an empty result.
pub fn offset(paths: &IntegerPaths, delta: i64) -> IntegerPaths {
    if delta == 0 {
        return paths.clone();
    }
    if paths.is_empty() {
        return IntegerPaths::empty();
    }

    let r = delta.unsigned_abs() as f64;
    let sign = if delta > 0 { 1.0 } else { -1.0 };
    let tol = (r / 256.0).max(1.0);

    let mut raw_edges: Vec<Edge> = Vec::new();

    for path in paths.paths() {
        let pts = path.points();
        let n = pts.len();
        if n < 3 {
            continue;
        }

        let normals: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let a = pts[i];
                let b = pts[(i + 1) % n];
                outward_normal((b.x - a.x) as f64, (b.y - a.y) as f64)
            })
            .collect();

        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            let (nx, ny) = normals[i];
            let ox = nx * sign * r;
            let oy = ny * sign * r;
            let a2 = IntegerPoint::new(
                (a.x as f64 + ox).round() as i64,
                (a.y as f64 + oy).round() as i64,
            );
            let b2 = IntegerPoint::new(
                (b.x as f64 + ox).round() as i64,
                (b.y as f64 + oy).round() as i64,
            );
            raw_edges.push((a2, b2));

            let (nx2, ny2) = normals[(i + 1) % n];
            let joint = arc_join(b, nx * sign, ny * sign, nx2 * sign, ny2 * sign, r, tol);
            for w in joint.windows(2) {
                raw_edges.push((w[0], w[1]));
            }
        }
    }

    if raw_edges.is_empty() {
        return IntegerPaths::empty();
    }

    resolve_edges(&raw_edges, FillRule::NonZero)
}

/// Unit normal pointing away from the interior, given the interior-on-left
/// convention `IntegerPath::is_outer` relies on.
fn outward_normal(dx: f64, dy: f64) -> (f64, f64) {
    let len = (dx * dx + dy * dy).sqrt().max(1e-9);
    (dy / len, -dx / len)
}

fn arc_join(
    center: IntegerPoint,
    nx1: f64,
    ny1: f64,
    nx2: f64,
    ny2: f64,
    r: f64,
    tol: f64,
) -> Vec<IntegerPoint> {
    let theta1 = ny1.atan2(nx1);
    let theta2 = ny2.atan2(nx2);
    let mut dtheta = theta2 - theta1;
    while dtheta > std::f64::consts::PI {
        dtheta -= std::f64::consts::TAU;
    }
    while dtheta <= -std::f64::consts::PI {
        dtheta += std::f64::consts::TAU;
    }

    let arc_len = r * dtheta.abs();
    let steps = ((arc_len / tol).ceil() as usize).max(1);

    (0..=steps)
        .map(|i| {
            let t = theta1 + dtheta * (i as f64 / steps as f64);
            let x = center.x as f64 + r * t.cos();
            let y = center.y as f64 + r * t.sin();
            IntegerPoint::new(x.round() as i64, y.round() as i64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_core::geometry::IntegerPath;

    fn square(min: i64, max: i64) -> IntegerPaths {
        IntegerPaths::new(vec![IntegerPath::new(vec![
            IntegerPoint::new(min, min),
            IntegerPoint::new(max, min),
            IntegerPoint::new(max, max),
            IntegerPoint::new(min, max),
        ])])
    }

    #[test]
    fn test_zero_offset_is_identity() {
        let sq = square(0, 10);
        let out = offset(&sq, 0);
        assert_eq!(out, sq);
    }

    #[test]
    fn test_grow_square_expands_bbox() {
        let sq = square(0, 10);
        let out = offset(&sq, 2);
        let bb = out.bounding_box().unwrap();
        assert!(bb.min_x <= -1 && bb.min_x >= -3);
        assert!(bb.max_x >= 11 && bb.max_x <= 13);
    }

    #[test]
    fn test_shrink_square_contracts_bbox() {
        let sq = square(0, 10);
        let out = offset(&sq, -2);
        assert!(!out.is_empty());
        let bb = out.bounding_box().unwrap();
        assert!(bb.min_x >= 1 && bb.min_x <= 3);
        assert!(bb.max_x <= 9 && bb.max_x >= 7);
    }

    #[test]
    fn test_shrink_preserves_square_shape_below_half_width() {
        // half-width of this square is 5; shrinking by less than that never
        // folds the offset curve over itself.
        let sq = square(0, 20);
        let out = offset(&sq, -4);
        let bb = out.bounding_box().unwrap();
        assert!(bb.min_x >= 3 && bb.min_x <= 5);
        assert!(bb.max_x <= 17 && bb.max_x >= 15);
    }

    #[test]
    fn test_offset_empty_input() {
        let out = offset(&IntegerPaths::empty(), 5);
        assert!(out.is_empty());
    }
}
