//! Tab splitter (L4): cuts a tool path wherever it crosses the unioned,
//! cutter-bloated tab geometry, so the emitter knows where to lift the
//! cutter to `tabZ` instead of cutting through.

use cm_core::geometry::{FillRule, IntegerPath, IntegerPaths, IntegerPoint};
use cm_geom::{point_in_paths, segment_intersection};

/// Split `points` (one tool-path's vertex sequence, in traversal order)
/// against `tabs`. The returned list alternates: even indices (0, 2, 4, …)
/// lie outside every tab, odd indices cross one. If `points` starts inside
/// a tab, a zero-length sub-path is prepended so index 0 is still "outside"
/// — it just has nothing in it.
pub fn split_against_tabs(points: &[IntegerPoint], tabs: &IntegerPaths) -> Vec<IntegerPath> {
    if points.len() < 2 || tabs.is_empty() {
        return vec![IntegerPath::new(points.to_vec())];
    }

    let mut subpaths: Vec<Vec<IntegerPoint>> = Vec::new();
    if point_in_paths(points[0], tabs, FillRule::NonZero) {
        subpaths.push(vec![points[0], points[0]]);
    }

    let mut current: Vec<IntegerPoint> = vec![points[0]];

    for i in 0..points.len() - 1 {
        let a = points[i];
        let b = points[i + 1];

        let mut hits: Vec<(f64, IntegerPoint)> = Vec::new();
        for tab_path in tabs.paths() {
            for (ta, tb) in tab_path.edges() {
                if let Some((x, y)) = segment_intersection(a, b, ta, tb) {
                    hits.push((segment_param(a, b, x, y), IntegerPoint::new(x.round() as i64, y.round() as i64)));
                }
            }
        }
        hits.sort_by(|p, q| p.0.partial_cmp(&q.0).unwrap());

        for (_, pt) in hits {
            current.push(pt);
            subpaths.push(std::mem::take(&mut current));
            current.push(pt);
        }
        current.push(b);
    }
    subpaths.push(current);

    subpaths.into_iter().map(IntegerPath::new).collect()
}

/// Fraction along `ab` at which `(x, y)` lies, using whichever axis has the
/// larger extent to avoid dividing by a near-zero delta.
fn segment_param(a: IntegerPoint, b: IntegerPoint, x: f64, y: f64) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    if dx.abs() >= dy.abs() {
        (x - a.x as f64) / dx
    } else {
        (y - a.y as f64) / dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab_square(min: i64, max: i64, min_y: i64, max_y: i64) -> IntegerPaths {
        IntegerPaths::new(vec![IntegerPath::new(vec![
            IntegerPoint::new(min, min_y),
            IntegerPoint::new(max, min_y),
            IntegerPoint::new(max, max_y),
            IntegerPoint::new(min, max_y),
        ])])
    }

    #[test]
    fn test_no_tabs_returns_single_path() {
        let points = vec![IntegerPoint::new(0, 0), IntegerPoint::new(10, 0)];
        let out = split_against_tabs(&points, &IntegerPaths::empty());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points(), points.as_slice());
    }

    #[test]
    fn test_single_tab_crossing_produces_three_subpaths() {
        let points = vec![IntegerPoint::new(0, 0), IntegerPoint::new(10, 0)];
        let tabs = tab_square(4, 6, -1, 1);
        let out = split_against_tabs(&points, &tabs);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].points(), &[IntegerPoint::new(0, 0), IntegerPoint::new(4, 0)]);
        assert_eq!(out[1].points(), &[IntegerPoint::new(4, 0), IntegerPoint::new(6, 0)]);
        assert_eq!(out[2].points(), &[IntegerPoint::new(6, 0), IntegerPoint::new(10, 0)]);
    }

    #[test]
    fn test_starting_inside_tab_prepends_zero_length_subpath() {
        let points = vec![IntegerPoint::new(5, 0), IntegerPoint::new(10, 0)];
        let tabs = tab_square(4, 6, -1, 1);
        let out = split_against_tabs(&points, &tabs);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].points(), &[IntegerPoint::new(5, 0), IntegerPoint::new(5, 0)]);
        assert_eq!(out[1].points(), &[IntegerPoint::new(5, 0), IntegerPoint::new(6, 0)]);
        assert_eq!(out[2].points(), &[IntegerPoint::new(6, 0), IntegerPoint::new(10, 0)]);
    }

    #[test]
    fn test_tangent_touch_does_not_split() {
        // path runs exactly along the tab's left edge: touches, never crosses
        let points = vec![IntegerPoint::new(4, -5), IntegerPoint::new(4, 5)];
        let tabs = tab_square(4, 6, -1, 1);
        let out = split_against_tabs(&points, &tabs);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_multiple_tabs_split_in_order() {
        let points = vec![IntegerPoint::new(0, 0), IntegerPoint::new(20, 0)];
        let mut tabs = tab_square(4, 6, -1, 1);
        tabs.0.extend(tab_square(14, 16, -1, 1).0);
        let out = split_against_tabs(&points, &tabs);
        assert_eq!(out.len(), 5);
    }
}
