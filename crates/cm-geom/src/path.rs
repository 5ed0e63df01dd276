use cm_core::geometry::{FillRule, IntegerPaths, IntegerPoint};

/// Even-odd / non-zero point-in-polygon test by ray casting along +X from
/// `p`. Points exactly on an edge are treated as inside, matching the tab
/// splitter's "tangent touch is not a crossing" rule.
pub fn point_in_paths(p: IntegerPoint, paths: &IntegerPaths, rule: FillRule) -> bool {
    let mut winding = 0i32;
    let mut crossings = 0i32;

    for path in paths.paths() {
        for (a, b) in path.edges() {
            if point_on_segment(p, a, b) {
                return true;
            }
            // Only count edges that straddle the horizontal ray's y.
            let (ay, by) = (a.y, b.y);
            if (ay > p.y) == (by > p.y) {
                continue;
            }
            let t = (p.y - ay) as f64 / (by - ay) as f64;
            let x_at_y = a.x as f64 + t * (b.x - a.x) as f64;
            if x_at_y > p.x as f64 {
                crossings += 1;
                winding += if by > ay { 1 } else { -1 };
            }
        }
    }

    match rule {
        FillRule::EvenOdd => crossings % 2 == 1,
        FillRule::NonZero => winding != 0,
    }
}

fn point_on_segment(p: IntegerPoint, a: IntegerPoint, b: IntegerPoint) -> bool {
    let cross = (b.x - a.x) as i128 * (p.y - a.y) as i128 - (b.y - a.y) as i128 * (p.x - a.x) as i128;
    if cross != 0 {
        return false;
    }
    let within_x = p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x);
    let within_y = p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y);
    within_x && within_y
}

/// Does the open segment `(a, b)` properly cross any boundary edge of
/// `clip`? Touching endpoints and collinear overlaps do not count.
pub fn crosses(clip: &IntegerPaths, a: IntegerPoint, b: IntegerPoint) -> bool {
    for path in clip.paths() {
        for (c, d) in path.edges() {
            if let Some(_) = segment_intersection(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

/// Proper intersection point of two open segments, or `None` if they don't
/// cross (parallel, collinear, or touching only at an endpoint).
pub fn segment_intersection(
    p1: IntegerPoint,
    p2: IntegerPoint,
    p3: IntegerPoint,
    p4: IntegerPoint,
) -> Option<(f64, f64)> {
    let (x1, y1) = (p1.x as f64, p1.y as f64);
    let (x2, y2) = (p2.x as f64, p2.y as f64);
    let (x3, y3) = (p3.x as f64, p3.y as f64);
    let (x4, y4) = (p4.x as f64, p4.y as f64);

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < 1e-9 {
        return None;
    }

    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = ((x1 - x3) * (y1 - y2) - (y1 - y3) * (x1 - x2)) / denom;

    const EPS: f64 = 1e-9;
    if t <= EPS || t >= 1.0 - EPS || u <= EPS || u >= 1.0 - EPS {
        return None;
    }

    let x = x1 + t * (x2 - x1);
    let y = y1 + t * (y2 - y1);
    Some((x, y))
}

/// Strict point membership against a flat, possibly-open edge soup: no
/// special case for a test point that lands exactly on an edge. Internal
/// callers (clip, offset) always nudge the test point off whatever edge it
/// was derived from before calling this, so the ambiguous on-boundary case
/// never arises in practice.
pub fn classify(px: f64, py: f64, edges: &[(IntegerPoint, IntegerPoint)], rule: FillRule) -> bool {
    let mut crossings = 0i32;
    let mut winding = 0i32;
    for &(a, b) in edges {
        let (ay, by) = (a.y as f64, b.y as f64);
        if (ay > py) == (by > py) {
            continue;
        }
        let t = (py - ay) / (by - ay);
        let x_at_y = a.x as f64 + t * (b.x as f64 - a.x as f64);
        if x_at_y > px {
            crossings += 1;
            winding += if by > ay { 1 } else { -1 };
        }
    }
    match rule {
        FillRule::EvenOdd => crossings % 2 == 1,
        FillRule::NonZero => winding != 0,
    }
}
