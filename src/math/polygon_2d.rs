use super::{Point2, HORIZONTAL, TOLERANCE};

/// Where a point lies relative to a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    Outside,
    Inside,
    OnBoundary,
}

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Compares two products that should be equal when segments are parallel.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn products_equal(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= TOLERANCE * a.abs().max(b.abs())
}

/// Returns true when `p1 -> p2` and `p2 -> p3` are collinear.
#[must_use]
pub fn slopes_equal3(p1: &Point2, p2: &Point2, p3: &Point2) -> bool {
    products_equal((p1.y - p2.y) * (p2.x - p3.x), (p1.x - p2.x) * (p2.y - p3.y))
}

/// Returns true when segment `p1 -> p2` is parallel to `p3 -> p4`.
#[must_use]
pub fn slopes_equal4(p1: &Point2, p2: &Point2, p3: &Point2, p4: &Point2) -> bool {
    products_equal((p1.y - p2.y) * (p3.x - p4.x), (p1.x - p2.x) * (p3.y - p4.y))
}

/// Returns true when `p2` lies strictly between `p1` and `p3` along their
/// shared line. Coincident points are never "between".
#[must_use]
pub fn pt2_is_between(p1: &Point2, p2: &Point2, p3: &Point2) -> bool {
    if p1 == p3 || p1 == p2 || p3 == p2 {
        false
    } else if (p1.x - p3.x).abs() > 0.0 {
        (p2.x > p1.x) == (p2.x < p3.x)
    } else {
        (p2.y > p1.y) == (p2.y < p3.y)
    }
}

/// Inverse slope `dx/dy` of the segment `p1 -> p2`, or [`HORIZONTAL`].
#[must_use]
pub fn inverse_slope(p1: &Point2, p2: &Point2) -> f64 {
    let dy = p2.y - p1.y;
    if dy == 0.0 {
        HORIZONTAL
    } else {
        (p2.x - p1.x) / dy
    }
}

/// Classifies `pt` against the closed polygon `poly` (crossing-number test).
///
/// Points lying on an edge or vertex report [`PointLocation::OnBoundary`].
#[must_use]
#[allow(clippy::float_cmp)]
pub fn point_in_polygon(pt: &Point2, poly: &[Point2]) -> PointLocation {
    let n = poly.len();
    if n < 3 {
        return PointLocation::Outside;
    }
    let mut inside = false;
    for i in 0..n {
        let ip = &poly[i];
        let np = &poly[(i + 1) % n];
        if np.y == pt.y && (np.x == pt.x || (ip.y == pt.y && ((np.x > pt.x) == (ip.x < pt.x)))) {
            return PointLocation::OnBoundary;
        }
        if (ip.y < pt.y) == (np.y < pt.y) {
            continue;
        }
        if ip.x >= pt.x {
            if np.x > pt.x {
                inside = !inside;
                continue;
            }
        } else if np.x <= pt.x {
            continue;
        }
        let d = (ip.x - pt.x) * (np.y - pt.y) - (np.x - pt.x) * (ip.y - pt.y);
        if d == 0.0 {
            return PointLocation::OnBoundary;
        }
        if (d > 0.0) == (np.y > ip.y) {
            inside = !inside;
        }
    }
    if inside {
        PointLocation::Inside
    } else {
        PointLocation::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(min: f64, max: f64) -> Vec<Point2> {
        vec![
            Point2::new(min, min),
            Point2::new(max, min),
            Point2::new(max, max),
            Point2::new(min, max),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert_relative_eq!(signed_area_2d(&square(0.0, 1.0)), 1.0);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = square(0.0, 1.0);
        pts.reverse();
        assert_relative_eq!(signed_area_2d(&pts), -1.0);
    }

    #[test]
    fn signed_area_degenerate() {
        assert_relative_eq!(signed_area_2d(&[Point2::new(0.0, 0.0)]), 0.0);
        assert_relative_eq!(signed_area_2d(&[]), 0.0);
    }

    #[test]
    fn collinear_points() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 1.0);
        let c = Point2::new(3.0, 3.0);
        assert!(slopes_equal3(&a, &b, &c));
        assert!(!slopes_equal3(&a, &b, &Point2::new(3.0, 2.0)));
        assert!(slopes_equal4(&a, &b, &Point2::new(5.0, 0.0), &Point2::new(6.0, 1.0)));
    }

    #[test]
    fn between_checks() {
        let a = Point2::new(0.0, 0.0);
        let c = Point2::new(4.0, 0.0);
        assert!(pt2_is_between(&a, &Point2::new(2.0, 0.0), &c));
        assert!(!pt2_is_between(&a, &Point2::new(5.0, 0.0), &c));
        assert!(!pt2_is_between(&a, &a, &c));
        let v = Point2::new(0.0, 4.0);
        assert!(pt2_is_between(&a, &Point2::new(0.0, 1.0), &v));
    }

    #[test]
    fn inverse_slope_horizontal_sentinel() {
        let a = Point2::new(0.0, 0.0);
        assert_relative_eq!(inverse_slope(&a, &Point2::new(5.0, 0.0)), HORIZONTAL);
        assert_relative_eq!(inverse_slope(&a, &Point2::new(2.0, 4.0)), 0.5);
    }

    #[test]
    fn point_classification() {
        let sq = square(0.0, 10.0);
        assert_eq!(point_in_polygon(&Point2::new(5.0, 5.0), &sq), PointLocation::Inside);
        assert_eq!(point_in_polygon(&Point2::new(15.0, 5.0), &sq), PointLocation::Outside);
        assert_eq!(point_in_polygon(&Point2::new(10.0, 5.0), &sq), PointLocation::OnBoundary);
        assert_eq!(point_in_polygon(&Point2::new(0.0, 0.0), &sq), PointLocation::OnBoundary);
        assert_eq!(point_in_polygon(&Point2::new(5.0, 0.0), &sq), PointLocation::OnBoundary);
    }
}
