//! B-spline evaluation and adaptive flattening.
//!
//! DXF splines are (optionally rational) B-splines given by a degree, a
//! control polygon, a knot vector and per-point weights. lyon_geom only
//! handles Bézier segments, so splines are evaluated directly with de Boor's
//! algorithm and subdivided until each chord is within tolerance.

use crate::error::{GeometryError, Result};
use crate::geometry::Point;

/// Every knot span is split at least 2^MIN_DEPTH times. Catches S-curves
/// whose midpoint happens to sit on the chord.
const MIN_DEPTH: u32 = 2;
const MAX_DEPTH: u32 = 16;

/// A (rational) B-spline as read from a drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    pub degree: usize,
    pub control_points: Vec<Point>,
    /// Knot vector; replaced by a clamped uniform one when inconsistent
    pub knots: Vec<f64>,
    /// Per control point weights; empty means non-rational
    pub weights: Vec<f64>,
    /// Interpolation points, used only when there is no control polygon
    pub fit_points: Vec<Point>,
    pub closed: bool,
}

impl Spline {
    /// A non-rational spline with a clamped uniform knot vector.
    pub fn clamped(degree: usize, control_points: Vec<Point>, closed: bool) -> Self {
        Self {
            degree,
            control_points,
            knots: Vec::new(),
            weights: Vec::new(),
            fit_points: Vec::new(),
            closed,
        }
    }

    /// Flatten to a polyline whose chords deviate from the curve by at most
    /// `tolerance` (measured at chord midpoints).
    pub fn flatten(&self, tolerance: f64) -> Result<Vec<Point>> {
        if self.control_points.len() < 2 {
            if self.fit_points.len() >= 2 {
                log::debug!("spline without control polygon, using {} fit points", self.fit_points.len());
                return Ok(self.fit_points.clone());
            }
            return Err(GeometryError::UnsupportedGeometry(
                "spline needs at least 2 control points".to_string(),
            ));
        }
        if self.degree == 0 {
            return Err(GeometryError::UnsupportedGeometry("spline degree must be at least 1".to_string()));
        }

        let basis = Basis::new(self)?;
        let spans = basis.spans();
        let Some(&(first, _)) = spans.first() else {
            return Err(GeometryError::UnsupportedGeometry("spline has an empty parameter domain".to_string()));
        };

        let mut points = vec![basis.evaluate(first)];
        for (t0, t1) in spans {
            let p0 = basis.evaluate(t0);
            let p1 = basis.evaluate(t1);
            refine(&basis, (t0, p0), (t1, p1), tolerance, 0, &mut points);
        }
        Ok(points)
    }
}

/// Validated evaluation data for one spline.
struct Basis<'a> {
    degree: usize,
    points: &'a [Point],
    knots: Vec<f64>,
    weights: Vec<f64>,
}

impl<'a> Basis<'a> {
    fn new(spline: &'a Spline) -> Result<Self> {
        let n = spline.control_points.len();
        let degree = spline.degree.min(n - 1);

        let knots_ok = spline.knots.len() == n + degree + 1
            && spline.knots.iter().all(|k| k.is_finite())
            && spline.knots.windows(2).all(|w| w[0] <= w[1]);
        let knots = if knots_ok {
            spline.knots.clone()
        } else {
            if !spline.knots.is_empty() {
                log::debug!(
                    "spline knot vector has {} values, expected {}; using clamped uniform knots",
                    spline.knots.len(),
                    n + degree + 1
                );
            }
            clamped_uniform_knots(n, degree)
        };

        let weights_ok = spline.weights.len() == n && spline.weights.iter().all(|w| w.is_finite() && *w > 0.0);
        let weights = if weights_ok { spline.weights.clone() } else { vec![1.0; n] };

        if !(knots[n] > knots[degree]) {
            return Err(GeometryError::UnsupportedGeometry("spline has an empty parameter domain".to_string()));
        }

        Ok(Self { degree, points: &spline.control_points, knots, weights })
    }

    /// Non-empty knot spans inside the valid domain.
    fn spans(&self) -> Vec<(f64, f64)> {
        let n = self.points.len();
        (self.degree..n)
            .filter(|&k| self.knots[k + 1] > self.knots[k])
            .map(|k| (self.knots[k], self.knots[k + 1]))
            .collect()
    }

    /// Index k of the span containing `t`, knots[k] <= t < knots[k + 1].
    /// The domain end belongs to the last non-empty span.
    fn find_span(&self, t: f64) -> usize {
        let n = self.points.len();
        let mut span = self.degree;
        for k in self.degree..n {
            if self.knots[k] < self.knots[k + 1] && self.knots[k] <= t {
                span = k;
            }
        }
        span
    }

    /// de Boor's algorithm in homogeneous coordinates.
    fn evaluate(&self, t: f64) -> Point {
        let p = self.degree;
        let k = self.find_span(t);

        let mut d: Vec<(f64, f64, f64)> = (0..=p)
            .map(|j| {
                let i = j + k - p;
                let w = self.weights[i];
                (self.points[i].x * w, self.points[i].y * w, w)
            })
            .collect();

        for r in 1..=p {
            for j in (r..=p).rev() {
                let lo = self.knots[j + k - p];
                let hi = self.knots[j + 1 + k - r];
                let alpha = if hi > lo { (t - lo) / (hi - lo) } else { 0.0 };
                let (a, b) = (d[j - 1], d[j]);
                d[j] = (
                    (1.0 - alpha) * a.0 + alpha * b.0,
                    (1.0 - alpha) * a.1 + alpha * b.1,
                    (1.0 - alpha) * a.2 + alpha * b.2,
                );
            }
        }

        let (x, y, w) = d[p];
        Point::new(x / w, y / w)
    }
}

fn refine(
    basis: &Basis,
    (t0, p0): (f64, Point),
    (t1, p1): (f64, Point),
    tolerance: f64,
    depth: u32,
    out: &mut Vec<Point>,
) {
    let tm = 0.5 * (t0 + t1);
    let pm = basis.evaluate(tm);

    if depth < MAX_DEPTH && (depth < MIN_DEPTH || pm.distance_to_segment(p0, p1) > tolerance) {
        refine(basis, (t0, p0), (tm, pm), tolerance, depth + 1, out);
        refine(basis, (tm, pm), (t1, p1), tolerance, depth + 1, out);
    } else {
        out.push(p1);
    }
}

/// Clamped knot vector with uniform interior knots over [0, 1].
fn clamped_uniform_knots(n: usize, degree: usize) -> Vec<f64> {
    let interior = n - degree;
    let mut knots = Vec::with_capacity(n + degree + 1);
    knots.extend(std::iter::repeat_n(0.0, degree + 1));
    for i in 1..interior {
        knots.push(i as f64 / interior as f64);
    }
    knots.extend(std::iter::repeat_n(1.0, degree + 1));
    knots
}
