//! Polygon containment against the silhouette the graph is drawn inside.
//!
//! All polygon math runs in normalized `0..1` space; the `*_scaled` helpers
//! convert from and to pixel coordinates of a `width x height` viewport.

use serde::{Deserialize, Serialize};

use super::error::LayoutError;

/// Fraction of the way from the boundary toward the interior reference a
/// projected point is moved, so it lands strictly inside.
pub const INTERIOR_NUDGE: f64 = 0.05;

/// Halvings used to walk back inside when the nudge alone leaves the point
/// outside a non-star-shaped outline.
const BISECTION_STEPS: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	pub fn distance_sq(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		dx * dx + dy * dy
	}

	pub fn lerp(self, other: Point, t: f64) -> Point {
		Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
	}
}

/// Closest point to `p` on segment `a..b`. A zero-length segment yields `a`.
pub fn closest_on_segment(p: Point, a: Point, b: Point) -> Point {
	let (vx, vy) = (b.x - a.x, b.y - a.y);
	let len_sq = vx * vx + vy * vy;
	let t = if len_sq > 0.0 {
		(((p.x - a.x) * vx + (p.y - a.y) * vy) / len_sq).clamp(0.0, 1.0)
	} else {
		0.0
	};
	Point::new(a.x + t * vx, a.y + t * vy)
}

/// A closed polygon in normalized coordinates plus the interior point
/// projections are nudged toward.
#[derive(Clone, Debug, PartialEq)]
pub struct Silhouette {
	vertices: Vec<Point>,
	interior: Point,
}

impl Silhouette {
	/// Builds a silhouette whose interior reference is the vertex average.
	pub fn new(vertices: Vec<Point>) -> Result<Self, LayoutError> {
		if vertices.len() < 3 {
			return Err(LayoutError::TooFewVertices(vertices.len()));
		}
		let n = vertices.len() as f64;
		let (sx, sy) = vertices
			.iter()
			.fold((0.0, 0.0), |(sx, sy), v| (sx + v.x, sy + v.y));
		Self::with_interior(vertices, Point::new(sx / n, sy / n))
	}

	/// Builds a silhouette with an explicit interior reference. Projection is
	/// tightest when the polygon is star-shaped around `interior`, but any
	/// simple polygon containing it is accepted.
	pub fn with_interior(vertices: Vec<Point>, interior: Point) -> Result<Self, LayoutError> {
		if vertices.len() < 3 {
			return Err(LayoutError::TooFewVertices(vertices.len()));
		}
		if let Some(i) = vertices.iter().position(|v| !v.is_finite()) {
			return Err(LayoutError::NonFiniteVertex(i));
		}
		let silhouette = Self { vertices, interior };
		if !interior.is_finite() || !silhouette.contains(interior) {
			return Err(LayoutError::InteriorOutside {
				x: interior.x,
				y: interior.y,
			});
		}
		Ok(silhouette)
	}

	/// Lateral outline of a brain, frontal lobe to the left, with the
	/// cerebellum and brain stem below the occipital lobe.
	pub fn brain() -> Self {
		Self {
			vertices: BRAIN_OUTLINE.iter().map(|&(x, y)| Point::new(x, y)).collect(),
			interior: Point::new(0.5, 0.47),
		}
	}

	pub fn vertices(&self) -> &[Point] {
		&self.vertices
	}

	pub fn interior(&self) -> Point {
		self.interior
	}

	fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
		let n = self.vertices.len();
		(0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
	}

	/// Even-odd ray casting. Points exactly on the boundary may land on
	/// either side.
	pub fn contains(&self, p: Point) -> bool {
		let mut inside = false;
		for (a, b) in self.edges() {
			if (a.y > p.y) != (b.y > p.y) {
				let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
				if p.x < x_cross {
					inside = !inside;
				}
			}
		}
		inside
	}

	/// Returns `p` untouched when inside, otherwise the nearest boundary
	/// point pulled [`INTERIOR_NUDGE`] toward the interior reference.
	///
	/// When that nudged point is still outside (a notch or concavity between
	/// the boundary and the reference), the segment toward the reference is
	/// bisected, keeping the contained end, so the result is always inside.
	pub fn project(&self, p: Point) -> Point {
		if self.contains(p) {
			return p;
		}
		let mut best = self.vertices[0];
		let mut best_d2 = f64::INFINITY;
		for (a, b) in self.edges() {
			let q = closest_on_segment(p, a, b);
			let d2 = q.distance_sq(p);
			if d2 < best_d2 {
				best_d2 = d2;
				best = q;
			}
		}
		let nudged = best.lerp(self.interior, INTERIOR_NUDGE);
		if self.contains(nudged) {
			return nudged;
		}

		let (mut outside, mut inside) = (nudged, self.interior);
		for _ in 0..BISECTION_STEPS {
			let mid = outside.lerp(inside, 0.5);
			if self.contains(mid) {
				inside = mid;
			} else {
				outside = mid;
			}
		}

		// `inside` now hugs the boundary; back it off toward the reference.
		let mut fraction = INTERIOR_NUDGE;
		for _ in 0..BISECTION_STEPS {
			let candidate = inside.lerp(self.interior, fraction);
			if self.contains(candidate) {
				return candidate;
			}
			fraction *= 0.5;
		}
		inside
	}

	pub fn contains_scaled(&self, x: f64, y: f64, width: f64, height: f64) -> bool {
		self.contains(normalize(x, y, width, height))
	}

	/// Pixel-space projection. A contained point comes back bit-identical.
	pub fn project_scaled(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
		let p = normalize(x, y, width, height);
		if self.contains(p) {
			return (x, y);
		}
		let q = self.project(p);
		(q.x * width, q.y * height)
	}
}

impl Default for Silhouette {
	fn default() -> Self {
		Self::brain()
	}
}

fn normalize(x: f64, y: f64, width: f64, height: f64) -> Point {
	Point::new(x / width.max(f64::EPSILON), y / height.max(f64::EPSILON))
}

// Star-shaped around (0.5, 0.47): vertex angles increase monotonically
// around that point.
const BRAIN_OUTLINE: [(f64, f64); 32] = [
	(0.930, 0.470),
	(0.916, 0.553),
	(0.880, 0.627),
	(0.836, 0.694),
	(0.787, 0.757),
	(0.709, 0.783),
	(0.619, 0.756),
	(0.561, 0.776),
	(0.500, 0.854),
	(0.434, 0.801),
	(0.383, 0.754),
	(0.303, 0.765),
	(0.227, 0.743),
	(0.162, 0.696),
	(0.125, 0.626),
	(0.108, 0.548),
	(0.083, 0.470),
	(0.085, 0.387),
	(0.122, 0.313),
	(0.176, 0.253),
	(0.238, 0.208),
	(0.304, 0.176),
	(0.370, 0.156),
	(0.435, 0.144),
	(0.500, 0.140),
	(0.565, 0.144),
	(0.630, 0.156),
	(0.696, 0.176),
	(0.762, 0.208),
	(0.824, 0.253),
	(0.878, 0.313),
	(0.916, 0.387),
];

#[cfg(test)]
mod tests {
	use super::*;

	fn unit_square() -> Silhouette {
		Silhouette::new(vec![
			Point::new(0.0, 0.0),
			Point::new(1.0, 0.0),
			Point::new(1.0, 1.0),
			Point::new(0.0, 1.0),
		])
		.unwrap()
	}

	#[test]
	fn square_contains() {
		let sq = unit_square();
		assert!(sq.contains(Point::new(0.5, 0.5)));
		assert!(sq.contains(Point::new(0.01, 0.99)));
		assert!(!sq.contains(Point::new(1.5, 0.5)));
		assert!(!sq.contains(Point::new(-0.1, -0.1)));
	}

	#[test]
	fn projection_lands_inside_near_boundary() {
		let sq = unit_square();
		let q = sq.project(Point::new(2.0, 0.5));
		// Boundary point (1.0, 0.5), nudged 5% toward (0.5, 0.5).
		assert!((q.x - 0.975).abs() < 1e-12);
		assert!((q.y - 0.5).abs() < 1e-12);
		assert!(sq.contains(q));
	}

	#[test]
	fn inside_point_is_fixed() {
		let sq = unit_square();
		let p = Point::new(0.3, 0.7);
		assert_eq!(sq.project(p), p);
	}

	#[test]
	fn degenerate_edge_does_not_divide_by_zero() {
		let a = Point::new(0.2, 0.2);
		let q = closest_on_segment(Point::new(1.0, 1.0), a, a);
		assert_eq!(q, a);

		// A repeated vertex gives a zero-length edge.
		let sil = Silhouette::new(vec![
			Point::new(0.0, 0.0),
			Point::new(1.0, 0.0),
			Point::new(1.0, 0.0),
			Point::new(0.5, 1.0),
		])
		.unwrap();
		let q = sil.project(Point::new(1.0, -0.5));
		assert!(q.is_finite());
		assert!(sil.contains(q));
	}

	#[test]
	fn rejects_degenerate_polygons() {
		assert!(matches!(
			Silhouette::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]),
			Err(LayoutError::TooFewVertices(2))
		));
		assert!(matches!(
			Silhouette::new(vec![
				Point::new(0.0, 0.0),
				Point::new(f64::NAN, 0.0),
				Point::new(0.0, 1.0),
			]),
			Err(LayoutError::NonFiniteVertex(1))
		));
		let square = unit_square().vertices().to_vec();
		assert!(matches!(
			Silhouette::with_interior(square, Point::new(3.0, 3.0)),
			Err(LayoutError::InteriorOutside { .. })
		));
	}

	/// 10x10 square with a thin slot cut in from the right edge between
	/// y = 7.9 and y = 8.1, reaching in to x = 4.
	fn notched_square() -> Silhouette {
		Silhouette::with_interior(
			vec![
				Point::new(0.0, 0.0),
				Point::new(10.0, 0.0),
				Point::new(10.0, 7.9),
				Point::new(4.0, 7.9),
				Point::new(4.0, 8.1),
				Point::new(10.0, 8.1),
				Point::new(10.0, 10.0),
				Point::new(0.0, 10.0),
			],
			Point::new(5.5, 6.5),
		)
		.unwrap()
	}

	#[test]
	fn projection_out_of_a_notch_lands_inside() {
		let sil = notched_square();
		let p = Point::new(6.0, 8.09);
		assert!(!sil.contains(p));

		// The nudge alone would stop at (5.975, 8.02), still in the slot.
		assert!(!sil.contains(Point::new(5.975, 8.02)));
		let q = sil.project(p);
		assert!(sil.contains(q), "{q:?} is outside");
		assert_eq!(sil.project(q), q);
	}

	#[test]
	fn projection_into_non_star_outline_always_contained() {
		let sil = notched_square();
		for i in 0..=60 {
			for j in 0..=60 {
				let p = Point::new(-2.0 + i as f64 * 0.25, -2.0 + j as f64 * 0.25);
				let q = sil.project(p);
				assert!(sil.contains(q), "{p:?} projected to {q:?}");
			}
		}
		for k in 0..40 {
			let p = Point::new(4.5 + k as f64 * 0.13, 7.95 + (k % 3) as f64 * 0.05);
			assert!(sil.contains(sil.project(p)), "{p:?}");
		}
	}

	#[test]
	fn brain_is_star_shaped_around_interior() {
		let brain = Silhouette::brain();
		let c = brain.interior();
		assert!(brain.contains(c));
		let angles: Vec<f64> = brain
			.vertices()
			.iter()
			.map(|v| (v.y - c.y).atan2(v.x - c.x).rem_euclid(std::f64::consts::TAU))
			.collect();
		assert!(angles.windows(2).all(|w| w[0] < w[1]));
	}

	#[test]
	fn scaled_projection_round_trips_inside_points() {
		let brain = Silhouette::brain();
		assert_eq!(brain.project_scaled(400.0, 280.0, 800.0, 600.0), (400.0, 280.0));
		let (x, y) = brain.project_scaled(-50.0, 900.0, 800.0, 600.0);
		assert!(brain.contains_scaled(x, y, 800.0, 600.0));
	}
}
