//! Clipping polygons to a tile and quantizing them to the tile's integer extent.

use crate::{
	math::ring_area_i64,
	vector_tile::{TilePolygon, TileRing},
};
use geo::{BooleanOps, BoundingRect, Coord, LineString, MultiPolygon, Polygon, Rect, Validation};

/// Polygons of one feature inside one tile.
#[derive(Debug, Default, PartialEq)]
pub struct ClippedFeature {
	pub polygons: Vec<TilePolygon>,
	/// Validation failures of dropped fragments.
	pub rejected: Vec<String>,
}

impl ClippedFeature {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.polygons.is_empty()
	}
}

/// Clips grid coordinates to one tile and maps them to `[0, extent - 1]`, row 0 at the top.
pub struct TileClipper {
	bounds: Rect<f64>,
	area: Polygon<f64>,
	extent: i64,
	scale: f64,
}

impl TileClipper {
	#[must_use]
	pub fn new(bounds: Rect<f64>, extent: u32) -> TileClipper {
		TileClipper {
			bounds,
			area: bounds.to_polygon(),
			extent: i64::from(extent),
			scale: f64::from(extent) / bounds.width(),
		}
	}

	#[must_use]
	pub fn bounds(&self) -> &Rect<f64> {
		&self.bounds
	}

	fn quantize(&self, c: Coord<f64>) -> [i64; 2] {
		let max = self.extent - 1;
		let x = ((c.x - self.bounds.min().x) * self.scale).round() as i64;
		let y = ((self.bounds.max().y - c.y) * self.scale).round() as i64;
		[x.clamp(0, max), y.clamp(0, max)]
	}

	fn quantize_ring(&self, ring: &LineString<f64>) -> Option<TileRing> {
		let points: TileRing = ring.0.iter().map(|c| self.quantize(*c)).collect();
		let ring = clean_ring(points);
		(ring.len() >= 3 && ring_area_i64(&ring) != 0).then_some(ring)
	}

	fn inside(&self, polygon: &Polygon<f64>) -> bool {
		polygon.bounding_rect().is_some_and(|r| {
			r.min().x >= self.bounds.min().x
				&& r.min().y >= self.bounds.min().y
				&& r.max().x <= self.bounds.max().x
				&& r.max().y <= self.bounds.max().y
		})
	}

	/// Clips, quantizes, cleans and validates the polygons of one feature.
	///
	/// Degenerate fragments vanish silently. When quantization breaks a fragment, the holes that
	/// cause it are dropped, or the whole fragment when its exterior is broken. Each such fragment
	/// is reported in [`ClippedFeature::rejected`].
	pub fn clip(&self, polygons: &[&Polygon<f64>]) -> ClippedFeature {
		let mut result = ClippedFeature::default();
		for polygon in polygons {
			let pieces = if self.inside(polygon) {
				MultiPolygon::new(vec![(*polygon).clone()])
			} else {
				polygon.intersection(&self.area)
			};

			for piece in pieces {
				let Some(mut exterior) = self.quantize_ring(piece.exterior()) else {
					continue;
				};
				if ring_area_i64(&exterior) < 0 {
					exterior.reverse();
				}
				let mut rings = vec![exterior];
				for interior in piece.interiors() {
					if let Some(mut hole) = self.quantize_ring(interior) {
						if ring_area_i64(&hole) > 0 {
							hole.reverse();
						}
						rings.push(hole);
					}
				}

				match validate(&rings) {
					Ok(()) => result.polygons.push(rings),
					Err(reason) => {
						if let Some(rings) = without_broken_holes(rings) {
							result.polygons.push(rings);
						}
						result.rejected.push(reason);
					}
				}
			}
		}
		result
	}
}

/// Removes repeated and collinear points, including across the ring's start.
fn clean_ring(points: TileRing) -> TileRing {
	let mut ring: TileRing = Vec::with_capacity(points.len());
	for point in points {
		if ring.last() == Some(&point) {
			continue;
		}
		while ring.len() >= 2 && collinear(ring[ring.len() - 2], ring[ring.len() - 1], point) {
			ring.pop();
		}
		ring.push(point);
	}

	// close the loop: trailing duplicates of the start and collinear points at the seam
	loop {
		let n = ring.len();
		if n < 3 {
			break;
		}
		if ring[n - 1] == ring[0] {
			ring.pop();
		} else if collinear(ring[n - 2], ring[n - 1], ring[0]) {
			ring.pop();
		} else if collinear(ring[n - 1], ring[0], ring[1]) {
			ring.remove(0);
		} else {
			break;
		}
	}
	ring
}

fn collinear(a: [i64; 2], b: [i64; 2], c: [i64; 2]) -> bool {
	(b[0] - a[0]) * (c[1] - a[1]) == (b[1] - a[1]) * (c[0] - a[0])
}

/// Keeps the exterior and every hole that does not invalidate it, `None` if the exterior is invalid.
fn without_broken_holes(mut rings: Vec<TileRing>) -> Option<Vec<TileRing>> {
	let holes = rings.split_off(1);
	validate(&rings).ok()?;
	for hole in holes {
		rings.push(hole);
		if validate(&rings).is_err() {
			rings.pop();
		}
	}
	Some(rings)
}

fn validate(rings: &[TileRing]) -> Result<(), String> {
	let to_line = |ring: &TileRing| -> LineString<f64> {
		ring
			.iter()
			.map(|[x, y]| Coord {
				x: *x as f64,
				y: *y as f64,
			})
			.collect()
	};
	let polygon = Polygon::new(to_line(&rings[0]), rings[1..].iter().map(to_line).collect());
	polygon.check_validation().map_err(|err| err.to_string())
}
