use super::trace::Vertex;
use crate::math::{ring_area_i64, ring_contains};
use log::debug;

/// A polygon in pixel space: one clockwise exterior and its counter-clockwise holes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelPolygon {
	pub exterior: Vec<Vertex>,
	pub holes: Vec<Vec<Vertex>>,
}

/// Centre of the cell on the right of the ring's first edge. That cell belongs to the bin.
fn probe_point(ring: &[Vertex]) -> [f64; 2] {
	let [x0, y0] = ring[0];
	let [x1, y1] = ring[1 % ring.len()];
	let (dx, dy) = ((x1 - x0).signum(), (y1 - y0).signum());
	let (rx, ry) = (-dy, dx);
	[
		x0 as f64 + 0.5 * (dx + rx) as f64,
		y0 as f64 + 0.5 * (dy + ry) as f64,
	]
}

/// Sorts the traced rings of one bin into exteriors and holes and attaches each hole to the
/// smallest exterior that contains the bin cell next to it.
pub fn assemble(rings: Vec<Vec<Vertex>>) -> Vec<PixelPolygon> {
	let mut exteriors: Vec<(i64, PixelPolygon)> = Vec::new();
	let mut holes = Vec::new();

	for ring in rings {
		let area = ring_area_i64(&ring);
		if area > 0 {
			exteriors.push((
				area,
				PixelPolygon {
					exterior: ring,
					holes: Vec::new(),
				},
			));
		} else if area < 0 {
			holes.push(ring);
		}
	}

	let mut by_size: Vec<usize> = (0..exteriors.len()).collect();
	by_size.sort_by_key(|&index| exteriors[index].0);

	for hole in holes {
		let probe = probe_point(&hole);
		let owner = by_size
			.iter()
			.copied()
			.find(|&index| ring_contains(&exteriors[index].1.exterior, probe));
		match owner {
			Some(index) => exteriors[index].1.holes.push(hole),
			None => debug!("dropping hole at {:?} without an enclosing ring", hole[0]),
		}
	}

	exteriors.into_iter().map(|(_, polygon)| polygon).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn square(x: i64, y: i64, size: i64) -> Vec<Vertex> {
		vec![[x, y], [x + size, y], [x + size, y + size], [x, y + size]]
	}

	fn hole(x: i64, y: i64, size: i64) -> Vec<Vertex> {
		let mut ring = square(x, y, size);
		ring.reverse();
		ring
	}

	#[test]
	fn probe_is_inside_the_bin() {
		// hole of a 3x3 block with a missing centre, traced from [2, 1] heading west
		assert_eq!(probe_point(&[[2, 1], [1, 1], [1, 2], [2, 2]]), [1.5, 0.5]);
		assert_eq!(probe_point(&square(0, 0, 1)), [0.5, 0.5]);
	}

	#[test]
	fn holes_go_to_the_smallest_enclosing_exterior() {
		// an island inside the hole of a larger ring, the island itself has a hole
		let rings = vec![hole(3, 3, 1), square(0, 0, 9), hole(1, 1, 7), square(2, 2, 5)];
		let polygons = assemble(rings);
		assert_eq!(polygons.len(), 2);
		assert_eq!(polygons[0].exterior, square(0, 0, 9));
		assert_eq!(polygons[0].holes, vec![hole(1, 1, 7)]);
		assert_eq!(polygons[1].exterior, square(2, 2, 5));
		assert_eq!(polygons[1].holes, vec![hole(3, 3, 1)]);
	}

	#[test]
	fn orphan_hole_is_dropped() {
		let polygons = assemble(vec![square(0, 0, 2), hole(5, 5, 1)]);
		assert_eq!(polygons.len(), 1);
		assert!(polygons[0].holes.is_empty());
	}
}
