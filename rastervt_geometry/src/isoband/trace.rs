//! Boundary edges between bins and their tracing into closed rings.
//!
//! Vertices are pixel corners `[column, row]` with rows growing downwards. Every edge is one pixel
//! long and keeps its bin on the right-hand side, so exterior rings run clockwise and holes run
//! counter-clockwise.

use anyhow::{Result, bail};
use std::collections::{BTreeMap, HashMap};

pub type Vertex = [i64; 2];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
	pub from: Vertex,
	pub to: Vertex,
}

impl Edge {
	fn direction(&self) -> [i64; 2] {
		[self.to[0] - self.from[0], self.to[1] - self.from[1]]
	}
}

/// Collects the boundary edges of every occupied bin, keyed by bin.
pub fn boundary_edges(bins: &[Option<i64>], width: usize, height: usize) -> BTreeMap<i64, Vec<Edge>> {
	let bin_at = |col: i64, row: i64| -> Option<i64> {
		if col < 0 || row < 0 || col >= width as i64 || row >= height as i64 {
			None
		} else {
			bins[row as usize * width + col as usize]
		}
	};

	let mut edges: BTreeMap<i64, Vec<Edge>> = BTreeMap::new();
	for row in 0..height as i64 {
		for col in 0..width as i64 {
			let Some(bin) = bin_at(col, row) else {
				continue;
			};
			let differs = |c: i64, r: i64| bin_at(c, r) != Some(bin);
			let list = edges.entry(bin).or_default();
			let (x, y) = (col, row);
			if differs(col, row - 1) {
				list.push(Edge { from: [x, y], to: [x + 1, y] });
			}
			if differs(col + 1, row) {
				list.push(Edge { from: [x + 1, y], to: [x + 1, y + 1] });
			}
			if differs(col, row + 1) {
				list.push(Edge { from: [x + 1, y + 1], to: [x, y + 1] });
			}
			if differs(col - 1, row) {
				list.push(Edge { from: [x, y + 1], to: [x, y] });
			}
		}
	}
	edges
}

/// Lower is preferred: right turn, straight on, left turn.
fn turn_rank(incoming: [i64; 2], outgoing: [i64; 2]) -> u8 {
	let right = [-incoming[1], incoming[0]];
	if outgoing == right {
		0
	} else if outgoing == incoming {
		1
	} else {
		2
	}
}

/// Drops vertices in the middle of straight runs, treating `path` as closed.
fn simplify(path: Vec<Vertex>) -> Vec<Vertex> {
	let n = path.len();
	let step = |a: Vertex, b: Vertex| [(b[0] - a[0]).signum(), (b[1] - a[1]).signum()];
	(0..n)
		.filter(|&i| step(path[(i + n - 1) % n], path[i]) != step(path[i], path[(i + 1) % n]))
		.map(|i| path[i])
		.collect()
}

/// Links edges into closed rings without repeated or collinear vertices.
///
/// Where two regions of the bin touch diagonally, the right turn is taken, so the regions become
/// separate rings sharing one vertex. A walk that comes back to a vertex it already passed cuts
/// that loop off as a ring of its own, so no ring touches itself. Such a loop runs
/// counter-clockwise when it encloses a hole that touches the exterior at a single vertex.
pub fn trace_rings(edges: &[Edge]) -> Result<Vec<Vec<Vertex>>> {
	let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::with_capacity(edges.len());
	for (index, edge) in edges.iter().enumerate() {
		outgoing.entry(edge.from).or_default().push(index);
	}

	let mut used = vec![false; edges.len()];
	let mut rings = Vec::new();

	for start in 0..edges.len() {
		if used[start] {
			continue;
		}

		let mut path: Vec<Vertex> = Vec::new();
		let mut position: HashMap<Vertex, usize> = HashMap::new();
		let mut current = start;
		loop {
			used[current] = true;
			let edge = edges[current];
			position.insert(edge.from, path.len());
			path.push(edge.from);

			if let Some(&cut) = position.get(&edge.to) {
				let lobe = path.split_off(cut);
				for vertex in &lobe {
					position.remove(vertex);
				}
				rings.push(simplify(lobe));
				if path.is_empty() {
					break;
				}
			}

			let direction = edge.direction();
			let next = outgoing
				.get(&edge.to)
				.into_iter()
				.flatten()
				.copied()
				.filter(|&candidate| !used[candidate])
				.min_by_key(|&candidate| turn_rank(direction, edges[candidate].direction()));
			match next {
				Some(next) => current = next,
				None => bail!("boundary at {:?} does not close", edge.to),
			}
		}
	}

	Ok(rings)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn rings_of(bins: &[Option<i64>], width: usize, height: usize) -> BTreeMap<i64, Vec<Vec<Vertex>>> {
		boundary_edges(bins, width, height)
			.into_iter()
			.map(|(bin, edges)| (bin, trace_rings(&edges).unwrap()))
			.collect()
	}

	#[test]
	fn block_becomes_one_clockwise_rectangle() {
		let rings = rings_of(&[Some(1); 6], 3, 2);
		assert_eq!(rings[&1], vec![vec![[0, 0], [3, 0], [3, 2], [0, 2]]]);
	}

	#[test]
	fn hole_runs_counter_clockwise() {
		let mut bins = vec![Some(0); 9];
		bins[4] = Some(7);
		let rings = rings_of(&bins, 3, 3);
		assert_eq!(rings[&0].len(), 2);
		assert_eq!(rings[&0][0], vec![[0, 0], [3, 0], [3, 3], [0, 3]]);
		assert_eq!(rings[&0][1], vec![[2, 1], [1, 1], [1, 2], [2, 2]]);
		assert_eq!(rings[&7], vec![vec![[1, 1], [2, 1], [2, 2], [1, 2]]]);
	}

	#[test]
	fn diagonal_pinch_splits_rings() {
		let bins = [Some(1), Some(0), Some(0), Some(1)];
		let rings = rings_of(&bins, 2, 2);
		assert_eq!(
			rings[&1],
			vec![vec![[0, 0], [1, 0], [1, 1], [0, 1]], vec![[1, 1], [2, 1], [2, 2], [1, 2]]]
		);
		assert_eq!(rings[&0].len(), 2);
	}

	#[test]
	fn hole_touching_the_exterior_is_cut_off() {
		// the two bin 2 cells meet diagonally at [1, 1], the bin 0 hole touches its exterior there
		#[rustfmt::skip]
		let bins = [
			Some(2), Some(0), Some(0), Some(0),
			Some(0), Some(2), Some(0), Some(0),
			Some(0), Some(0), Some(0), Some(0),
			Some(0), Some(0), Some(0), Some(0),
		];
		let rings = rings_of(&bins, 4, 4);
		assert_eq!(
			rings[&0],
			vec![
				vec![[1, 1], [1, 2], [2, 2], [2, 1]],
				vec![[1, 0], [4, 0], [4, 4], [0, 4], [0, 1], [1, 1]],
			]
		);
		assert_eq!(rings[&2].len(), 2);
	}

	#[test]
	fn rings_never_repeat_a_vertex() {
		#[rustfmt::skip]
		let bins = [
			Some(2), Some(0), Some(0), Some(0),
			Some(0), Some(2), Some(0), None,
			Some(0), Some(0), Some(0), None,
		];
		for (_, rings) in rings_of(&bins, 4, 3) {
			for ring in rings {
				let mut sorted = ring.clone();
				sorted.sort_unstable();
				sorted.dedup();
				assert_eq!(sorted.len(), ring.len(), "{ring:?}");
			}
		}
	}

	#[test]
	fn nodata_cells_produce_no_edges() {
		let bins = [None, Some(2), None, None];
		let edges = boundary_edges(&bins, 2, 2);
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[&2].len(), 4);
	}
}
