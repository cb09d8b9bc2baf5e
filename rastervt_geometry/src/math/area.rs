/// Twice the signed area of a ring given without its closing point.
///
/// Positive when the ring runs clockwise in a y-down space, which is how exterior rings are
/// oriented both in raster pixel space and in vector tiles.
pub fn ring_area_i64(ring: &[[i64; 2]]) -> i64 {
	let Some(last) = ring.last() else {
		return 0;
	};
	let mut sum = 0i64;
	let mut p2 = last;
	for p1 in ring {
		sum += (p2[0] - p1[0]) * (p1[1] + p2[1]);
		p2 = p1;
	}
	sum
}

/// Whether `point` lies inside the ring. Points exactly on an edge are not handled specially.
pub fn ring_contains(ring: &[[i64; 2]], point: [f64; 2]) -> bool {
	let Some(last) = ring.last() else {
		return false;
	};
	let [px, py] = point;
	let mut inside = false;
	let mut prev = last;
	for curr in ring {
		let (x1, y1) = (prev[0] as f64, prev[1] as f64);
		let (x2, y2) = (curr[0] as f64, curr[1] as f64);
		if (y1 > py) != (y2 > py) && px < x1 + (x2 - x1) * (py - y1) / (y2 - y1) {
			inside = !inside;
		}
		prev = curr;
	}
	inside
}

#[cfg(test)]
mod tests {
	use super::*;

	const SQUARE: [[i64; 2]; 4] = [[0, 0], [2, 0], [2, 2], [0, 2]];

	#[test]
	fn clockwise_in_y_down_is_positive() {
		assert_eq!(ring_area_i64(&SQUARE), 8);
		let mut reversed = SQUARE;
		reversed.reverse();
		assert_eq!(ring_area_i64(&reversed), -8);
		assert_eq!(ring_area_i64(&[]), 0);
		assert_eq!(ring_area_i64(&[[0, 0], [1, 1], [2, 2]]), 0);
	}

	#[test]
	fn containment() {
		assert!(ring_contains(&SQUARE, [0.5, 0.5]));
		assert!(ring_contains(&SQUARE, [1.5, 1.5]));
		assert!(!ring_contains(&SQUARE, [2.5, 0.5]));
		assert!(!ring_contains(&SQUARE, [-0.5, 1.5]));
	}
}
