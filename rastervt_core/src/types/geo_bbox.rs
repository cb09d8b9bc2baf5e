//! Axis-aligned bounding boxes in the coordinates of whatever CRS they were read from.

use anyhow::{Result, ensure};
use std::fmt::Debug;

/// Rectangle `[x_min, x_max] × [y_min, y_max]`. Constructed boxes are finite and not inverted.
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		ensure!(
			[x_min, y_min, x_max, y_max].iter().all(|v| v.is_finite()),
			"bounding box values must be finite: {x_min}, {y_min}, {x_max}, {y_max}"
		);
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		Ok(GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	#[must_use]
	pub fn center(&self) -> (f64, f64) {
		((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	/// `x_min,y_min,x_max,y_max`, the layout MBTiles uses for `bounds`.
	#[must_use]
	pub fn as_string_list(&self) -> String {
		format!("{},{},{},{}", self.x_min, self.y_min, self.x_max, self.y_max)
	}

	pub fn extend(&mut self, other: &GeoBBox) {
		self.x_min = self.x_min.min(other.x_min);
		self.y_min = self.y_min.min(other.y_min);
		self.x_max = self.x_max.max(other.x_max);
		self.y_max = self.y_max.max(other.y_max);
	}

	/// True when the boxes share more than a boundary line.
	#[must_use]
	pub fn overlaps(&self, other: &GeoBBox) -> bool {
		self.x_min < other.x_max && other.x_min < self.x_max && self.y_min < other.y_max && other.y_min < self.y_max
	}
}

impl TryFrom<Vec<f64>> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(input: Vec<f64>) -> Result<Self> {
		ensure!(input.len() == 4, "bounding box needs 4 values, got {}", input.len());
		GeoBBox::new(input[0], input[1], input[2], input[3])
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GeoBBox[{}, {}, {}, {}]",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}
