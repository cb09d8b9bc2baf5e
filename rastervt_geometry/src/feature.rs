//! Vectorized bins and the spatial index used to find them per tile.

use geo::{BoundingRect, MultiPolygon, Polygon, Rect};
use rstar::{AABB, RTree, RTreeObject};

/// All cells of one interval bin, as polygons in tile grid coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct BandFeature {
	pub id: u64,
	pub bin: i64,
	/// Representative value of the bin: `bin * interval`.
	pub value: f64,
	pub geometry: MultiPolygon<f64>,
}

#[derive(Clone, Debug)]
struct PolygonBox {
	feature: usize,
	polygon: usize,
	bbox: Rect<f64>,
}

impl RTreeObject for PolygonBox {
	type Envelope = AABB<[f64; 2]>;

	fn envelope(&self) -> Self::Envelope {
		AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
	}
}

/// The features of one run, built once and queried by every tile of every zoom level.
pub struct FeatureCollection {
	features: Vec<BandFeature>,
	rtree: RTree<PolygonBox>,
}

impl FeatureCollection {
	#[must_use]
	pub fn new(features: Vec<BandFeature>) -> FeatureCollection {
		let boxes = features
			.iter()
			.enumerate()
			.flat_map(|(feature, f)| {
				f.geometry.0.iter().enumerate().filter_map(move |(polygon, p)| {
					p.bounding_rect().map(|bbox| PolygonBox { feature, polygon, bbox })
				})
			})
			.collect();

		FeatureCollection {
			features,
			rtree: RTree::bulk_load(boxes),
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.features.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &BandFeature> {
		self.features.iter()
	}

	/// Bounding box of every polygon, or `None` for an empty collection.
	#[must_use]
	pub fn bounds(&self) -> Option<Rect<f64>> {
		if self.rtree.size() == 0 {
			return None;
		}
		let envelope = self.rtree.root().envelope();
		Some(Rect::new(envelope.lower(), envelope.upper()))
	}

	/// Features with at least one polygon whose bounding box touches `area`, each paired with
	/// only those polygons. Features come back in collection order.
	pub fn query(&self, area: &Rect<f64>) -> Vec<(&BandFeature, Vec<&Polygon<f64>>)> {
		let envelope = AABB::from_corners(area.min().into(), area.max().into());
		let mut hits: Vec<(usize, usize)> = self
			.rtree
			.locate_in_envelope_intersecting(&envelope)
			.map(|entry| (entry.feature, entry.polygon))
			.collect();
		hits.sort_unstable();

		let mut result: Vec<(&BandFeature, Vec<&Polygon<f64>>)> = Vec::new();
		let mut last = None;
		for (feature, polygon) in hits {
			let f = &self.features[feature];
			if last != Some(feature) {
				result.push((f, Vec::new()));
				last = Some(feature);
			}
			if let Some((_, polygons)) = result.last_mut() {
				polygons.push(&f.geometry.0[polygon]);
			}
		}
		result
	}
}
