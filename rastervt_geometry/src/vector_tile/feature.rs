use super::geometry_type::GeomType;
use crate::math::ring_area_i64;
use anyhow::{Context, Result, bail, ensure};
use log::trace;
use rastervt_core::{
	Blob,
	io::{ValueReader, ValueReaderSlice, ValueWriter, ValueWriterBlob, wire},
};

/// Ring in tile coordinates without a closing point. Exteriors have a positive area in the
/// y-down tile space, holes a negative one.
pub type TileRing = Vec<[i64; 2]>;

/// Exterior ring followed by its holes.
pub type TilePolygon = Vec<TileRing>;

const MOVE_TO: u64 = 1;
const LINE_TO: u64 = 2;
const CLOSE_PATH: u64 = 7;

fn command(id: u64, count: usize) -> u64 {
	((count as u64) << 3) | id
}

#[derive(Clone, Debug, PartialEq)]
pub struct VectorTileFeature {
	pub id: Option<u64>,
	pub tag_ids: Vec<u32>,
	pub geom_type: GeomType,
	pub geom_data: Blob,
}

impl VectorTileFeature {
	pub fn read(reader: &mut dyn ValueReader<'_>) -> Result<VectorTileFeature> {
		let mut feature = VectorTileFeature {
			id: None,
			tag_ids: Vec::new(),
			geom_type: GeomType::Unknown,
			geom_data: Blob::new_empty(),
		};

		while reader.has_remaining() {
			match reader.read_pbf_key()? {
				(1, wire::VARINT) => feature.id = Some(reader.read_varint().context("reading feature id")?),
				(2, wire::LEN) => feature.tag_ids = reader.read_pbf_packed_uint32().context("reading tags")?,
				(3, wire::VARINT) => feature.geom_type = GeomType::from(reader.read_varint()?),
				(4, wire::LEN) => feature.geom_data = reader.read_pbf_blob().context("reading geometry")?,
				(field, wire_type) => {
					trace!("skipping feature field {field}");
					reader.skip_pbf_value(wire_type)?;
				}
			}
		}

		Ok(feature)
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		if let Some(id) = self.id {
			writer.write_pbf_key(1, wire::VARINT)?;
			writer.write_varint(id)?;
		}

		if !self.tag_ids.is_empty() {
			writer.write_pbf_key(2, wire::LEN)?;
			writer.write_pbf_packed_uint32(&self.tag_ids)?;
		}

		writer.write_pbf_key(3, wire::VARINT)?;
		writer.write_varint(self.geom_type.as_u64())?;

		if !self.geom_data.is_empty() {
			writer.write_pbf_message(4, &self.geom_data)?;
		}

		Ok(writer.into_blob())
	}

	/// Encodes polygons as a MoveTo/LineTo/ClosePath command stream with zigzag deltas.
	/// Rings with fewer than three points are skipped.
	pub fn from_polygons(id: Option<u64>, tag_ids: Vec<u32>, polygons: &[TilePolygon]) -> Result<VectorTileFeature> {
		let mut writer = ValueWriterBlob::new();
		let mut cursor = [0i64, 0i64];
		let mut write_point = |writer: &mut ValueWriterBlob, point: &[i64; 2]| -> Result<()> {
			writer.write_svarint(point[0] - cursor[0])?;
			writer.write_svarint(point[1] - cursor[1])?;
			cursor = *point;
			Ok(())
		};

		for ring in polygons.iter().flatten() {
			if ring.len() < 3 {
				continue;
			}
			writer.write_varint(command(MOVE_TO, 1))?;
			write_point(&mut writer, &ring[0])?;
			writer.write_varint(command(LINE_TO, ring.len() - 1))?;
			for point in &ring[1..] {
				write_point(&mut writer, point)?;
			}
			writer.write_varint(command(CLOSE_PATH, 1))?;
		}

		Ok(VectorTileFeature {
			id,
			tag_ids,
			geom_type: GeomType::Polygon,
			geom_data: writer.into_blob(),
		})
	}

	/// Decodes the command stream back into rings and groups them by winding: every exterior
	/// starts a new polygon and the holes that follow belong to it.
	pub fn to_polygons(&self) -> Result<Vec<TilePolygon>> {
		ensure!(
			self.geom_type == GeomType::Polygon,
			"expected a polygon feature, found {:?}",
			self.geom_type
		);

		let mut reader = ValueReaderSlice::new(self.geom_data.as_slice());
		let mut rings: Vec<TileRing> = Vec::new();
		let mut ring: TileRing = Vec::new();
		let mut cursor = [0i64, 0i64];

		while reader.has_remaining() {
			let value = reader.read_varint().context("reading geometry command")?;
			let (id, count) = (value & 0x7, value >> 3);
			match id {
				MOVE_TO | LINE_TO => {
					for _ in 0..count {
						if id == MOVE_TO && !ring.is_empty() {
							rings.push(std::mem::take(&mut ring));
						}
						cursor[0] += reader.read_svarint()?;
						cursor[1] += reader.read_svarint()?;
						ring.push(cursor);
					}
				}
				CLOSE_PATH => {
					ensure!(!ring.is_empty(), "ClosePath on an empty ring");
					rings.push(std::mem::take(&mut ring));
				}
				other => bail!("unknown geometry command {other}"),
			}
		}
		ensure!(ring.is_empty(), "polygon ring is not closed");

		let mut polygons: Vec<TilePolygon> = Vec::new();
		for ring in rings {
			let area = ring_area_i64(&ring);
			if area > 0 {
				polygons.push(vec![ring]);
			} else if area < 0 {
				match polygons.last_mut() {
					Some(polygon) => polygon.push(ring),
					None => bail!("hole before any exterior ring"),
				}
			} else {
				trace!("skipping ring with zero area");
			}
		}
		Ok(polygons)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn two_polygons() -> Vec<TilePolygon> {
		vec![
			vec![
				vec![[0, 0], [30, 0], [30, 30], [0, 30]],
				vec![[10, 10], [10, 20], [20, 20], [20, 10]],
			],
			vec![vec![[40, 0], [70, 0], [70, 30], [40, 30]]],
		]
	}

	#[test]
	fn command_stream() -> Result<()> {
		let square = vec![vec![vec![[0, 0], [2, 0], [2, 2], [0, 2]]]];
		let feature = VectorTileFeature::from_polygons(Some(1), vec![0, 0], &square)?;
		// MoveTo(1) 0,0  LineTo(3) +2,0 0,+2 -2,0  ClosePath
		assert_eq!(feature.geom_data.as_hex(), "09 00 00 1a 04 00 00 04 03 00 0f");
		Ok(())
	}

	#[test]
	fn polygons_survive_encoding() -> Result<()> {
		let feature = VectorTileFeature::from_polygons(Some(7), vec![0, 1, 2, 3], &two_polygons())?;
		assert_eq!(feature.to_polygons()?, two_polygons());

		let blob = feature.to_blob()?;
		let decoded = VectorTileFeature::read(&mut ValueReaderSlice::new(blob.as_slice()))?;
		assert_eq!(decoded, feature);
		Ok(())
	}

	#[test]
	fn wrong_type_or_truncated_stream() {
		let mut feature = VectorTileFeature::from_polygons(None, vec![], &two_polygons()).unwrap();
		feature.geom_type = GeomType::LineString;
		assert!(feature.to_polygons().is_err());

		let truncated = VectorTileFeature {
			id: None,
			tag_ids: vec![],
			geom_type: GeomType::Polygon,
			geom_data: Blob::from(&[0x09u8, 0x00]),
		};
		assert!(truncated.to_polygons().is_err());
	}
}
