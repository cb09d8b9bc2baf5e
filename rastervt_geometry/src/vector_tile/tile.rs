use super::layer::VectorTileLayer;
use anyhow::{Context, Result};
use log::trace;
use rastervt_core::{
	Blob,
	io::{ValueReader, ValueReaderSlice, ValueWriter, ValueWriterBlob, wire},
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTile {
	pub layers: Vec<VectorTileLayer>,
}

impl VectorTile {
	#[must_use]
	pub fn new(layers: Vec<VectorTileLayer>) -> VectorTile {
		VectorTile { layers }
	}

	pub fn from_blob(blob: &Blob) -> Result<VectorTile> {
		let mut reader = ValueReaderSlice::new(blob.as_slice());
		let mut tile = VectorTile::default();

		while reader.has_remaining() {
			match reader.read_pbf_key()? {
				(3, wire::LEN) => {
					let mut sub = reader.get_pbf_sub_reader()?;
					let layer = VectorTileLayer::read(sub.as_mut()).context("reading vector tile layer")?;
					tile.layers.push(layer);
				}
				(field, wire_type) => {
					trace!("skipping tile field {field}");
					reader.skip_pbf_value(wire_type)?;
				}
			}
		}

		Ok(tile)
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();
		for layer in &self.layers {
			writer.write_pbf_message(3, &layer.to_blob()?)?;
		}
		Ok(writer.into_blob())
	}

	pub fn find_layer(&self, name: &str) -> Option<&VectorTileLayer> {
		self.layers.iter().find(|layer| layer.name == name)
	}
}
