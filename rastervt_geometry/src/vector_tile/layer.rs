use super::{
	feature::{TilePolygon, VectorTileFeature},
	property_manager::{Properties, PropertyManager},
	value::PropertyValue,
};
use anyhow::{Context, Result};
use log::trace;
use rastervt_core::{
	Blob,
	io::{ValueReader, ValueWriter, ValueWriterBlob, wire},
};

const DEFAULT_EXTENT: u32 = 4096;
const DEFAULT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq)]
pub struct VectorTileLayer {
	pub name: String,
	pub extent: u32,
	pub version: u32,
	pub features: Vec<VectorTileFeature>,
	pub property_manager: PropertyManager,
}

impl VectorTileLayer {
	/// An empty version 2 layer.
	#[must_use]
	pub fn new(name: &str, extent: u32) -> VectorTileLayer {
		VectorTileLayer {
			name: name.to_string(),
			extent,
			version: 2,
			features: Vec::new(),
			property_manager: PropertyManager::default(),
		}
	}

	pub fn read(reader: &mut dyn ValueReader<'_>) -> Result<VectorTileLayer> {
		let mut name = None;
		let mut extent = DEFAULT_EXTENT;
		let mut version = DEFAULT_VERSION;
		let mut features = Vec::new();
		let mut property_manager = PropertyManager::default();

		while reader.has_remaining() {
			match reader.read_pbf_key()? {
				(1, wire::LEN) => name = Some(reader.read_pbf_string().context("reading layer name")?),
				(2, wire::LEN) => {
					let mut sub = reader.get_pbf_sub_reader()?;
					features.push(VectorTileFeature::read(sub.as_mut()).context("reading feature")?);
				}
				(3, wire::LEN) => property_manager.push_key(reader.read_pbf_string().context("reading key")?),
				(4, wire::LEN) => {
					let mut sub = reader.get_pbf_sub_reader()?;
					property_manager.push_value(PropertyValue::read(sub.as_mut()).context("reading value")?)?;
				}
				(5, wire::VARINT) => extent = u32::try_from(reader.read_varint()?)?,
				(15, wire::VARINT) => version = u32::try_from(reader.read_varint()?)?,
				(field, wire_type) => {
					trace!("skipping layer field {field}");
					reader.skip_pbf_value(wire_type)?;
				}
			}
		}

		Ok(VectorTileLayer {
			name: name.context("layer without a name")?,
			extent,
			version,
			features,
			property_manager,
		})
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		writer.write_pbf_key(1, wire::LEN)?;
		writer.write_pbf_string(&self.name)?;

		for feature in &self.features {
			writer.write_pbf_message(2, &feature.to_blob()?)?;
		}

		for key in self.property_manager.keys() {
			writer.write_pbf_key(3, wire::LEN)?;
			writer.write_pbf_string(key)?;
		}

		for value in self.property_manager.values() {
			writer.write_pbf_message(4, &value.to_blob()?)?;
		}

		if self.extent != DEFAULT_EXTENT {
			writer.write_pbf_key(5, wire::VARINT)?;
			writer.write_varint(u64::from(self.extent))?;
		}

		if self.version != DEFAULT_VERSION {
			writer.write_pbf_key(15, wire::VARINT)?;
			writer.write_varint(u64::from(self.version))?;
		}

		Ok(writer.into_blob())
	}

	/// Appends a polygon feature with the given properties.
	pub fn add_polygon_feature(&mut self, id: u64, polygons: &[TilePolygon], properties: Properties) -> Result<()> {
		let tag_ids = self.property_manager.encode_tag_ids(properties)?;
		let feature = VectorTileFeature::from_polygons(Some(id), tag_ids, polygons)?;
		self.features.push(feature);
		Ok(())
	}

	pub fn feature_properties(&self, feature: &VectorTileFeature) -> Result<Properties> {
		self.property_manager.decode_tag_ids(&feature.tag_ids)
	}
}
