//! Key and value tables of a layer, and the tag index pairs features use to reference them.

use super::value::PropertyValue;
use anyhow::{Context, Result, ensure};
use rastervt_core::Blob;
use std::collections::HashMap;

/// Property list of one feature, in tag order.
pub type Properties = Vec<(String, PropertyValue)>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyManager {
	keys: Vec<String>,
	values: Vec<PropertyValue>,
	key_index: HashMap<String, u32>,
	// values are looked up by their encoded form, which also tells 1 from 1.0
	value_index: HashMap<Blob, u32>,
}

impl PropertyManager {
	pub fn add_key(&mut self, key: &str) -> u32 {
		if let Some(index) = self.key_index.get(key) {
			return *index;
		}
		let index = self.keys.len() as u32;
		self.key_index.insert(key.to_string(), index);
		self.keys.push(key.to_string());
		index
	}

	pub fn add_value(&mut self, value: PropertyValue) -> Result<u32> {
		let encoded = value.to_blob()?;
		if let Some(index) = self.value_index.get(&encoded) {
			return Ok(*index);
		}
		let index = self.values.len() as u32;
		self.value_index.insert(encoded, index);
		self.values.push(value);
		Ok(index)
	}

	/// Appends a decoded key, keeping table positions even for repeated entries.
	pub fn push_key(&mut self, key: String) {
		let index = self.keys.len() as u32;
		self.key_index.entry(key.clone()).or_insert(index);
		self.keys.push(key);
	}

	/// Appends a decoded value, keeping table positions even for repeated entries.
	pub fn push_value(&mut self, value: PropertyValue) -> Result<()> {
		let index = self.values.len() as u32;
		self.value_index.entry(value.to_blob()?).or_insert(index);
		self.values.push(value);
		Ok(())
	}

	pub fn keys(&self) -> &[String] {
		&self.keys
	}

	pub fn values(&self) -> &[PropertyValue] {
		&self.values
	}

	/// Registers the properties and returns the flat `[key, value, key, value, ...]` tag list.
	pub fn encode_tag_ids(&mut self, properties: Properties) -> Result<Vec<u32>> {
		let mut tag_ids = Vec::with_capacity(properties.len() * 2);
		for (key, value) in properties {
			tag_ids.push(self.add_key(&key));
			tag_ids.push(self.add_value(value)?);
		}
		Ok(tag_ids)
	}

	pub fn decode_tag_ids(&self, tag_ids: &[u32]) -> Result<Properties> {
		ensure!(tag_ids.len() % 2 == 0, "odd number of tag ids: {}", tag_ids.len());
		tag_ids
			.chunks_exact(2)
			.map(|pair| {
				let key = self
					.keys
					.get(pair[0] as usize)
					.with_context(|| format!("key index {} out of range", pair[0]))?;
				let value = self
					.values
					.get(pair[1] as usize)
					.with_context(|| format!("value index {} out of range", pair[1]))?;
				Ok((key.clone(), value.clone()))
			})
			.collect()
	}
}
