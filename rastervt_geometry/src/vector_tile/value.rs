use anyhow::{Context, Result, bail};
use rastervt_core::{
	Blob,
	io::{ValueReader, ValueWriter, ValueWriterBlob, wire},
};
use std::fmt::Display;

/// A typed entry of a layer's value table.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
	String(String),
	Float(f32),
	Double(f64),
	Int(i64),
	UInt(u64),
	Bool(bool),
}

impl PropertyValue {
	/// Integral numbers become `Int`, everything else `Double`.
	#[must_use]
	pub fn from_number(value: f64) -> PropertyValue {
		if value.fract() == 0.0 && value.abs() < 9.0e15 {
			PropertyValue::Int(value as i64)
		} else {
			PropertyValue::Double(value)
		}
	}

	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			PropertyValue::Float(v) => Some(f64::from(*v)),
			PropertyValue::Double(v) => Some(*v),
			PropertyValue::Int(v) => Some(*v as f64),
			PropertyValue::UInt(v) => Some(*v as f64),
			PropertyValue::String(_) | PropertyValue::Bool(_) => None,
		}
	}

	pub fn read(reader: &mut dyn ValueReader<'_>) -> Result<PropertyValue> {
		let mut value = None;
		while reader.has_remaining() {
			value = Some(match reader.read_pbf_key()? {
				(1, wire::LEN) => PropertyValue::String(reader.read_pbf_string().context("reading string value")?),
				(2, wire::FIXED32) => PropertyValue::Float(reader.read_f32()?),
				(3, wire::FIXED64) => PropertyValue::Double(reader.read_f64()?),
				(4, wire::VARINT) => PropertyValue::Int(reader.read_varint()? as i64),
				(5, wire::VARINT) => PropertyValue::UInt(reader.read_varint()?),
				(6, wire::VARINT) => PropertyValue::Int(reader.read_svarint()?),
				(7, wire::VARINT) => PropertyValue::Bool(reader.read_varint()? != 0),
				(field, wire_type) => bail!("unexpected value field {field} with wire type {wire_type}"),
			});
		}
		value.context("empty property value")
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();
		match self {
			PropertyValue::String(s) => {
				writer.write_pbf_key(1, wire::LEN)?;
				writer.write_pbf_string(s)?;
			}
			PropertyValue::Float(v) => {
				writer.write_pbf_key(2, wire::FIXED32)?;
				writer.write_f32(*v)?;
			}
			PropertyValue::Double(v) => {
				writer.write_pbf_key(3, wire::FIXED64)?;
				writer.write_f64(*v)?;
			}
			PropertyValue::UInt(v) => {
				writer.write_pbf_key(5, wire::VARINT)?;
				writer.write_varint(*v)?;
			}
			PropertyValue::Int(v) => {
				writer.write_pbf_key(6, wire::VARINT)?;
				writer.write_svarint(*v)?;
			}
			PropertyValue::Bool(v) => {
				writer.write_pbf_key(7, wire::VARINT)?;
				writer.write_varint(u64::from(*v))?;
			}
		}
		Ok(writer.into_blob())
	}
}

impl Display for PropertyValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PropertyValue::String(v) => write!(f, "{v:?}"),
			PropertyValue::Float(v) => write!(f, "{v}"),
			PropertyValue::Double(v) => write!(f, "{v}"),
			PropertyValue::Int(v) => write!(f, "{v}"),
			PropertyValue::UInt(v) => write!(f, "{v}"),
			PropertyValue::Bool(v) => write!(f, "{v}"),
		}
	}
}
