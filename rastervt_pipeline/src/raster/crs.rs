use std::fmt::Display;

/// Coordinate reference system of a raster, as far as tiling cares.
///
/// Web Mercator and WGS84 rasters are tiled on the global Web Mercator grid. Everything else
/// gets a local grid fitted to the raster and keeps its original definition as a label.
#[derive(Clone, Debug, PartialEq)]
pub enum Crs {
	WebMercator,
	Wgs84,
	Other(String),
}

impl Crs {
	/// Parses an authority code (`EPSG:3857`), a short name or a WKT definition.
	#[must_use]
	pub fn parse(text: &str) -> Crs {
		let text = text.trim();
		match text.to_ascii_uppercase().as_str() {
			"EPSG:3857" | "EPSG:900913" | "EPSG:3785" | "WEBMERCATOR" => Crs::WebMercator,
			"EPSG:4326" | "CRS:84" | "OGC:CRS84" | "WGS84" => Crs::Wgs84,
			_ if text.contains('[') => Crs::from_wkt(text),
			_ => Crs::Other(text.to_string()),
		}
	}

	/// Recognizes Web Mercator and WGS84 in OGC or ESRI flavored WKT.
	#[must_use]
	pub fn from_wkt(wkt: &str) -> Crs {
		let upper = wkt.to_ascii_uppercase();
		let projected = upper.starts_with("PROJCS") || upper.starts_with("PROJCRS");
		if projected {
			if ["PSEUDO-MERCATOR", "PSEUDO_MERCATOR", "AUXILIARY_SPHERE", "\"EPSG\",\"3857\"", "EPSG\",3857"]
				.iter()
				.any(|needle| upper.contains(needle))
			{
				return Crs::WebMercator;
			}
		} else if (upper.starts_with("GEOGCS") || upper.starts_with("GEOGCRS"))
			&& ["WGS_1984", "WGS 84", "WGS84"].iter().any(|needle| upper.contains(needle))
		{
			return Crs::Wgs84;
		}
		Crs::Other(wkt.trim().to_string())
	}

	#[must_use]
	pub fn is_geographic(&self) -> bool {
		matches!(self, Crs::Wgs84)
	}

	/// True for the CRSs tiled on the global Web Mercator grid.
	#[must_use]
	pub fn is_global(&self) -> bool {
		matches!(self, Crs::WebMercator | Crs::Wgs84)
	}
}

impl Display for Crs {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Crs::WebMercator => write!(f, "EPSG:3857"),
			Crs::Wgs84 => write!(f, "EPSG:4326"),
			Crs::Other(label) => write!(f, "{label}"),
		}
	}
}
