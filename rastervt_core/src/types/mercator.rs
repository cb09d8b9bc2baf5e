//! Spherical Web Mercator (EPSG:3857) conversions.
//!
//! Only point-wise forward and inverse projection is provided; the Mercator axes are
//! independent, so axis-aligned segments stay axis-aligned after projection.

use super::GeoBBox;
use anyhow::Result;
use std::f64::consts::{FRAC_PI_4, PI};

/// WGS84 semi-major axis in meters.
pub const RADIUS: f64 = 6_378_137.0;

/// Circumference of the projected world, the edge length of the zoom 0 tile.
pub const WORLD_SIZE: f64 = 2.0 * PI * RADIUS;

/// Latitude limit where the projected world becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[must_use]
pub fn x_from_lon(lon: f64) -> f64 {
	RADIUS * lon.clamp(-180.0, 180.0).to_radians()
}

#[must_use]
pub fn y_from_lat(lat: f64) -> f64 {
	let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
	RADIUS * (FRAC_PI_4 + phi / 2.0).tan().ln()
}

#[must_use]
pub fn lon_from_x(x: f64) -> f64 {
	(x / RADIUS).to_degrees()
}

#[must_use]
pub fn lat_from_y(y: f64) -> f64 {
	(2.0 * (y / RADIUS).exp().atan() - PI / 2.0).to_degrees()
}

/// Meters covered by one degree of longitude at the given latitude.
#[must_use]
pub fn meters_per_degree(lat: f64) -> f64 {
	WORLD_SIZE / 360.0 * lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().cos()
}

/// Projects a longitude/latitude box into Mercator meters.
pub fn bbox_to_mercator(bbox: &GeoBBox) -> Result<GeoBBox> {
	GeoBBox::new(
		x_from_lon(bbox.x_min),
		y_from_lat(bbox.y_min),
		x_from_lon(bbox.x_max),
		y_from_lat(bbox.y_max),
	)
}

/// Unprojects a Mercator box into longitude/latitude degrees.
pub fn bbox_from_mercator(bbox: &GeoBBox) -> Result<GeoBBox> {
	GeoBBox::new(
		lon_from_x(bbox.x_min).clamp(-180.0, 180.0),
		lat_from_y(bbox.y_min),
		lon_from_x(bbox.x_max).clamp(-180.0, 180.0),
		lat_from_y(bbox.y_max),
	)
}
