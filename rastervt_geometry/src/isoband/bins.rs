use super::RasterBand;
use anyhow::Result;
use rastervt_core::RasterVtError;

pub fn ensure_interval(interval: f64) -> Result<()> {
	if interval.is_finite() && interval > 0.0 {
		Ok(())
	} else {
		Err(RasterVtError::InvalidInterval(interval).into())
	}
}

#[must_use]
pub fn bin_of(value: f64, interval: f64) -> i64 {
	(value / interval).floor() as i64
}

/// Bin index of every cell, `None` for nodata.
///
/// When the interval covers the whole value range, every valid cell falls into the bin of the
/// smallest value.
pub fn classify(band: &RasterBand, interval: f64) -> Result<Vec<Option<i64>>> {
	ensure_interval(interval)?;

	let (min, max) = band
		.valid_values()
		.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| (min.min(v), max.max(v)));
	if min > max {
		return Ok(vec![None; band.values.len()]);
	}

	let single = (interval >= max - min).then(|| bin_of(min, interval));
	Ok(band
		.values
		.iter()
		.map(|&v| {
			band
				.is_valid(v)
				.then(|| single.unwrap_or_else(|| bin_of(v, interval)))
		})
		.collect())
}
