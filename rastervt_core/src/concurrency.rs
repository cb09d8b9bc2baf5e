//! Concurrency limits for the two kinds of work rastervt does:
//! - **CPU-bound**: clipping and encoding tiles, one task per core
//! - **I/O-bound**: reading tiles from a container and writing files, a few tasks per core

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimits {
	/// Maximum parallel tasks for tile clipping and encoding.
	pub cpu_bound: usize,

	/// Maximum parallel tasks for container reads and file writes.
	pub io_bound: usize,
}

impl ConcurrencyLimits {
	/// Creates limits, raising zeros to 1.
	pub fn new(cpu_bound: usize, io_bound: usize) -> Self {
		Self {
			cpu_bound: cpu_bound.max(1),
			io_bound: io_bound.max(1),
		}
	}

	/// Defaults, with the CPU-bound limit replaced by `workers` when given.
	pub fn with_workers(workers: Option<usize>) -> Self {
		let mut limits = Self::default();
		if let Some(workers) = workers {
			limits.cpu_bound = workers.max(1);
		}
		limits
	}

	pub fn cpu_count() -> usize {
		num_cpus::get()
	}
}

impl Default for ConcurrencyLimits {
	fn default() -> Self {
		let cpus = num_cpus::get();
		Self {
			cpu_bound: cpus,
			io_bound: cpus * 3,
		}
	}
}
