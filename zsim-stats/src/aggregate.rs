//! Delta-sum aggregation

// Imports
use {
	crate::{
		config::Config,
		metrics::Metric,
		modes::OpModes,
		trace::Trace,
		value::{Shape, Value},
		Error,
	},
	std::fmt,
};

/// Sums `metric` over every interval of `trace` whose operation mode is in `op_modes`.
///
/// Intervals are summed in trace order, starting at the interval ending at snapshot 1.
/// If no interval is accepted, returns the metric's zero value.
pub fn aggregate(config: &Config, trace: &Trace, metric: &Metric, op_modes: &OpModes) -> Result<Value, Error> {
	let shape = metric.shape(config, trace)?;
	let total = self::aggregate_with(trace, op_modes, shape, |index| metric.delta(config, trace, index))?;
	tracing::trace!(?metric, %op_modes, %total, "Aggregated metric");

	Ok(total)
}

/// Sums the deltas returned by `delta` over every interval of `trace` whose operation mode is in `op_modes`.
///
/// `delta` is called with the index of the snapshot closing each accepted interval, and
/// must return values of shape `shape`.
pub fn aggregate_with(
	trace: &Trace,
	op_modes: &OpModes,
	shape: Shape,
	mut delta: impl FnMut(usize) -> Result<Value, Error>,
) -> Result<Value, Error> {
	let mut total = Value::zero(shape);
	for index in 1..trace.len() {
		if !op_modes.contains(trace.snapshot(index).op_mode()) {
			continue;
		}

		let delta = delta(index)?;
		total.add_assign(&delta)?;
	}

	Ok(total)
}

/// Aggregator.
///
/// Bundles everything needed to aggregate metrics of a single conversion.
#[derive(Clone, Copy)]
pub struct Aggregator<'a> {
	/// Config
	pub config: &'a Config,

	/// Trace
	pub trace: &'a Trace,

	/// Accepted operation modes
	pub op_modes: &'a OpModes,
}

impl<'a> Aggregator<'a> {
	/// Creates a new aggregator
	pub fn new(config: &'a Config, trace: &'a Trace, op_modes: &'a OpModes) -> Self {
		Self {
			config,
			trace,
			op_modes,
		}
	}

	/// Sums `metric` over all accepted intervals
	pub fn sum(&self, metric: &Metric) -> Result<Value, Error> {
		self::aggregate(self.config, self.trace, metric, self.op_modes)
	}

	/// Sums `metric` over all accepted intervals and all of its elements
	pub fn total(&self, metric: &Metric) -> Result<i64, Error> {
		self.sum(metric).map(|value| value.total())
	}
}

impl fmt::Debug for Aggregator<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Aggregator")
			.field("intervals", &self.trace.intervals())
			.field("op_modes", &self.op_modes)
			.finish_non_exhaustive()
	}
}
