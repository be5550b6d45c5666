//! Metrics
//!
//! Every metric function returns the delta of a single interval, that is, the
//! value at snapshot `index` minus the value at snapshot `index - 1`.
//! Summing them over the accepted intervals is left to [`aggregate`](crate::aggregate).
//!
//! All functions panic if `index` is 0 or out of bounds for the trace.

// Imports
use {
	crate::{
		config::Config,
		trace::{CacheCounter, CoreCounter, Snapshot, Trace},
		value::{Shape, Value},
		Error,
	},
	itertools::Itertools,
};

/// Cache whose accesses are the load / store micro-ops
pub const UOP_CACHE: &str = "l1d";

/// Metric
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Metric {
	/// Instructions
	Instructions,

	/// Cycles the cores were busy
	Cycles,

	/// Mispredicted branches
	MispredictedBranches,

	/// Correctly predicted branches
	CorrectBranches,

	/// Micro-ops
	Uops(UopKind),

	/// Cache statistic
	Cache(String, CacheStat),

	/// Elapsed time
	ElapsedTime,

	/// Idle time, per core
	IdleElapsedTime,
}

impl Metric {
	/// Returns the shape of this metric's values.
	///
	/// Fails if the metric needs a core counter `trace` doesn't have.
	pub fn shape(&self, config: &Config, trace: &Trace) -> Result<Shape, Error> {
		if let Some(counter) = self.core_counter().filter(|&counter| !trace.has_core_counter(counter)) {
			return Err(Error::MissingCounter {
				component: config.core_group().name.clone(),
				counter:   counter.name().to_owned(),
				index:     0,
			});
		}

		let shape = match self {
			Self::Instructions |
			Self::Cycles |
			Self::MispredictedBranches |
			Self::CorrectBranches |
			Self::IdleElapsedTime |
			Self::Uops(UopKind::Branch | UopKind::FpAddSub | UopKind::FpMulDiv | UopKind::Total) => Shape::Array(config.cores()),
			Self::Uops(UopKind::Load | UopKind::Store) => Shape::Array(config.cache(UOP_CACHE)?.instances()),
			Self::Cache(cache, _) => Shape::Array(config.cache(cache)?.instances()),
			Self::ElapsedTime => Shape::Scalar,
		};

		Ok(shape)
	}

	/// Returns the core counter this metric is the delta of, if any
	pub fn core_counter(&self) -> Option<CoreCounter> {
		match self {
			Self::Instructions => Some(CoreCounter::Instrs),
			Self::Cycles | Self::IdleElapsedTime => Some(CoreCounter::Cycles),
			Self::MispredictedBranches => Some(CoreCounter::MispredBranches),
			Self::CorrectBranches => Some(CoreCounter::PredBranches),
			Self::Uops(UopKind::Branch) => Some(CoreCounter::BranchUops),
			Self::Uops(UopKind::FpAddSub) => Some(CoreCounter::FpAddSubUops),
			Self::Uops(UopKind::FpMulDiv) => Some(CoreCounter::FpMulDivUops),
			Self::Uops(UopKind::Total) => Some(CoreCounter::Uops),
			Self::Uops(UopKind::Load | UopKind::Store) | Self::Cache(..) | Self::ElapsedTime => None,
		}
	}

	/// Returns this metric's delta for the interval ending at `index`
	pub fn delta(&self, config: &Config, trace: &Trace, index: usize) -> Result<Value, Error> {
		match self {
			Self::Instructions => self::instructions(config, trace, index),
			Self::Cycles => self::cycles(config, trace, index),
			Self::MispredictedBranches => self::mispredicted_branches(config, trace, index),
			Self::CorrectBranches => self::correct_branches(config, trace, index),
			Self::Uops(kind) => self::uops(config, trace, index, *kind),
			Self::Cache(cache, stat) => stat.delta(config, trace, index, cache),
			Self::ElapsedTime => self::elapsed_time(config, trace, index),
			Self::IdleElapsedTime => self::idle_elapsed_time(config, trace, index),
		}
	}
}

/// Micro-op kind
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum UopKind {
	Branch,
	FpAddSub,
	FpMulDiv,
	Load,
	Store,
	Total,
}

/// Cache statistic
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CacheStat {
	LoadHits,
	LoadMisses,
	Loads,
	StoreHits,
	StoreMisses,
	Stores,
}

impl CacheStat {
	/// Returns this statistic's delta on `cache` for the interval ending at `index`
	pub fn delta(self, config: &Config, trace: &Trace, index: usize, cache: &str) -> Result<Value, Error> {
		match self {
			Self::LoadHits => self::cache_load_hits(config, trace, index, cache),
			Self::LoadMisses => self::cache_load_misses(config, trace, index, cache),
			Self::Loads => self::cache_loads(config, trace, index, cache),
			Self::StoreHits => self::cache_store_hits(config, trace, index, cache),
			Self::StoreMisses => self::cache_store_misses(config, trace, index, cache),
			Self::Stores => self::cache_stores(config, trace, index, cache),
		}
	}
}

/// Instructions
pub fn instructions(config: &Config, trace: &Trace, index: usize) -> Result<Value, Error> {
	self::core_delta(config, trace, index, CoreCounter::Instrs)
}

/// Busy cycles
pub fn cycles(config: &Config, trace: &Trace, index: usize) -> Result<Value, Error> {
	self::core_delta(config, trace, index, CoreCounter::Cycles)
}

/// Mispredicted branches
pub fn mispredicted_branches(config: &Config, trace: &Trace, index: usize) -> Result<Value, Error> {
	self::core_delta(config, trace, index, CoreCounter::MispredBranches)
}

/// Correctly predicted branches
pub fn correct_branches(config: &Config, trace: &Trace, index: usize) -> Result<Value, Error> {
	self::core_delta(config, trace, index, CoreCounter::PredBranches)
}

/// Micro-ops of `kind`.
///
/// Loads and stores are the accesses of the first level data cache.
pub fn uops(config: &Config, trace: &Trace, index: usize, kind: UopKind) -> Result<Value, Error> {
	match kind {
		UopKind::Branch => self::core_delta(config, trace, index, CoreCounter::BranchUops),
		UopKind::FpAddSub => self::core_delta(config, trace, index, CoreCounter::FpAddSubUops),
		UopKind::FpMulDiv => self::core_delta(config, trace, index, CoreCounter::FpMulDivUops),
		UopKind::Load => self::cache_loads(config, trace, index, UOP_CACHE),
		UopKind::Store => self::cache_stores(config, trace, index, UOP_CACHE),
		UopKind::Total => self::core_delta(config, trace, index, CoreCounter::Uops),
	}
}

/// Load hits, including filter hits on first level caches
pub fn cache_load_hits(config: &Config, trace: &Trace, index: usize, cache: &str) -> Result<Value, Error> {
	let counters: &[CacheCounter] = match config.cache(cache)?.id().is_first_level() {
		true => &[CacheCounter::FilterLoadHits, CacheCounter::LoadHits],
		false => &[CacheCounter::LoadHits],
	};

	self::cache_delta(config, trace, index, cache, counters)
}

/// Load misses
pub fn cache_load_misses(config: &Config, trace: &Trace, index: usize, cache: &str) -> Result<Value, Error> {
	self::cache_delta(config, trace, index, cache, &[CacheCounter::LoadMisses])
}

/// Loads, both hits and misses
pub fn cache_loads(config: &Config, trace: &Trace, index: usize, cache: &str) -> Result<Value, Error> {
	self::cache_load_hits(config, trace, index, cache)?
		.with_added(&self::cache_load_misses(config, trace, index, cache)?)
}

/// Store hits, including filter hits on first level caches
pub fn cache_store_hits(config: &Config, trace: &Trace, index: usize, cache: &str) -> Result<Value, Error> {
	let counters: &[CacheCounter] = match config.cache(cache)?.id().is_first_level() {
		true => &[CacheCounter::FilterStoreHits, CacheCounter::StoreHits],
		false => &[CacheCounter::StoreHits],
	};

	self::cache_delta(config, trace, index, cache, counters)
}

/// Store misses.
///
/// A store miss either finds the line invalid or shared, and both count.
pub fn cache_store_misses(config: &Config, trace: &Trace, index: usize, cache: &str) -> Result<Value, Error> {
	self::cache_delta(config, trace, index, cache, &[
		CacheCounter::StoreMissesInvalid,
		CacheCounter::StoreMissesShared,
	])
}

/// Stores, both hits and misses
pub fn cache_stores(config: &Config, trace: &Trace, index: usize, cache: &str) -> Result<Value, Error> {
	self::cache_store_hits(config, trace, index, cache)?
		.with_added(&self::cache_store_misses(config, trace, index, cache)?)
}

/// Elapsed time.
///
/// Driven by the number of phases the interval spanned, not by the cores' cycles.
pub fn elapsed_time(config: &Config, trace: &Trace, index: usize) -> Result<Value, Error> {
	let cycles = self::interval_cycles(config, trace, index)?;
	let time = self::cycles_to_time(config, cycles as f64)?;

	Ok(Value::Scalar(time))
}

/// Idle time, per core.
///
/// Each core was idle for the cycles of the interval it didn't spend busy.
pub fn idle_elapsed_time(config: &Config, trace: &Trace, index: usize) -> Result<Value, Error> {
	let total_cycles = self::interval_cycles(config, trace, index)? as i64;
	self::cycles(config, trace, index)?
		.into_vec()
		.into_iter()
		.map(|busy_cycles| self::cycles_to_time(config, (total_cycles - busy_cycles) as f64))
		.collect::<Result<Vec<_>, _>>()
		.map(Value::Array)
}

/// Returns the number of cycles spanned by the interval ending at `index`
fn interval_cycles(config: &Config, trace: &Trace, index: usize) -> Result<u64, Error> {
	let (prev, cur) = self::snapshots(trace, index);
	let phases = cur
		.phase()
		.checked_sub(prev.phase())
		.ok_or_else(|| Error::CounterDecreased {
			component: "trace".to_owned(),
			counter: "phase".to_owned(),
			index,
		})?;

	Ok(config.phase_length() * (phases + 1))
}

/// Converts cycles to time, truncating
fn cycles_to_time(config: &Config, cycles: f64) -> Result<i64, Error> {
	let frequency_to_cycles = config.frequency_to_cycles();
	if frequency_to_cycles == 0.0 {
		return Err(Error::DivideByZero {
			what:    "elapsed time",
			divisor: "frequency",
		});
	}

	Ok((cycles / frequency_to_cycles) as i64)
}

/// Returns the snapshots delimiting the interval ending at `index`
fn snapshots(trace: &Trace, index: usize) -> (&Snapshot, &Snapshot) {
	assert!(index >= 1, "Interval index must be at least 1, the baseline isn't an interval");
	(trace.snapshot(index - 1), trace.snapshot(index))
}

/// Returns the delta of a core counter
fn core_delta(config: &Config, trace: &Trace, index: usize, counter: CoreCounter) -> Result<Value, Error> {
	let (prev, cur) = self::snapshots(trace, index);
	let component = &config.core_group().name;
	let (Some(prev), Some(cur)) = (prev.core(counter), cur.core(counter)) else {
		return Err(Error::MissingCounter {
			component: component.clone(),
			counter: counter.name().to_owned(),
			index,
		});
	};

	self::delta(prev, cur, component, counter.name(), index)
}

/// Returns the delta of the sum of several counters of a cache
fn cache_delta(
	config: &Config,
	trace: &Trace,
	index: usize,
	cache: &str,
	counters: &[CacheCounter],
) -> Result<Value, Error> {
	let cache_idx = config.cache_idx(cache)?;
	let instances = config.caches()[cache_idx].instances();
	let counters_sum = |snapshot: &Snapshot| {
		counters.iter().fold(vec![0_u64; instances], |mut sum, &counter| {
			for (sum, &value) in sum.iter_mut().zip_eq(snapshot.cache(cache_idx, counter)) {
				*sum = sum.saturating_add(value);
			}
			sum
		})
	};

	let (prev, cur) = self::snapshots(trace, index);
	let counter = counters.iter().map(|counter| counter.name()).join("+");
	self::delta(&counters_sum(prev), &counters_sum(cur), cache, &counter, index)
}

/// Returns the element-wise delta between two cumulative counters
fn delta(prev: &[u64], cur: &[u64], component: &str, counter: &str, index: usize) -> Result<Value, Error> {
	prev.iter()
		.zip_eq(cur)
		.map(|(&prev, &cur)| {
			let delta = cur.checked_sub(prev).ok_or_else(|| Error::CounterDecreased {
				component: component.to_owned(),
				counter: counter.to_owned(),
				index,
			})?;
			i64::try_from(delta).map_err(|_| Error::CounterOverflow {
				component: component.to_owned(),
				counter: counter.to_owned(),
				index,
			})
		})
		.collect::<Result<Vec<_>, _>>()
		.map(Value::Array)
}
