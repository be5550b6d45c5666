//! Interval trace
//!
//! A trace is a sequence of snapshots of cumulative counters, one per sampled interval.
//! Snapshot 0 is the baseline, every other snapshot closes an interval that started at
//! the previous one.
//!
//! Raw snapshots are keyed by component and counter name. When building a [`Trace`], every
//! counter the metrics need is looked up once and stored in typed snapshots, so a
//! mismatched config / trace pair is reported before anything is computed.

// Imports
use {
	crate::{config::Config, Error},
	itertools::Itertools,
	std::collections::{BTreeMap, BTreeSet},
};

/// Raw snapshot, as stored
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct RawSnapshot {
	/// Phase index
	pub phase: u64,

	/// Operation mode
	#[serde(rename = "maxineVMOperationMode")]
	pub op_mode: i64,

	/// Counters, by component and then counter name
	#[serde(flatten)]
	pub components: BTreeMap<String, BTreeMap<String, RawCounter>>,
}

/// Raw counter value
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
#[serde(untagged)]
pub enum RawCounter {
	/// Component with a single instance
	Scalar(u64),

	/// Value for each instance of the component
	Array(Vec<u64>),
}

impl RawCounter {
	/// Returns the per-instance values
	pub fn into_values(self) -> Vec<u64> {
		match self {
			Self::Scalar(value) => vec![value],
			Self::Array(values) => values,
		}
	}
}

/// Core counter
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CoreCounter {
	Instrs,
	Cycles,
	MispredBranches,
	PredBranches,
	BranchUops,
	FpAddSubUops,
	FpMulDivUops,
	Uops,
}

impl CoreCounter {
	/// All core counters
	pub const ALL: [Self; 8] = [
		Self::Instrs,
		Self::Cycles,
		Self::MispredBranches,
		Self::PredBranches,
		Self::BranchUops,
		Self::FpAddSubUops,
		Self::FpMulDivUops,
		Self::Uops,
	];

	/// Returns whether every core kind reports this counter.
	///
	/// Only out-of-order cores report branch and micro-op counters.
	pub fn is_required(self) -> bool {
		matches!(self, Self::Instrs | Self::Cycles)
	}

	/// Returns this counter's name in the trace
	pub fn name(self) -> &'static str {
		match self {
			Self::Instrs => "instrs",
			Self::Cycles => "cycles",
			Self::MispredBranches => "mispredBranches",
			Self::PredBranches => "predBranches",
			Self::BranchUops => "branchUops",
			Self::FpAddSubUops => "fpAddSubUops",
			Self::FpMulDivUops => "fpMulDivUops",
			Self::Uops => "uops",
		}
	}
}

/// Cache counter
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CacheCounter {
	/// Load hits in the filter cache (first level only)
	FilterLoadHits,

	/// Load hits
	LoadHits,

	/// Load misses
	LoadMisses,

	/// Store hits in the filter cache (first level only)
	FilterStoreHits,

	/// Store hits
	StoreHits,

	/// Store misses from invalid to modified
	StoreMissesInvalid,

	/// Store misses from shared to modified
	StoreMissesShared,
}

impl CacheCounter {
	/// All cache counters
	pub const ALL: [Self; 7] = [
		Self::FilterLoadHits,
		Self::LoadHits,
		Self::LoadMisses,
		Self::FilterStoreHits,
		Self::StoreHits,
		Self::StoreMissesInvalid,
		Self::StoreMissesShared,
	];

	/// Returns this counter's name in the trace
	pub fn name(self) -> &'static str {
		match self {
			Self::FilterLoadHits => "fhGETS",
			Self::LoadHits => "hGETS",
			Self::LoadMisses => "mGETS",
			Self::FilterStoreHits => "fhGETX",
			Self::StoreHits => "hGETX",
			Self::StoreMissesInvalid => "mGETXIM",
			Self::StoreMissesShared => "mGETXSM",
		}
	}

	/// Returns whether this counter only exists on first level caches
	pub fn is_filter(self) -> bool {
		matches!(self, Self::FilterLoadHits | Self::FilterStoreHits)
	}
}

/// Snapshot
#[derive(Clone, Debug)]
pub struct Snapshot {
	/// Phase index
	phase: u64,

	/// Operation mode
	op_mode: i64,

	/// Core counters, indexed by [`CoreCounter`]
	core: Vec<Option<Vec<u64>>>,

	/// Cache counters, indexed by the config's cache order and then [`CacheCounter`]
	caches: Vec<Vec<Vec<u64>>>,
}

impl Snapshot {
	/// Builds a snapshot from a raw snapshot
	pub fn from_raw(config: &Config, mut raw: RawSnapshot, index: usize) -> Result<Self, Error> {
		let missing = |component: &str, counter: &str| Error::MissingCounter {
			component: component.to_owned(),
			counter: counter.to_owned(),
			index,
		};
		let mut take_counter =
			|component: &str, counter: &'static str, expected_len: usize| -> Result<Option<Vec<u64>>, Error> {
				let Some(raw_counter) = raw
					.components
					.get_mut(component)
					.and_then(|counters| counters.remove(counter))
				else {
					return Ok(None);
				};

				let values = raw_counter.into_values();
				match values.len() == expected_len {
					true => Ok(Some(values)),
					false => Err(Error::ShapeMismatch {
						what:     format!("Counter `{component}.{counter}` of snapshot {index}"),
						expected: expected_len,
						found:    values.len(),
					}),
				}
			};

		let core_group = config.core_group();
		let core = CoreCounter::ALL
			.iter()
			.map(|&counter| {
				let values = take_counter(&core_group.name, counter.name(), core_group.cores)?;
				match (values, counter.is_required()) {
					(None, true) => Err(missing(&core_group.name, counter.name())),
					(values, _) => Ok(values),
				}
			})
			.collect::<Result<Vec<_>, _>>()?;

		let mut caches = Vec::with_capacity(config.caches().len());
		for cache in config.caches() {
			let id = cache.id();
			let counters = CacheCounter::ALL
				.iter()
				.map(|counter| match counter.is_filter() && !id.is_first_level() {
					// Note: Only first level caches have a filter cache in front of them,
					//       so deeper levels simply never have filter hits.
					true => Ok(vec![0; cache.instances()]),
					false => take_counter(id.name(), counter.name(), cache.instances())?
						.ok_or_else(|| missing(id.name(), counter.name())),
				})
				.collect::<Result<Vec<_>, _>>()?;
			caches.push(counters);
		}

		Ok(Self {
			phase: raw.phase,
			op_mode: raw.op_mode,
			core,
			caches,
		})
	}

	/// Returns the phase index
	pub fn phase(&self) -> u64 {
		self.phase
	}

	/// Returns the operation mode
	pub fn op_mode(&self) -> i64 {
		self.op_mode
	}

	/// Returns a core counter, if the cores report it
	pub fn core(&self, counter: CoreCounter) -> Option<&[u64]> {
		self.core[counter as usize].as_deref()
	}

	/// Returns a cache counter.
	///
	/// # Panics
	/// Panics if `cache_idx` isn't an index into the config's caches.
	pub fn cache(&self, cache_idx: usize, counter: CacheCounter) -> &[u64] {
		&self.caches[cache_idx][counter as usize]
	}
}

/// Interval trace
#[derive(Clone, Debug)]
pub struct Trace {
	/// All snapshots, the first being the baseline
	snapshots: Vec<Snapshot>,
}

impl Trace {
	/// Builds a trace from raw snapshots, validating them against `config`
	pub fn from_raw(config: &Config, raw_snapshots: impl IntoIterator<Item = RawSnapshot>) -> Result<Self, Error> {
		let snapshots = raw_snapshots
			.into_iter()
			.enumerate()
			.map(|(index, raw)| Snapshot::from_raw(config, raw, index))
			.collect::<Result<Vec<_>, _>>()?;
		if snapshots.is_empty() {
			return Err(Error::EmptyTrace);
		}

		// Optional counters must be reported by every snapshot or by none
		let core_group = &config.core_group().name;
		for &counter in &CoreCounter::ALL {
			let reported = snapshots[0].core(counter).is_some();
			if let Some(index) = snapshots.iter().position(|snapshot| snapshot.core(counter).is_some() != reported) {
				return Err(Error::MissingCounter {
					component: core_group.clone(),
					counter: counter.name().to_owned(),
					index: match reported {
						true => index,
						false => 0,
					},
				});
			}
			if !reported {
				tracing::debug!(%core_group, counter = counter.name(), "Cores don't report counter");
			}
		}

		for (index, (prev, cur)) in snapshots.iter().tuple_windows().enumerate() {
			if cur.phase < prev.phase {
				tracing::warn!(index = index + 1, prev = prev.phase, cur = cur.phase, "Phase index decreased");
			}
		}

		tracing::debug!(snapshots = snapshots.len(), "Loaded trace");
		Ok(Self { snapshots })
	}

	/// Returns the number of snapshots, including the baseline
	pub fn len(&self) -> usize {
		self.snapshots.len()
	}

	/// Returns whether this trace has no snapshots.
	///
	/// Never true for a trace built with [`Trace::from_raw`].
	pub fn is_empty(&self) -> bool {
		self.snapshots.is_empty()
	}

	/// Returns the number of sampled intervals
	pub fn intervals(&self) -> usize {
		self.snapshots.len().saturating_sub(1)
	}

	/// Returns whether the cores report `counter`
	pub fn has_core_counter(&self, counter: CoreCounter) -> bool {
		self.snapshots.first().is_some_and(|snapshot| snapshot.core(counter).is_some())
	}

	/// Returns the snapshot at `index`
	///
	/// # Panics
	/// Panics if `index` is out of bounds.
	pub fn snapshot(&self, index: usize) -> &Snapshot {
		&self.snapshots[index]
	}

	/// Returns all operation modes of the intervals in this trace
	pub fn op_modes(&self) -> BTreeSet<i64> {
		self.snapshots.iter().skip(1).map(Snapshot::op_mode).collect()
	}
}

#[cfg(test)]
mod tests {
	use {super::*, pretty_assertions::assert_eq};

	#[test]
	fn raw_snapshot_from_json() {
		let raw = serde_json::from_value::<RawSnapshot>(serde_json::json!({
			"phase": 3,
			"maxineVMOperationMode": 2,
			"westmere": { "instrs": [10, 20], "cycles": [5, 6] },
			"l2": { "hGETS": 7 },
		}))
		.expect("Snapshot should be valid");

		assert_eq!(raw.phase, 3);
		assert_eq!(raw.op_mode, 2);
		assert_eq!(
			raw.components["westmere"]["instrs"].clone().into_values(),
			vec![10, 20]
		);
		assert_eq!(raw.components["l2"]["hGETS"].clone().into_values(), vec![7]);
	}
}
