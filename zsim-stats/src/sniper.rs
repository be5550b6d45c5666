//! Sniper results
//!
//! Converts a trace into the `config` / `results` mapping read by Sniper's tooling.

// Imports
use {
	crate::{
		aggregate::Aggregator,
		config::{Cache, ClockDomain, CoreKind},
		derived::UopTotals,
		metrics::{CacheStat, Metric, UopKind},
		value::Value,
		Error,
	},
	std::collections::BTreeMap,
};

/// Caches converted, as `(cache, sniper results prefix, sniper config section)`
pub const SNIPER_CACHES: [(&str, &str, &str); 4] = [
	("l1d", "L1-D", "l1_dcache"),
	("l1i", "L1-I", "l1_icache"),
	("l2", "L2", "l2_cache"),
	("l3", "L3", "l3_cache"),
];

/// Performance model parameters that zsim doesn't report
const FIXED_CONFIG: [(&str, &str); 9] = [
	("perf_model/branch_predictor/mispredict_penalty", "17"),
	("perf_model/nuca/enabled", "false"),
	("perf_model/core/interval_timer/dispatch_width", "4"),
	("perf_model/core/interval_timer/window_size", "128"),
	("perf_model/dram/num_controllers", "1"),
	("perf_model/dram/dimms_per_controller", "3"),
	("perf_model/dram/chips_per_dimm", "8"),
	("power/technology_node", "45"),
	("power/vdd", "1.2"),
];

/// Sniper results
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize)]
pub struct SniperResults {
	/// Configuration, by sniper config key
	pub config: BTreeMap<String, Entry>,

	/// Results, by sniper statistic name
	pub results: BTreeMap<String, Entry>,
}

/// Sniper results entry
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize)]
#[serde(untagged)]
pub enum Entry {
	Int(i64),
	Text(String),
	Ints(Vec<i64>),
	Floats(Vec<f64>),
}

impl From<&str> for Entry {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<String> for Entry {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<i64> for Entry {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<Vec<i64>> for Entry {
	fn from(values: Vec<i64>) -> Self {
		Self::Ints(values)
	}
}

/// Converts the trace behind `aggregator` into sniper results
pub fn convert(aggregator: &Aggregator) -> Result<SniperResults, Error> {
	let config = self::convert_config(aggregator)?;
	let results = self::convert_results(aggregator)?;
	tracing::info!(
		config_entries = config.len(),
		results_entries = results.len(),
		"Converted to sniper results"
	);

	Ok(SniperResults { config, results })
}

/// Builds the `config` section
fn convert_config(aggregator: &Aggregator) -> Result<BTreeMap<String, Entry>, Error> {
	let config = aggregator.config;
	let mut entries = FIXED_CONFIG
		.into_iter()
		.map(|(key, value)| (key.to_owned(), Entry::from(value)))
		.collect::<BTreeMap<_, _>>();
	let mut insert = |key: String, entry: Entry| {
		entries.insert(key, entry);
	};

	insert("general/total_cores".to_owned(), config.cores().to_string().into());
	insert(
		"perf_model/cache/levels".to_owned(),
		Entry::Int(config.cache_levels().into()),
	);
	insert(
		"perf_model/core/frequency".to_owned(),
		format!("{:?}", config.frequency() as f64 / 1000.0).into(),
	);

	let core_kind = &config.core_group().kind;
	let core_type = match core_kind {
		CoreKind::OutOfOrder => "rob",
		CoreKind::Simple | CoreKind::Other(_) => "interval",
	};
	let in_order = match core_kind {
		CoreKind::Simple => "1",
		CoreKind::OutOfOrder | CoreKind::Other(_) => "0",
	};
	insert("perf_model/core/type".to_owned(), core_type.into());
	insert("perf_model/core/rob_timer/in_order".to_owned(), in_order.into());

	for (cache_name, _, section) in SNIPER_CACHES {
		let cache = config.cache(cache_name)?;
		let dvfs_domain = match config.cache_clock_domain(cache) {
			ClockDomain::Private => "core",
			ClockDomain::Global => "global",
		};
		let key = |field: &str| format!("perf_model/{section}/{field}");

		insert(key("associativity"), self::int(cache.ways()));
		insert(key("cache_block_size"), self::int(config.line_size()));
		insert(key("cache_size"), cache.size_kib().to_string().into());
		insert(key("data_access_time"), self::int(cache.latency()));
		insert(key("shared_cores"), config.cache_shared_cores(cache).to_string().into());
		insert(key("dvfs_domain"), dvfs_domain.into());
	}

	Ok(entries)
}

/// Builds the `results` section
fn convert_results(aggregator: &Aggregator) -> Result<BTreeMap<String, Entry>, Error> {
	let config = aggregator.config;
	let cores = config.cores();
	let mut entries = BTreeMap::new();

	// Note: Loads and stores come from the first level data cache, which may be
	//       shared by several cores, so they're padded to the number of cores.
	let sum_per_core = |kind: UopKind, what: &str| -> Result<Value, Error> {
		aggregator
			.sum(&Metric::Uops(kind))?
			.padded(cores, what)
			.map(Value::Array)
	};
	let uops = UopTotals {
		total:      aggregator.sum(&Metric::Uops(UopKind::Total))?,
		loads:      sum_per_core(UopKind::Load, "Load micro-ops")?,
		stores:     sum_per_core(UopKind::Store, "Store micro-ops")?,
		branches:   aggregator.sum(&Metric::Uops(UopKind::Branch))?,
		fp_add_sub: aggregator.sum(&Metric::Uops(UopKind::FpAddSub))?,
		fp_mul_div: aggregator.sum(&Metric::Uops(UopKind::FpMulDiv))?,
	};
	let generic_uops = uops.generic()?;
	for (name, value) in [
		("interval_timer.uop_branch", &uops.branches),
		("interval_timer.uop_fp_addsub", &uops.fp_add_sub),
		("interval_timer.uop_fp_muldiv", &uops.fp_mul_div),
		("interval_timer.uop_load", &uops.loads),
		("interval_timer.uop_store", &uops.stores),
		("interval_timer.uop_generic", &generic_uops),
		("interval_timer.uops_total", &uops.total),
	] {
		entries.insert(name.to_owned(), Entry::Ints(value.clone().into_vec()));
	}

	for (name, metric) in [
		("branch_predictor.num-incorrect", Metric::MispredictedBranches),
		("branch_predictor.num-correct", Metric::CorrectBranches),
		("performance_model.instruction_count", Metric::Instructions),
		("performance_model.idle_elapsed_time", Metric::IdleElapsedTime),
	] {
		entries.insert(name.to_owned(), Entry::Ints(aggregator.sum(&metric)?.into_vec()));
	}

	let frequency_to_cycles = config.frequency_to_cycles();
	entries.insert("fs_to_cycles".to_owned(), format!("{frequency_to_cycles:?}").into());
	entries.insert(
		"fs_to_cycles_cores".to_owned(),
		Entry::Floats(vec![frequency_to_cycles; cores]),
	);

	let elapsed_time = aggregator.total(&Metric::ElapsedTime)?;
	entries.insert("global.time_begin".to_owned(), Entry::Int(0));
	entries.insert("global.time_end".to_owned(), Entry::Int(elapsed_time));
	entries.insert("global.time".to_owned(), Entry::Int(elapsed_time));
	entries.insert(
		"performance_model.elapsed_time".to_owned(),
		Entry::Ints(vec![elapsed_time; cores]),
	);

	entries.insert("network.shmem-1.bus.num-packets".to_owned(), Entry::Ints(vec![0, 0]));
	entries.insert("network.shmem-1.bus.time-used".to_owned(), Entry::Ints(vec![0, 0]));

	for (cache_name, prefix, _) in SNIPER_CACHES {
		let cache = config.cache(cache_name)?;
		self::convert_cache(aggregator, cache, prefix, &mut entries)?;
	}

	Ok(entries)
}

/// Adds the load / store results of `cache`, padded to the number of cores.
///
/// The deepest cache level also stands in for the memory controller.
fn convert_cache(
	aggregator: &Aggregator,
	cache: &Cache,
	prefix: &str,
	entries: &mut BTreeMap<String, Entry>,
) -> Result<(), Error> {
	let config = aggregator.config;
	let cores = config.cores();
	let sum_padded = |stat: CacheStat, name: &str| -> Result<Vec<i64>, Error> {
		let metric = Metric::Cache(cache.id().name().to_owned(), stat);
		aggregator
			.sum(&metric)
			.and_then(|value: Value| value.padded(cores, &format!("Sniper result `{name}`")))
	};

	let load_misses = sum_padded(CacheStat::LoadMisses, &format!("{prefix}.load-misses"))?;
	let loads = sum_padded(CacheStat::Loads, &format!("{prefix}.loads"))?;
	let store_misses = sum_padded(CacheStat::StoreMisses, &format!("{prefix}.store-misses"))?;
	let stores = sum_padded(CacheStat::Stores, &format!("{prefix}.stores"))?;

	if config.is_last_level(cache) {
		tracing::debug!(cache = %cache.id(), "Aliasing last level cache misses to dram");
		entries.insert("dram.reads".to_owned(), load_misses.clone().into());
		entries.insert("dram.writes".to_owned(), store_misses.clone().into());
	}

	entries.insert(format!("{prefix}.load-misses"), load_misses.into());
	entries.insert(format!("{prefix}.loads"), loads.into());
	entries.insert(format!("{prefix}.store-misses"), store_misses.into());
	entries.insert(format!("{prefix}.stores"), stores.into());

	Ok(())
}

/// Converts a config integer into an entry
fn int(value: u64) -> Entry {
	Entry::Int(value as i64)
}
