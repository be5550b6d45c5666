//! Shared fixtures
//!
//! A 2 core system with private first level caches and shared second and third level caches.

// Not every test uses every fixture
#![allow(dead_code)]

// Imports
use {
	serde_json::json,
	zsim_stats::{
		trace::{CacheCounter, CoreCounter, RawSnapshot},
		Config,
		Trace,
	},
};

/// Number of cores
pub const CORES: usize = 2;

/// Core group name
pub const CORE_GROUP: &str = "westmere";

/// Caches, with their number of instances
pub const CACHES: [(&str, usize); 4] = [("l1d", 2), ("l1i", 2), ("l2", 1), ("l3", 1)];

/// Config, as zsim writes it
pub const CONFIG_CFG: &str = concat!(
	"sim : \n{\n",
	"  phaseLength = 10000;\n",
	"  maxTotalInstrs = 0L;\n",
	"};\n",
	"sys : \n{\n",
	"  caches : \n  {\n",
	"    MAProfCacheGroupNames = \"\";\n",
	"    l1d : \n    {\n",
	"      array : \n      {\n        ways = 8;\n      };\n",
	"      caches = 2;\n      latency = 4;\n      size = 32768;\n",
	"    };\n",
	"    l1i : \n    {\n",
	"      array : \n      {\n        ways = 4;\n      };\n",
	"      caches = 2;\n      latency = 3;\n      size = 32768;\n",
	"    };\n",
	"    l2 : \n    {\n",
	"      array : \n      {\n        ways = 8;\n      };\n",
	"      caches = 1;\n      latency = 7;\n      size = 262144;\n",
	"    };\n",
	"    l3 : \n    {\n",
	"      array : \n      {\n        ways = 16;\n      };\n",
	"      caches = 1;\n      latency = 27;\n      size = 8388608;\n",
	"    };\n",
	"  };\n",
	"  cores : \n  {\n",
	"    westmere : \n    {\n      cores = 2;\n      type = \"OOO\";\n    };\n",
	"  };\n",
	"  frequency = 2000;\n",
	"  lineSize = 64;\n",
	"};\n",
);

/// Returns the config as json, with cores of kind `core_type`
pub fn config_json(core_type: &str) -> serde_json::Value {
	self::config_json_with(core_type, CACHES[0].1)
}

/// Returns the config as json, with cores of kind `core_type` and `l1d_instances` data caches
pub fn config_json_with(core_type: &str, l1d_instances: usize) -> serde_json::Value {
	let cache = |ways: u64, caches: usize, latency: u64, size: u64| {
		json!({ "array": { "ways": ways }, "caches": caches, "latency": latency, "size": size })
	};

	json!({
		"sim": { "phaseLength": 10000 },
		"sys": {
			"frequency": 2000,
			"lineSize": 64,
			"cores": { CORE_GROUP: { "cores": CORES, "type": core_type } },
			"caches": {
				"MAProfCacheGroupNames": "",
				"l1d": cache(8, l1d_instances, 4, 32768),
				"l1i": cache(4, 2, 3, 32768),
				"l2": cache(8, 1, 7, 262144),
				"l3": cache(16, 1, 27, 8388608),
			},
		},
	})
}

/// Returns the config
pub fn config() -> Config {
	Config::from_json_str(&self::config_json("OOO").to_string()).expect("Fixture config should be valid")
}

/// Returns a raw snapshot with every counter zeroed except for `counters`.
///
/// `counters` is an object of components to objects of counters to values.
pub fn snapshot(phase: u64, op_mode: i64, counters: serde_json::Value) -> RawSnapshot {
	self::snapshot_with(&CoreCounter::ALL, &CACHES, phase, op_mode, counters)
}

/// Returns a raw snapshot with only `core_counters` and `caches`, zeroed except for `counters`.
pub fn snapshot_with(
	core_counters: &[CoreCounter],
	caches: &[(&str, usize)],
	phase: u64,
	op_mode: i64,
	counters: serde_json::Value,
) -> RawSnapshot {
	let mut components = serde_json::Map::new();

	let core_counters = core_counters
		.iter()
		.map(|counter| (counter.name().to_owned(), json!(vec![0; CORES])))
		.collect::<serde_json::Map<_, _>>();
	components.insert(CORE_GROUP.to_owned(), core_counters.into());

	for &(cache, instances) in caches {
		let cache_counters = CacheCounter::ALL
			.iter()
			.map(|counter| (counter.name().to_owned(), json!(vec![0; instances])))
			.collect::<serde_json::Map<_, _>>();
		components.insert(cache.to_owned(), cache_counters.into());
	}

	let counters = counters.as_object().cloned().unwrap_or_default();
	for (component, component_counters) in counters {
		let component = components
			.get_mut(&component)
			.and_then(serde_json::Value::as_object_mut)
			.expect("Unknown fixture component");
		for (counter, value) in component_counters.as_object().cloned().unwrap_or_default() {
			component.insert(counter, value);
		}
	}

	components.insert("phase".to_owned(), json!(phase));
	components.insert("maxineVMOperationMode".to_owned(), json!(op_mode));
	serde_json::from_value(components.into()).expect("Fixture snapshot should be valid")
}

/// Builds a trace from raw snapshots against the fixture config
pub fn trace(config: &Config, snapshots: Vec<RawSnapshot>) -> Trace {
	Trace::from_raw(config, snapshots).expect("Fixture trace should be valid")
}

/// Returns a trace of 3 intervals with 100, 200 and 300 instructions and 50, 100 and 150 cycles
/// on core 0, all in operation mode 0, one phase each.
pub fn ipc_trace(config: &Config) -> Trace {
	let snapshots = [(0, 0, 0, 0), (1, 0, 100, 50), (2, 0, 300, 150), (3, 0, 600, 300)]
		.into_iter()
		.map(|(phase, op_mode, instrs, cycles)| {
			self::snapshot(
				phase,
				op_mode,
				json!({ CORE_GROUP: { "instrs": [instrs, 0], "cycles": [cycles, 0] } }),
			)
		})
		.collect();

	self::trace(config, snapshots)
}

/// Returns a trace exercising the first level filter hits and the store miss states.
///
/// - `l1d` instance 0 has `fhGETS = [0, 10, 25]` and `hGETS = [0, 5, 8]`.
/// - `l3` misses loads and stores every interval.
/// - Core 0 runs 250 micro-ops, 20 of them branches, and core 1 runs 150, 10 of them branches.
pub fn cache_trace(config: &Config) -> Trace {
	let snapshots = vec![
		self::snapshot(0, 0, json!({})),
		self::snapshot(
			1,
			0,
			json!({
				CORE_GROUP: { "instrs": [1000, 1000], "cycles": [800, 900], "uops": [100, 100], "branchUops": [10, 5] },
				"l1d": {
					"fhGETS": [10, 1], "hGETS": [5, 2], "mGETS": [3, 0],
					"fhGETX": [4, 0], "hGETX": [2, 1], "mGETXIM": [1, 0], "mGETXSM": [1, 1],
				},
				"l2": { "hGETS": [2], "mGETS": [1], "hGETX": [1], "mGETXIM": [1], "mGETXSM": [0] },
				"l3": { "hGETS": [0], "mGETS": [1], "hGETX": [0], "mGETXIM": [1], "mGETXSM": [0] },
			}),
		),
		self::snapshot(
			2,
			1,
			json!({
				CORE_GROUP: { "instrs": [3000, 1500], "cycles": [1800, 1400], "uops": [250, 150], "branchUops": [20, 10] },
				"l1d": {
					"fhGETS": [25, 1], "hGETS": [8, 2], "mGETS": [4, 1],
					"fhGETX": [6, 0], "hGETX": [3, 1], "mGETXIM": [2, 0], "mGETXSM": [2, 1],
				},
				"l2": { "hGETS": [3], "mGETS": [2], "hGETX": [2], "mGETXIM": [1], "mGETXSM": [1] },
				"l3": { "hGETS": [1], "mGETS": [2], "hGETX": [0], "mGETXIM": [1], "mGETXSM": [1] },
			}),
		),
	];

	self::trace(config, snapshots)
}
