//! Sniper conversion tests

// Modules
mod common;

// Imports
use {
	common::CORE_GROUP,
	pretty_assertions::assert_eq,
	serde_json::json,
	zsim_stats::{
		sniper::{self, Entry, SniperResults},
		trace::CoreCounter,
		Aggregator,
		Config,
		Error,
		OpModes,
	},
};

/// Converts the cache trace, accepting `op_modes`
fn convert(config: &Config, op_modes: &OpModes) -> Result<SniperResults, Error> {
	let trace = common::cache_trace(config);
	sniper::convert(&Aggregator::new(config, &trace, op_modes))
}

#[test]
fn last_level_aliases_to_dram() {
	let config = common::config();
	let results = convert(&config, &OpModes::All).expect("Unable to convert").results;

	assert_eq!(results["L3.load-misses"], Entry::Ints(vec![2, 0]));
	assert_eq!(results["L3.store-misses"], Entry::Ints(vec![2, 0]));
	assert_eq!(results["dram.reads"], results["L3.load-misses"]);
	assert_eq!(results["dram.writes"], results["L3.store-misses"]);
}

#[test]
fn cache_results_padded_to_cores() {
	let config = common::config();
	let results = convert(&config, &OpModes::All).expect("Unable to convert").results;

	assert_eq!(results["L1-D.loads"], Entry::Ints(vec![37, 4]));
	assert_eq!(results["L1-D.stores"], Entry::Ints(vec![13, 2]));
	assert_eq!(results["L1-I.loads"], Entry::Ints(vec![0, 0]));
	assert_eq!(results["L2.loads"], Entry::Ints(vec![5, 0]));
	assert_eq!(results["L2.store-misses"], Entry::Ints(vec![2, 0]));
}

#[test]
fn core_results() {
	let config = common::config();
	let results = convert(&config, &OpModes::All).expect("Unable to convert").results;

	assert_eq!(results["performance_model.instruction_count"], Entry::Ints(vec![3000, 1500]));
	assert_eq!(results["interval_timer.uops_total"], Entry::Ints(vec![250, 150]));
	assert_eq!(results["interval_timer.uop_branch"], Entry::Ints(vec![20, 10]));
	assert_eq!(results["interval_timer.uop_load"], Entry::Ints(vec![37, 4]));
	assert_eq!(results["interval_timer.uop_store"], Entry::Ints(vec![13, 2]));
	assert_eq!(results["interval_timer.uop_generic"], Entry::Ints(vec![180, 134]));
	assert_eq!(results["network.shmem-1.bus.num-packets"], Entry::Ints(vec![0, 0]));
	assert_eq!(results["global.time_begin"], Entry::Int(0));
	assert_eq!(results["global.time"], results["global.time_end"]);

	let Entry::Int(time) = results["global.time"] else {
		panic!("Global time should be an integer");
	};
	assert_eq!(results["performance_model.elapsed_time"], Entry::Ints(vec![time, time]));
	assert_eq!(results["fs_to_cycles_cores"], Entry::Floats(vec![2e-6, 2e-6]));

	let Entry::Text(fs_to_cycles) = &results["fs_to_cycles"] else {
		panic!("Femtoseconds to cycles should be text");
	};
	assert_eq!(fs_to_cycles.parse::<f64>(), Ok(2e-6));
}

#[test]
fn results_follow_op_modes() {
	let config = common::config();
	let results = convert(&config, &OpModes::only([1])).expect("Unable to convert").results;

	assert_eq!(results["performance_model.instruction_count"], Entry::Ints(vec![2000, 500]));
	assert_eq!(results["L1-D.loads"], Entry::Ints(vec![19, 1]));
	assert_eq!(results["dram.reads"], Entry::Ints(vec![1, 0]));
}

#[test]
fn config_section() {
	let config = common::config();
	let sniper_config = convert(&config, &OpModes::All).expect("Unable to convert").config;
	let entry = |key: &str| sniper_config[key].clone();

	assert_eq!(entry("general/total_cores"), Entry::from("2"));
	assert_eq!(entry("perf_model/cache/levels"), Entry::Int(3));
	assert_eq!(entry("perf_model/core/frequency"), Entry::from("2.0"));
	assert_eq!(entry("perf_model/core/type"), Entry::from("rob"));
	assert_eq!(entry("perf_model/core/rob_timer/in_order"), Entry::from("0"));
	assert_eq!(entry("perf_model/branch_predictor/mispredict_penalty"), Entry::from("17"));

	assert_eq!(entry("perf_model/l1_dcache/associativity"), Entry::Int(8));
	assert_eq!(entry("perf_model/l1_dcache/cache_block_size"), Entry::Int(64));
	assert_eq!(entry("perf_model/l1_dcache/cache_size"), Entry::from("32"));
	assert_eq!(entry("perf_model/l1_dcache/data_access_time"), Entry::Int(4));
	assert_eq!(entry("perf_model/l1_dcache/shared_cores"), Entry::from("1"));
	assert_eq!(entry("perf_model/l1_dcache/dvfs_domain"), Entry::from("core"));

	assert_eq!(entry("perf_model/l3_cache/cache_size"), Entry::from("8192"));
	assert_eq!(entry("perf_model/l3_cache/shared_cores"), Entry::from("2"));
	assert_eq!(entry("perf_model/l3_cache/dvfs_domain"), Entry::from("global"));
}

#[test]
fn simple_cores_are_in_order() {
	let config = Config::from_json_str(&common::config_json("Simple").to_string()).expect("Config should be valid");
	let sniper_config = convert(&config, &OpModes::All).expect("Unable to convert").config;

	assert_eq!(sniper_config["perf_model/core/type"], Entry::from("interval"));
	assert_eq!(sniper_config["perf_model/core/rob_timer/in_order"], Entry::from("1"));
}

#[test]
fn shared_first_level_data_cache() {
	let config =
		Config::from_json_str(&common::config_json_with("OOO", 1).to_string()).expect("Config should be valid");
	let caches = [("l1d", 1), ("l1i", 2), ("l2", 1), ("l3", 1)];
	let trace = common::trace(&config, vec![
		common::snapshot_with(&CoreCounter::ALL, &caches, 0, 0, json!({})),
		common::snapshot_with(
			&CoreCounter::ALL,
			&caches,
			1,
			0,
			json!({
				CORE_GROUP: { "instrs": [100, 80], "cycles": [50, 40], "uops": [40, 30] },
				"l1d": { "hGETS": [6], "mGETS": [2], "hGETX": [3] },
			}),
		),
	]);

	let SniperResults {
		config: sniper_config,
		results,
	} = sniper::convert(&Aggregator::new(&config, &trace, &OpModes::All)).expect("Unable to convert");
	assert_eq!(results["interval_timer.uop_load"], Entry::Ints(vec![8, 0]));
	assert_eq!(results["interval_timer.uop_store"], Entry::Ints(vec![3, 0]));
	assert_eq!(results["interval_timer.uop_generic"], Entry::Ints(vec![29, 30]));
	assert_eq!(results["L1-D.loads"], Entry::Ints(vec![8, 0]));
	assert_eq!(sniper_config["perf_model/l1_dcache/shared_cores"], Entry::from("2"));
}

#[test]
fn serialized_layout() {
	let config = common::config();
	let results = convert(&config, &OpModes::All).expect("Unable to convert");
	let value = serde_json::to_value(&results).expect("Unable to serialize results");

	assert_eq!(value["config"]["perf_model/cache/levels"], json!(3));
	assert_eq!(value["config"]["power/vdd"], json!("1.2"));
	assert_eq!(value["results"]["L1-D.loads"], json!([37, 4]));
	assert_eq!(value["results"]["fs_to_cycles_cores"], json!([2e-6, 2e-6]));
	assert_eq!(value["results"]["global.time_begin"], json!(0));
}
