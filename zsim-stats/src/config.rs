//! Configuration
//!
//! Typed, validated view over the simulated system's configuration.
//! Only the fields the statistics need are read, everything else is ignored.

// Modules
pub mod text;

// Imports
use {
	crate::Error,
	anyhow::Context,
	std::{collections::BTreeMap, fmt},
};

/// Cache entries in `sys.caches` that aren't caches
const IGNORED_CACHE_ENTRIES: &[&str] = &["MAProfCacheGroupNames"];

/// System configuration
#[derive(Clone, Debug)]
pub struct Config {
	/// Phase length, in cycles
	phase_length: u64,

	/// Frequency, as given by the simulator
	frequency: u64,

	/// Cache line size, in bytes
	line_size: u64,

	/// The core group
	core_group: CoreGroup,

	/// All caches, ordered by level
	caches: Vec<Cache>,
}

impl Config {
	/// Parses a config from `out.cfg` text
	pub fn from_cfg_text(cfg: &str) -> Result<Self, anyhow::Error> {
		let json = text::to_json(cfg);
		Self::from_json_str(&json)
	}

	/// Parses a config from its json representation
	pub fn from_json_str(json: &str) -> Result<Self, anyhow::Error> {
		let raw = serde_json::from_str::<RawConfig>(json).context("Unable to parse config")?;
		Self::from_raw(raw)
	}

	/// Validates a raw config
	pub fn from_raw(raw: RawConfig) -> Result<Self, anyhow::Error> {
		// Note: Only a single homogeneous core group is supported, the
		//       statistics have no notion of which group a counter belongs to.
		let core_groups = raw.sys.cores.len();
		let Some((core_group_name, raw_core_group)) = raw.sys.cores.into_iter().next().filter(|_| core_groups == 1)
		else {
			return Err(Error::UnsupportedCoreGroups(core_groups).into());
		};
		let core_group = CoreGroup {
			name:  core_group_name,
			cores: raw_core_group.cores,
			kind:  CoreKind::from_name(&raw_core_group.kind),
		};

		let mut caches = raw
			.sys
			.caches
			.into_iter()
			.filter(|(name, _)| !IGNORED_CACHE_ENTRIES.contains(&name.as_str()))
			.map(|(name, raw_cache)| {
				let id = CacheId::parse(&name)?;
				let raw_cache = serde_json::from_value::<RawCache>(raw_cache)
					.with_context(|| format!("Unable to parse cache {name:?}"))?;
				anyhow::ensure!(raw_cache.caches != 0, Error::NoCacheInstances(name));

				Ok(Cache {
					id,
					ways: raw_cache.array.ways,
					instances: raw_cache.caches,
					latency: raw_cache.latency,
					size: raw_cache.size,
				})
			})
			.collect::<Result<Vec<_>, anyhow::Error>>()?;
		caches.sort_by(|lhs, rhs| lhs.id.cmp(&rhs.id));

		let config = Self {
			phase_length: raw.sim.phase_length,
			frequency: raw.sys.frequency,
			line_size: raw.sys.line_size,
			core_group,
			caches,
		};
		tracing::debug!(?config, "Loaded config");

		Ok(config)
	}

	/// Returns the phase length, in cycles
	pub fn phase_length(&self) -> u64 {
		self.phase_length
	}

	/// Returns the frequency, as given by the simulator
	pub fn frequency(&self) -> u64 {
		self.frequency
	}

	/// Returns the factor to divide cycles by to get the elapsed time
	pub fn frequency_to_cycles(&self) -> f64 {
		self.frequency as f64 / 1e9
	}

	/// Returns the cache line size, in bytes
	pub fn line_size(&self) -> u64 {
		self.line_size
	}

	/// Returns the core group
	pub fn core_group(&self) -> &CoreGroup {
		&self.core_group
	}

	/// Returns the number of cores
	pub fn cores(&self) -> usize {
		self.core_group.cores
	}

	/// Returns all caches, ordered by level
	pub fn caches(&self) -> &[Cache] {
		&self.caches
	}

	/// Returns a cache by name
	pub fn cache(&self, name: &str) -> Result<&Cache, Error> {
		self.cache_idx(name).map(|idx| &self.caches[idx])
	}

	/// Returns the index of a cache in [`Config::caches`] by name
	pub fn cache_idx(&self, name: &str) -> Result<usize, Error> {
		self.caches
			.iter()
			.position(|cache| cache.id.name == name)
			.ok_or_else(|| Error::UnknownCache(name.to_owned()))
	}

	/// Returns the deepest cache level, or 0 if there are no caches
	pub fn cache_levels(&self) -> u8 {
		self.caches.iter().map(|cache| cache.id.level).max().unwrap_or(0)
	}

	/// Returns whether `cache` is on the deepest cache level
	pub fn is_last_level(&self, cache: &Cache) -> bool {
		cache.id.level == self.cache_levels()
	}

	/// Returns the number of cores sharing each instance of `cache`
	pub fn cache_shared_cores(&self, cache: &Cache) -> usize {
		self.cores() / cache.instances
	}

	/// Returns the clock domain of `cache`
	pub fn cache_clock_domain(&self, cache: &Cache) -> ClockDomain {
		match self.cache_shared_cores(cache) {
			1 => ClockDomain::Private,
			_ => ClockDomain::Global,
		}
	}
}

/// Core group
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct CoreGroup {
	/// Name, also the component name of its counters
	pub name: String,

	/// Number of cores
	pub cores: usize,

	/// Core kind
	pub kind: CoreKind,
}

/// Core kind
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum CoreKind {
	/// Out-of-order core
	OutOfOrder,

	/// Simple, in-order, IPC 1 core
	Simple,

	/// Any other core
	Other(String),
}

impl CoreKind {
	/// Parses a core kind from its config name
	pub fn from_name(name: &str) -> Self {
		match name {
			"OOO" => Self::OutOfOrder,
			"Simple" => Self::Simple,
			_ => Self::Other(name.to_owned()),
		}
	}
}

/// Cache
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Cache {
	/// Id
	id: CacheId,

	/// Associativity
	ways: u64,

	/// Number of instances
	instances: usize,

	/// Access latency, in cycles
	latency: u64,

	/// Capacity of each instance, in bytes
	size: u64,
}

impl Cache {
	/// Returns this cache's id
	pub fn id(&self) -> &CacheId {
		&self.id
	}

	/// Returns the associativity
	pub fn ways(&self) -> u64 {
		self.ways
	}

	/// Returns the number of instances
	pub fn instances(&self) -> usize {
		self.instances
	}

	/// Returns the access latency, in cycles
	pub fn latency(&self) -> u64 {
		self.latency
	}

	/// Returns the capacity, in KiB (rounded down)
	pub fn size_kib(&self) -> u64 {
		self.size / 1024
	}
}

/// Cache id.
///
/// Ordered by level first, then name.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
pub struct CacheId {
	/// Level
	level: u8,

	/// Name, also the component name of its counters
	name: String,
}

impl CacheId {
	/// Parses a cache id from a cache name such as `l1d` or `l3`
	pub fn parse(name: &str) -> Result<Self, Error> {
		let mut chars = name.chars();
		let level = match (chars.next(), chars.next().and_then(|c| c.to_digit(10))) {
			(Some('l' | 'L'), Some(level)) => level as u8,
			_ => return Err(Error::InvalidCacheName(name.to_owned())),
		};

		Ok(Self {
			level,
			name: name.to_owned(),
		})
	}

	/// Returns the level
	pub fn level(&self) -> u8 {
		self.level
	}

	/// Returns the name
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns whether this is a first level cache.
	///
	/// First level caches count filter hits separately from their other hits.
	pub fn is_first_level(&self) -> bool {
		self.level == 1
	}
}

impl fmt::Display for CacheId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

/// Clock domain of a cache
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ClockDomain {
	/// Private to a single core
	Private,

	/// Shared by several cores
	Global,
}

/// Raw config, as parsed
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RawConfig {
	pub sim: RawSim,
	pub sys: RawSys,
}

/// Raw `sim` section
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RawSim {
	#[serde(rename = "phaseLength")]
	pub phase_length: u64,
}

/// Raw `sys` section
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RawSys {
	pub frequency: u64,
	#[serde(rename = "lineSize")]
	pub line_size: u64,
	pub cores:     BTreeMap<String, RawCoreGroup>,

	// Note: Not every entry is a cache, so we only parse them
	//       after filtering out the ones we ignore.
	pub caches: BTreeMap<String, serde_json::Value>,
}

/// Raw core group
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RawCoreGroup {
	pub cores: usize,
	#[serde(rename = "type")]
	pub kind:  String,
}

/// Raw cache
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RawCache {
	pub array:   RawCacheArray,
	pub caches:  usize,
	pub latency: u64,
	pub size:    u64,
}

/// Raw cache array
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RawCacheArray {
	pub ways: u64,
}
