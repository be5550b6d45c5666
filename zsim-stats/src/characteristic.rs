//! Characteristics
//!
//! A characteristic is a single number extracted from a trace, named by a short code
//! such as `IPC` or `CMLDPKI`.

// Imports
use {
	crate::{
		aggregate::Aggregator,
		derived,
		metrics::{CacheStat, Metric},
		Error,
	},
	std::{fmt, str::FromStr},
};

/// Description of all characteristic codes
pub const USAGE: &str = "\
Valid characteristics are:
  C - cycles
  I - instructions
  IPC - instructions per clock
  C[H|M|A][LD|ST|LDST](PKI) - cache characteristics
    [..|..] - required alternatives
    (..|..) - optional alternatives
    H       - hits
    M       - misses
    A       - accesses
    LD      - loads
    ST      - stores
    LDST    - loads and stores
    PKI     - per kilo instruction
";

/// Characteristic
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Characteristic {
	/// Cycles
	Cycles,

	/// Instructions
	Instructions,

	/// Instructions per cycle
	Ipc,

	/// Cache characteristic
	Cache {
		outcome:              CacheOutcome,
		accesses:             CacheAccesses,
		per_kilo_instruction: bool,
	},
}

/// Outcome of cache accesses counted by a characteristic
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CacheOutcome {
	Hits,
	Misses,
	All,
}

/// Cache accesses counted by a characteristic
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CacheAccesses {
	Loads,
	Stores,
	LoadsStores,
}

impl Characteristic {
	/// Returns whether this characteristic needs a cache
	pub fn needs_cache(self) -> bool {
		matches!(self, Self::Cache { .. })
	}

	/// Evaluates this characteristic.
	///
	/// `cache` is only used by cache characteristics, which fail without it.
	pub fn evaluate(self, aggregator: &Aggregator, cache: Option<&str>) -> Result<Number, Error> {
		let number = match self {
			Self::Cycles => Number::Integer(aggregator.total(&Metric::Cycles)?),
			Self::Instructions => Number::Integer(aggregator.total(&Metric::Instructions)?),
			Self::Ipc => Number::Float(derived::ipc(
				aggregator.total(&Metric::Instructions)?,
				aggregator.total(&Metric::Cycles)?,
			)?),
			Self::Cache {
				outcome,
				accesses,
				per_kilo_instruction,
			} => {
				let cache = cache.ok_or_else(|| Error::MissingArgument {
					characteristic: self.to_string(),
					argument:       "cache name",
				})?;

				// Note: Loads and stores are summed separately and only then added,
				//       just like every other composite.
				let mut count = 0;
				for &stat in outcome.stats(accesses) {
					count += aggregator.total(&Metric::Cache(cache.to_owned(), stat))?;
				}

				match per_kilo_instruction {
					true => Number::Float(derived::per_kilo_instruction(
						count,
						aggregator.total(&Metric::Instructions)?,
					)?),
					false => Number::Integer(count),
				}
			},
		};

		Ok(number)
	}
}

impl CacheOutcome {
	/// Returns the cache statistics summed for this outcome over `accesses`
	fn stats(self, accesses: CacheAccesses) -> &'static [CacheStat] {
		match (self, accesses) {
			(Self::Hits, CacheAccesses::Loads) => &[CacheStat::LoadHits],
			(Self::Hits, CacheAccesses::Stores) => &[CacheStat::StoreHits],
			(Self::Hits, CacheAccesses::LoadsStores) => &[CacheStat::LoadHits, CacheStat::StoreHits],
			(Self::Misses, CacheAccesses::Loads) => &[CacheStat::LoadMisses],
			(Self::Misses, CacheAccesses::Stores) => &[CacheStat::StoreMisses],
			(Self::Misses, CacheAccesses::LoadsStores) => &[CacheStat::LoadMisses, CacheStat::StoreMisses],
			(Self::All, CacheAccesses::Loads) => &[CacheStat::Loads],
			(Self::All, CacheAccesses::Stores) => &[CacheStat::Stores],
			(Self::All, CacheAccesses::LoadsStores) => &[CacheStat::Loads, CacheStat::Stores],
		}
	}
}

impl FromStr for Characteristic {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let unsupported = || Error::UnsupportedCharacteristic(s.to_owned());

		match s {
			"C" => return Ok(Self::Cycles),
			"I" => return Ok(Self::Instructions),
			"IPC" => return Ok(Self::Ipc),
			_ => (),
		}

		// Cache characteristics: `C[H|M|A][LD|ST|LDST](PKI)`
		let rest = s.strip_prefix('C').ok_or_else(unsupported)?;
		let (outcome, rest) = match rest.split_at_checked(1) {
			Some(("H", rest)) => (CacheOutcome::Hits, rest),
			Some(("M", rest)) => (CacheOutcome::Misses, rest),
			Some(("A", rest)) => (CacheOutcome::All, rest),
			_ => return Err(unsupported()),
		};
		let (rest, per_kilo_instruction) = match rest.strip_suffix("PKI") {
			Some(rest) => (rest, true),
			None => (rest, false),
		};
		let accesses = match rest {
			"LD" => CacheAccesses::Loads,
			"ST" => CacheAccesses::Stores,
			"LDST" => CacheAccesses::LoadsStores,
			_ => return Err(unsupported()),
		};

		Ok(Self::Cache {
			outcome,
			accesses,
			per_kilo_instruction,
		})
	}
}

impl fmt::Display for Characteristic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Cycles => f.write_str("C"),
			Self::Instructions => f.write_str("I"),
			Self::Ipc => f.write_str("IPC"),
			Self::Cache {
				outcome,
				accesses,
				per_kilo_instruction,
			} => {
				let outcome = match outcome {
					CacheOutcome::Hits => "H",
					CacheOutcome::Misses => "M",
					CacheOutcome::All => "A",
				};
				let accesses = match accesses {
					CacheAccesses::Loads => "LD",
					CacheAccesses::Stores => "ST",
					CacheAccesses::LoadsStores => "LDST",
				};
				let pki = match per_kilo_instruction {
					true => "PKI",
					false => "",
				};

				write!(f, "C{outcome}{accesses}{pki}")
			},
		}
	}
}

/// Characteristic value
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Number {
	/// Count
	Integer(i64),

	/// Ratio
	Float(f64),
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Integer(value) => write!(f, "{value}"),
			Self::Float(value) => write!(f, "{value:?}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use {super::*, pretty_assertions::assert_eq};

	#[test]
	fn all_codes_round_trip() {
		let mut codes = vec!["C".to_owned(), "I".to_owned(), "IPC".to_owned()];
		for outcome in ["H", "M", "A"] {
			for accesses in ["LD", "ST", "LDST"] {
				for pki in ["", "PKI"] {
					codes.push(format!("C{outcome}{accesses}{pki}"));
				}
			}
		}
		assert_eq!(codes.len(), 21);

		for code in codes {
			let characteristic = code.parse::<Characteristic>().expect("Code should be supported");
			assert_eq!(characteristic.to_string(), code);
		}
	}

	#[test]
	fn parse_cache_code() {
		assert_eq!("CMLDSTPKI".parse(), Ok(Characteristic::Cache {
			outcome:              CacheOutcome::Misses,
			accesses:             CacheAccesses::LoadsStores,
			per_kilo_instruction: true,
		}));
	}

	#[test]
	fn unsupported_codes() {
		for code in ["", "X", "CX", "CH", "CHPKI", "CHLDS", "ipc", "CALDPK"] {
			assert_eq!(
				code.parse::<Characteristic>(),
				Err(Error::UnsupportedCharacteristic(code.to_owned())),
				"{code:?} should be unsupported"
			);
		}
	}

	#[test]
	fn only_cache_codes_need_cache() {
		assert!(!Characteristic::Ipc.needs_cache());
		assert!("CASTPKI".parse::<Characteristic>().is_ok_and(Characteristic::needs_cache));
	}

	#[test]
	fn number_display() {
		assert_eq!(Number::Integer(600).to_string(), "600");
		assert_eq!(Number::Float(2.0).to_string(), "2.0");
		assert_eq!(Number::Float(0.25).to_string(), "0.25");
	}
}
