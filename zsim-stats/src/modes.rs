//! Operation modes

// Imports
use {
	itertools::Itertools,
	std::{collections::BTreeSet, fmt, num::ParseIntError, str::FromStr},
};

/// Set of accepted operation modes
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum OpModes {
	/// Every operation mode
	All,

	/// Only these operation modes
	Only(BTreeSet<i64>),
}

impl OpModes {
	/// Creates a set accepting only `modes`
	pub fn only(modes: impl IntoIterator<Item = i64>) -> Self {
		Self::Only(modes.into_iter().collect())
	}

	/// Returns whether `op_mode` is accepted
	pub fn contains(&self, op_mode: i64) -> bool {
		match self {
			Self::All => true,
			Self::Only(modes) => modes.contains(&op_mode),
		}
	}
}

impl FromStr for OpModes {
	type Err = ParseIntError;

	/// Parses a comma-separated list of operation modes.
	///
	/// `*` or `all` accept every mode, while an empty string accepts none.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"*" | "all" => Ok(Self::All),
			s => s
				.split(',')
				.map(str::trim)
				.filter(|mode| !mode.is_empty())
				.map(i64::from_str)
				.collect::<Result<_, _>>()
				.map(Self::Only),
		}
	}
}

impl fmt::Display for OpModes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::All => f.write_str("*"),
			Self::Only(modes) => write!(f, "{}", modes.iter().join(",")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse() {
		assert_eq!("0, 2,1".parse(), Ok(OpModes::only([0, 1, 2])));
		assert_eq!("all".parse(), Ok(OpModes::All));
		assert_eq!("".parse(), Ok(OpModes::only([])));
		assert!("0,x".parse::<OpModes>().is_err());
	}

	#[test]
	fn contains() {
		let modes = OpModes::only([3, 5]);
		assert!(modes.contains(3));
		assert!(!modes.contains(4));
		assert!(OpModes::All.contains(4));
		assert!(!OpModes::only([]).contains(0));
	}
}
