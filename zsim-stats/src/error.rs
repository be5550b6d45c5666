//! Errors

/// Statistics error
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum Error {
	/// A counter required by a metric was missing from a snapshot
	#[error("Snapshot {index} is missing counter `{component}.{counter}`")]
	MissingCounter {
		component: String,
		counter:   String,
		index:     usize,
	},

	/// A cumulative counter decreased between two snapshots
	#[error("Counter `{component}.{counter}` decreased at snapshot {index}")]
	CounterDecreased {
		component: String,
		counter:   String,
		index:     usize,
	},

	/// A counter's delta between two snapshots doesn't fit a signed value
	#[error("Counter `{component}.{counter}` overflowed at snapshot {index}")]
	CounterOverflow {
		component: String,
		counter:   String,
		index:     usize,
	},

	/// An array didn't have the expected length
	#[error("{what} has {found} elements, expected {expected}")]
	ShapeMismatch {
		what:     String,
		expected: usize,
		found:    usize,
	},

	/// A derived metric would divide by zero
	#[error("Unable to compute {what}: {divisor} summed to zero")]
	DivideByZero {
		what:    &'static str,
		divisor: &'static str,
	},

	/// The trace had no snapshots, not even the baseline
	#[error("Trace has no snapshots")]
	EmptyTrace,

	/// A cache name wasn't present in the config
	#[error("Unknown cache `{0}`")]
	UnknownCache(String),

	/// A cache name didn't follow the `l<level>...` naming
	#[error("Cache name `{0}` doesn't start with `l<level>`")]
	InvalidCacheName(String),

	/// A cache was configured with zero instances
	#[error("Cache `{0}` has no instances")]
	NoCacheInstances(String),

	/// The config didn't have exactly one core group
	#[error("Expected exactly 1 core group, found {0}")]
	UnsupportedCoreGroups(usize),

	/// A characteristic code wasn't recognized
	#[error("{0} characteristic is not supported!")]
	UnsupportedCharacteristic(String),

	/// A characteristic needed an argument that wasn't given
	#[error("The {characteristic} characteristic requires the {argument} argument")]
	MissingArgument {
		characteristic: String,
		argument:       &'static str,
	},
}
