//! Metric values

// Imports
use {
	crate::Error,
	itertools::Itertools,
	std::fmt,
	zsim_stats_util::PadToLen,
};

/// Shape of a metric's value
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Shape {
	/// A single value
	Scalar,

	/// One value per component instance
	Array(usize),
}

/// Metric value.
///
/// Deltas of cumulative counters are never negative, but some metrics
/// are differences of several counters, so values are signed.
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize)]
#[serde(untagged)]
pub enum Value {
	/// A single value
	Scalar(i64),

	/// One value per component instance
	Array(Vec<i64>),
}

impl Value {
	/// Returns the zero value of `shape`
	pub fn zero(shape: Shape) -> Self {
		match shape {
			Shape::Scalar => Self::Scalar(0),
			Shape::Array(len) => Self::Array(vec![0; len]),
		}
	}

	/// Returns this value's shape
	pub fn shape(&self) -> Shape {
		match self {
			Self::Scalar(_) => Shape::Scalar,
			Self::Array(values) => Shape::Array(values.len()),
		}
	}

	/// Returns the sum of all elements
	pub fn total(&self) -> i64 {
		match self {
			Self::Scalar(value) => *value,
			Self::Array(values) => values.iter().sum(),
		}
	}

	/// Adds `other` to this value, element-wise
	pub fn add_assign(&mut self, other: &Self) -> Result<(), Error> {
		self.zip_assign(other, |lhs, rhs| lhs + rhs)
	}

	/// Subtracts `other` from this value, element-wise
	pub fn sub_assign(&mut self, other: &Self) -> Result<(), Error> {
		self.zip_assign(other, |lhs, rhs| lhs - rhs)
	}

	/// Returns the sum of `self` and `other`, element-wise
	pub fn with_added(mut self, other: &Self) -> Result<Self, Error> {
		self.add_assign(other)?;
		Ok(self)
	}

	/// Applies `f` element-wise to this value and `other`
	fn zip_assign(&mut self, other: &Self, f: impl Fn(i64, i64) -> i64) -> Result<(), Error> {
		match (self, other) {
			(Self::Scalar(lhs), Self::Scalar(rhs)) => *lhs = f(*lhs, *rhs),
			(Self::Array(lhs), Self::Array(rhs)) if lhs.len() == rhs.len() => lhs
				.iter_mut()
				.zip_eq(rhs)
				.for_each(|(lhs, &rhs)| *lhs = f(*lhs, rhs)),
			(lhs, rhs) => {
				return Err(Error::ShapeMismatch {
					what:     "Element-wise operand".to_owned(),
					expected: lhs.shape().len(),
					found:    rhs.shape().len(),
				})
			},
		}

		Ok(())
	}

	/// Returns this value's elements
	pub fn into_vec(self) -> Vec<i64> {
		match self {
			Self::Scalar(value) => vec![value],
			Self::Array(values) => values,
		}
	}

	/// Returns this value as `len` elements.
	///
	/// Scalars become a single element, arrays shorter than `len` are right-padded with zeros.
	///
	/// # Errors
	/// Returns an error if the array is longer than `len`.
	pub fn padded(self, len: usize, what: &str) -> Result<Vec<i64>, Error> {
		self.into_vec().pad_to(len).map_err(|values| Error::ShapeMismatch {
			what: what.to_owned(),
			expected: len,
			found: values.len(),
		})
	}
}

impl Shape {
	/// Returns the number of elements of this shape
	pub fn len(self) -> usize {
		match self {
			Self::Scalar => 1,
			Self::Array(len) => len,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Scalar(value) => write!(f, "{value}"),
			Self::Array(values) => write!(f, "[{}]", values.iter().join(", ")),
		}
	}
}
