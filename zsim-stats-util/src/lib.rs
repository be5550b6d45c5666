//! Utilities

// Modules
pub mod logger;

/// Extension trait for `Vec<T>` to right-pad it to a fixed length
#[extend::ext(name = PadToLen)]
pub impl<T: Default + Clone> Vec<T> {
	/// Right-pads this vector with `T::default()` until it has `len` elements.
	///
	/// Returns `Err` with the untouched vector if it is already longer than `len`.
	fn pad_to(mut self, len: usize) -> Result<Vec<T>, Vec<T>> {
		if self.len() > len {
			return Err(self);
		}

		self.resize(len, T::default());
		Ok(self)
	}
}
