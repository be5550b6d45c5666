//! Derived metrics
//!
//! Everything here works on already summed totals, never on per-interval values.

// Imports
use crate::{value::Value, Error};

/// Instructions per cycle
pub fn ipc(instructions: i64, cycles: i64) -> Result<f64, Error> {
	if cycles == 0 {
		return Err(Error::DivideByZero {
			what:    "IPC",
			divisor: "cycles",
		});
	}

	Ok(instructions as f64 / cycles as f64)
}

/// `count` per kilo-instruction
pub fn per_kilo_instruction(count: i64, instructions: i64) -> Result<f64, Error> {
	if instructions == 0 {
		return Err(Error::DivideByZero {
			what:    "per kilo-instruction rate",
			divisor: "instructions",
		});
	}

	Ok(count as f64 * 1000.0 / instructions as f64)
}

/// Summed micro-ops, by category
#[derive(Clone, Debug)]
pub struct UopTotals {
	pub total:      Value,
	pub loads:      Value,
	pub stores:     Value,
	pub branches:   Value,
	pub fp_add_sub: Value,
	pub fp_mul_div: Value,
}

impl UopTotals {
	/// Micro-ops that aren't in any other category
	pub fn generic(&self) -> Result<Value, Error> {
		let mut generic = self.total.clone();
		for categorized in [
			&self.loads,
			&self.stores,
			&self.branches,
			&self.fp_add_sub,
			&self.fp_mul_div,
		] {
			generic.sub_assign(categorized)?;
		}

		Ok(generic)
	}
}
