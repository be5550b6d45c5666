//! zsim interval statistics (`zsim-stats`)
//!
//! Reduces zsim's interval-sampled counter traces into per-mode totals,
//! derived characteristics and Sniper results.

// Modules
pub mod aggregate;
pub mod characteristic;
pub mod config;
pub mod derived;
mod error;
pub mod metrics;
pub mod modes;
pub mod sniper;
pub mod stat_dir;
pub mod trace;
pub mod value;

// Exports
pub use self::{
	aggregate::{aggregate, Aggregator},
	characteristic::{Characteristic, Number},
	config::Config,
	error::Error,
	metrics::Metric,
	modes::OpModes,
	sniper::SniperResults,
	stat_dir::StatDir,
	trace::Trace,
	value::Value,
};
