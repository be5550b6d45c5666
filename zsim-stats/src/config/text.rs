//! Config text conversion
//!
//! zsim dumps its effective configuration (`out.cfg`) in `libconfig` syntax.
//! This module rewrites it into JSON so it can be parsed with `serde_json`.
//! The rewrite is purely textual and knows nothing about the config's contents.

// Imports
use {regex::Regex, std::sync::LazyLock};

/// `key = value`
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(" = ").expect("Assignment regex is valid"));

/// Statement terminator at the end of a line
static TERMINATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(";\n").expect("Terminator regex is valid"));

/// Separator right before a closing brace
static TRAILING_SEPARATOR: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r",\n(\s*)\}").expect("Trailing separator regex is valid"));

/// Bare key before a `:`
static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\S+) : ").expect("Bare key regex is valid"));

/// `L` suffix on integer literals
static LONG_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)L").expect("Long suffix regex is valid"));

/// Rewrites `libconfig` text into JSON
pub fn to_json(cfg: &str) -> String {
	let json = format!("{{\n{cfg}}}");
	let json = ASSIGNMENT.replace_all(&json, " : ");
	let json = TERMINATOR.replace_all(&json, ",\n");
	let json = TRAILING_SEPARATOR.replace_all(&json, "\n${1}}");
	let json = BARE_KEY.replace_all(&json, "\"${1}\" : ");
	let json = LONG_SUFFIX.replace_all(&json, "${1}");

	json.into_owned()
}
