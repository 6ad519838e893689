use std::sync::LazyLock;

use regex::Regex;

/// The character that escapes a directive so it is shown rather than executed.
pub const ESCAPE_CHAR: char = ';';

/// The option name that opens a new block and names the source file.
pub const BLOCK_START: &str = "includepy";

/// Groups: indentation, escaping, option name, option value.
static RE_OPTION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^([ \t]*)(;*)-->([a-zA-Z0-9_-]+)<--[ \t]*(\S+)[ \t]*$")
		.unwrap_or_else(|e| panic!("invalid directive pattern: {e}"))
});

/// A single directive line such as `  ;-->pyobject<-- factorial`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMarker<'a> {
	/// Leading spaces and tabs.
	pub indent: &'a str,
	/// Number of leading escape characters. Zero means the directive is
	/// active.
	pub escape_depth: usize,
	/// The option name between `-->` and `<--`.
	pub name: &'a str,
	/// The option value, with surrounding whitespace removed.
	pub value: &'a str,
}

impl<'a> DirectiveMarker<'a> {
	/// Match a line against the directive grammar. Lines that don't match are
	/// inert and return `None`.
	pub fn parse(line: &'a str) -> Option<Self> {
		let captures = RE_OPTION.captures(line)?;
		let group = |index: usize| captures.get(index).map_or("", |m| m.as_str());

		Some(Self {
			indent: group(1),
			escape_depth: group(2).len(),
			name: group(3),
			value: group(4),
		})
	}

	pub fn is_escaped(&self) -> bool {
		self.escape_depth > 0
	}

	pub fn is_block_start(&self) -> bool {
		self.name == BLOCK_START
	}
}

/// Strip one level of escaping from a line that matched as an escaped
/// directive. Only the first escape character is removed.
pub fn unescape_line(line: &str) -> String {
	line.replacen(ESCAPE_CHAR, "", 1)
}
