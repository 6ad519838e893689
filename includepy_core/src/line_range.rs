use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::IncludePyError;
use crate::IncludePyResult;

/// Matches any of `n`, `-n`, `n-` or `n-p`.
static RE_LINE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:([0-9]+)|-([0-9]+)|([0-9]+)-|([0-9]+)-([0-9]+))$")
		.unwrap_or_else(|e| panic!("invalid line range pattern: {e}"))
});

/// One token of an `only_lines` value. Line numbers are 1-indexed and
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRange {
	/// `n`: a single line.
	Exact(usize),
	/// `-n`: every line from the first up to `n`.
	UpTo(usize),
	/// `n-`: every line from `n` to the end.
	From(usize),
	/// `n-p`: every line from `n` up to `p`.
	Between(usize, usize),
}

impl FromStr for LineRange {
	type Err = IncludePyError;

	fn from_str(token: &str) -> Result<Self, Self::Err> {
		let invalid = || IncludePyError::InvalidOnlyLines(token.to_string());
		let captures = RE_LINE_RANGE.captures(token).ok_or_else(invalid)?;
		let number = |index: usize| -> IncludePyResult<Option<usize>> {
			captures
				.get(index)
				.map(|m| m.as_str().parse::<usize>().map_err(|_| invalid()))
				.transpose()
		};

		let range = match (number(1)?, number(2)?, number(3)?, number(4)?, number(5)?) {
			(Some(line), ..) => Self::Exact(line),
			(_, Some(end), ..) => Self::UpTo(end),
			(_, _, Some(start), ..) => Self::From(start),
			(.., Some(start), Some(end)) => Self::Between(start, end),
			_ => return Err(invalid()),
		};

		Ok(range)
	}
}

impl LineRange {
	/// Resolve the token against `count` lines, returning a 0-indexed
	/// half-open range. A start beyond the available lines is an error while
	/// an end beyond them is clamped.
	fn resolve(self, count: usize) -> Option<std::ops::Range<usize>> {
		let (start, end) = match self {
			Self::Exact(line) => (line, line),
			Self::UpTo(end) => (1, end.min(count)),
			Self::From(start) => (start, count),
			Self::Between(start, end) => (start, end.min(count)),
		};

		if start == 0 || start > count || end == 0 || start > end {
			return None;
		}

		Some(start - 1..end)
	}
}

/// Parse a comma-separated `only_lines` value into its tokens, preserving
/// their order.
pub fn parse_line_ranges(spec: &str) -> IncludePyResult<Vec<LineRange>> {
	spec.split(',').map(str::parse).collect()
}

/// Return only the lines named by `spec`. Tokens are applied in the order
/// given and overlapping tokens repeat lines. An empty `spec` keeps every
/// line.
pub fn select_lines<S: AsRef<str>>(lines: &[S], spec: &str) -> IncludePyResult<Vec<String>> {
	if spec.is_empty() {
		return Ok(lines.iter().map(|line| line.as_ref().to_string()).collect());
	}

	let mut selected = Vec::new();

	for (token, range) in spec.split(',').zip(parse_line_ranges(spec)?) {
		let indices = range
			.resolve(lines.len())
			.ok_or_else(|| IncludePyError::InvalidOnlyLines(token.to_string()))?;
		selected.extend(lines[indices].iter().map(|line| line.as_ref().to_string()));
	}

	Ok(selected)
}
