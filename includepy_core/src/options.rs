use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::IncludePyError;
use crate::IncludePyResult;

/// The closed set of options accepted inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
	/// Dotted path of the Python object to include. Mandatory.
	PyObject,
	/// Extra source lines to include before the object.
	LinesBefore,
	/// Extra source lines to include after the object.
	LinesAfter,
	/// Extra spaces added in front of every included line.
	ExtraIndent,
	/// Line ranges to keep from the extracted code.
	OnlyLines,
}

impl OptionName {
	pub const ALL: [OptionName; 5] = [
		Self::PyObject,
		Self::LinesBefore,
		Self::LinesAfter,
		Self::ExtraIndent,
		Self::OnlyLines,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::PyObject => "pyobject",
			Self::LinesBefore => "lines_before",
			Self::LinesAfter => "lines_after",
			Self::ExtraIndent => "extra_indent",
			Self::OnlyLines => "only_lines",
		}
	}

	/// The value used when a block doesn't set this option. `pyobject` has
	/// no default.
	pub fn default_value(self) -> Option<&'static str> {
		match self {
			Self::PyObject => None,
			Self::LinesBefore | Self::LinesAfter | Self::ExtraIndent => Some("0"),
			Self::OnlyLines => Some(""),
		}
	}
}

impl FromStr for OptionName {
	type Err = IncludePyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|name| name.as_str() == s)
			.ok_or_else(|| IncludePyError::InvalidOption(s.to_string()))
	}
}

impl Display for OptionName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An open `includepy` block collecting its option lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRequest {
	/// The Python source file named by the block-start line.
	pub source_path: PathBuf,
	/// Indentation of the block-start line, applied to every emitted line.
	pub indent: String,
	/// Options set so far. Keys are unique.
	pub options: HashMap<OptionName, String>,
}

impl BlockRequest {
	pub fn new(source_path: impl Into<PathBuf>, indent: impl Into<String>) -> Self {
		Self {
			source_path: source_path.into(),
			indent: indent.into(),
			options: HashMap::new(),
		}
	}

	/// Record an option line. A repeated option is rejected before its name
	/// is validated.
	pub fn add_option(&mut self, name: &str, value: &str) -> IncludePyResult<()> {
		if self.options.keys().any(|key| key.as_str() == name) {
			return Err(IncludePyError::DuplicateOption(name.to_string()));
		}

		let option: OptionName = name.parse()?;
		self.options.insert(option, value.to_string());

		Ok(())
	}

	/// Merge the block's options over the defaults and validate them.
	pub fn resolve(&self) -> IncludePyResult<ResolvedOptions> {
		let value_of = |name: OptionName| -> Option<&str> {
			self.options
				.get(&name)
				.map(String::as_str)
				.or_else(|| name.default_value())
		};

		Ok(ResolvedOptions {
			pyobject: value_of(OptionName::PyObject).map(str::to_string),
			lines_before: parse_count(OptionName::LinesBefore, value_of(OptionName::LinesBefore))?,
			lines_after: parse_count(OptionName::LinesAfter, value_of(OptionName::LinesAfter))?,
			extra_indent: parse_count(OptionName::ExtraIndent, value_of(OptionName::ExtraIndent))?,
			only_lines: value_of(OptionName::OnlyLines)
				.unwrap_or_default()
				.to_string(),
		})
	}
}

/// Block options after defaults have been applied and numeric values checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
	/// `None` when the block never named an object. The extractor reports
	/// this as an error before searching.
	pub pyobject: Option<String>,
	pub lines_before: usize,
	pub lines_after: usize,
	pub extra_indent: usize,
	pub only_lines: String,
}

fn parse_count(option: OptionName, value: Option<&str>) -> IncludePyResult<usize> {
	let value = value.unwrap_or("0");
	let parsed: i64 = value
		.trim()
		.parse()
		.map_err(|_| IncludePyError::InvalidInteger {
			option: option.to_string(),
			value: value.to_string(),
		})?;

	usize::try_from(parsed).map_err(|_| IncludePyError::NegativeInteger(option.to_string()))
}
