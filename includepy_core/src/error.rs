use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum IncludePyError {
	#[error("failed to read `{path}`: {source}")]
	#[diagnostic(code(includepy::io_error))]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("No Python object specified")]
	#[diagnostic(
		code(includepy::missing_pyobject),
		help("add a `-->pyobject<-- name` line after the `-->includepy<--` line")
	)]
	MissingObject,

	#[error("Found {count} matches for {path}")]
	#[diagnostic(
		code(includepy::symbol_matches),
		help("the dotted name must resolve to exactly one function or class at each level")
	)]
	SymbolMatches { count: usize, path: String },

	#[error("Invalid option {0}")]
	#[diagnostic(
		code(includepy::invalid_option),
		help("valid options: pyobject, lines_before, lines_after, extra_indent, only_lines")
	)]
	InvalidOption(String),

	#[error("Duplicate option {0}")]
	#[diagnostic(
		code(includepy::duplicate_option),
		help("each option may appear at most once per block")
	)]
	DuplicateOption(String),

	#[error("Expected 'includepy' but found '{0}'")]
	#[diagnostic(
		code(includepy::unexpected_option),
		help("every block must start with a `-->includepy<-- path/to/file.py` line")
	)]
	UnexpectedOption(String),

	#[error("Should not parse an escaped line")]
	#[diagnostic(code(includepy::escaped_block_start))]
	EscapedBlockStart,

	#[error("{option} must be a valid integer")]
	#[diagnostic(code(includepy::invalid_integer))]
	InvalidInteger { option: String, value: String },

	#[error("{0} cannot be negative")]
	#[diagnostic(code(includepy::negative_integer))]
	NegativeInteger(String),

	#[error("Invalid only_lines: {0}")]
	#[diagnostic(
		code(includepy::invalid_only_lines),
		help("use comma-separated line ranges such as `1`, `2-`, `-3` or `2-4`")
	)]
	InvalidOnlyLines(String),

	#[error("No line number in syntax tree for {0}")]
	#[diagnostic(code(includepy::missing_line_numbers))]
	MissingLineNumbers(String),

	#[error("failed to parse python source `{0}`")]
	#[diagnostic(code(includepy::python_parse))]
	PythonParse(String),

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(includepy::file_too_large),
		help("increase `max_file_size` in includepy.toml")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(includepy::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(includepy::config_parse),
		help("check that includepy.toml is valid TOML")
	)]
	ConfigParse(String),
}

impl IncludePyError {
	pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}
}

pub type IncludePyResult<T> = Result<T, IncludePyError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
