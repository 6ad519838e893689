use std::path::Path;
use std::path::PathBuf;

use crate::BlockRequest;
use crate::IncludePyResult;
use crate::ResolvedOptions;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::line_range::select_lines;
use crate::python::PythonModule;
use crate::symbol::LineSpan;
use crate::symbol::locate_lines;

/// Turns a closed [`BlockRequest`] into the lines of code it refers to.
#[derive(Debug, Clone)]
pub struct Extractor {
	/// Directory that relative source paths are resolved against.
	pub base_dir: PathBuf,
	/// Source files larger than this are rejected.
	pub max_file_size: u64,
}

impl Default for Extractor {
	fn default() -> Self {
		Self {
			base_dir: PathBuf::new(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}

impl Extractor {
	pub fn new(base_dir: impl Into<PathBuf>) -> Self {
		Self {
			base_dir: base_dir.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
		self.max_file_size = max_file_size;
		self
	}

	/// Resolve a source path named in a document. Absolute paths are used as
	/// they are.
	pub fn resolve_path(&self, path: &Path) -> PathBuf {
		if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_dir.join(path)
		}
	}

	/// Read the block's source file and return the finished lines to insert
	/// into the document.
	pub fn extract(&self, request: &BlockRequest) -> IncludePyResult<Vec<String>> {
		let options = request.resolve()?;
		let path = self.resolve_path(&request.source_path);
		let module = PythonModule::read(&path, self.max_file_size)?;
		let span = locate_lines(options.pyobject.as_deref(), module.root())?;

		tracing::debug!(
			path = %path.display(),
			object = options.pyobject.as_deref().unwrap_or_default(),
			start = span.start,
			end = span.end,
			"extracting python object"
		);

		snippet_lines(&module.lines(), span, &options, &request.indent)
	}
}

/// Cut the lines of `span` (widened by `lines_before` and `lines_after`) out
/// of `source_lines`, dedent them, apply `only_lines`, and re-indent them with
/// `indent` plus `extra_indent` spaces.
pub fn snippet_lines<S: AsRef<str>>(
	source_lines: &[S],
	span: LineSpan,
	options: &ResolvedOptions,
	indent: &str,
) -> IncludePyResult<Vec<String>> {
	let start = span
		.start
		.saturating_sub(1)
		.saturating_sub(options.lines_before);
	let end = span
		.end
		.saturating_add(options.lines_after)
		.min(source_lines.len());
	let mut window = String::new();
	for line in source_lines.get(start..end).unwrap_or_default() {
		window.push_str(line.as_ref());
	}

	let dedented = dedent(&window);
	let mut lines: Vec<&str> = dedented.split('\n').collect();
	if lines.last() == Some(&"") {
		lines.pop();
	}

	let lines = if options.only_lines.is_empty() {
		lines.into_iter().map(str::to_string).collect()
	} else {
		select_lines(&lines, &options.only_lines)?
	};

	let prefix = format!("{indent}{}", " ".repeat(options.extra_indent));

	Ok(lines
		.into_iter()
		.map(|line| format!("{prefix}{line}").trim_end().to_string())
		.collect())
}

fn is_blank(line: &str) -> bool {
	line.trim_end_matches('\n')
		.chars()
		.all(|c| c == ' ' || c == '\t')
}

fn leading_whitespace(line: &str) -> &str {
	let rest = line.trim_start_matches([' ', '\t']);
	&line[..line.len() - rest.len()]
}

/// Remove the longest run of leading spaces and tabs shared by every
/// non-blank line. Blank lines are reduced to their line terminator.
pub fn dedent(text: &str) -> String {
	let mut margin: Option<&str> = None;

	for line in text.split('\n').filter(|line| !is_blank(line)) {
		let indent = leading_whitespace(line);
		margin = Some(match margin {
			None => indent,
			Some(current) => {
				let shared = current
					.bytes()
					.zip(indent.bytes())
					.take_while(|(a, b)| a == b)
					.count();
				&current[..shared]
			}
		});
	}

	let margin = margin.unwrap_or_default();

	text.split_inclusive('\n')
		.map(|line| {
			if is_blank(line) {
				if line.ends_with('\n') { "\n" } else { "" }
			} else {
				line.strip_prefix(margin).unwrap_or(line)
			}
		})
		.collect()
}
