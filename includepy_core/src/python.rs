use std::path::Path;

use tree_sitter::Language;
use tree_sitter::Node;
use tree_sitter::Parser;
use tree_sitter::Point;

use crate::IncludePyError;
use crate::IncludePyResult;
use crate::project::normalize_line_endings;
use crate::symbol::LineSpan;
use crate::symbol::SyntaxNode;

/// The kind of a named definition found in python source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
	Module,
	Function,
	Class,
}

/// An owned tree of the definitions in a python module.
///
/// Only functions and classes are kept. Decorated definitions are recorded
/// with the span of the `def` or `class` statement itself, without the
/// decorator lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
	pub kind: DefinitionKind,
	pub name: Option<String>,
	pub lines: Option<LineSpan>,
	pub children: Vec<Definition>,
}

impl Definition {
	pub fn function(name: &str, lines: LineSpan, children: Vec<Definition>) -> Self {
		Self {
			kind: DefinitionKind::Function,
			name: Some(name.to_string()),
			lines: Some(lines),
			children,
		}
	}

	pub fn class(name: &str, lines: LineSpan, children: Vec<Definition>) -> Self {
		Self {
			kind: DefinitionKind::Class,
			name: Some(name.to_string()),
			lines: Some(lines),
			children,
		}
	}

	pub fn module(children: Vec<Definition>) -> Self {
		Self {
			kind: DefinitionKind::Module,
			name: None,
			lines: None,
			children,
		}
	}
}

impl SyntaxNode for Definition {
	fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	fn line_span(&self) -> Option<LineSpan> {
		self.lines
	}

	fn children(&self) -> &[Self] {
		&self.children
	}
}

/// A python source file together with its definition tree.
#[derive(Debug, Clone)]
pub struct PythonModule {
	source: String,
	root: Definition,
}

impl PythonModule {
	/// Read and parse a python file, refusing files larger than `max_size`
	/// bytes.
	pub fn read(path: &Path, max_size: u64) -> IncludePyResult<Self> {
		let label = path.display().to_string();
		let metadata = std::fs::metadata(path).map_err(|e| IncludePyError::io(&label, e))?;

		if metadata.len() > max_size {
			return Err(IncludePyError::FileTooLarge {
				path: label,
				size: metadata.len(),
				limit: max_size,
			});
		}

		let source = std::fs::read_to_string(path).map_err(|e| IncludePyError::io(&label, e))?;
		tracing::debug!(path = %label, bytes = source.len(), "read python source");

		Self::parse_labelled(source, &label)
	}

	/// Parse python source held in memory.
	pub fn parse(source: impl Into<String>) -> IncludePyResult<Self> {
		Self::parse_labelled(source.into(), "<memory>")
	}

	/// Line endings are normalized to `\n` before parsing so that line
	/// numbers and dedenting agree for CRLF sources.
	fn parse_labelled(source: String, label: &str) -> IncludePyResult<Self> {
		let source = normalize_line_endings(&source);
		let language: Language = tree_sitter_python::LANGUAGE.into();
		let mut parser = Parser::new();
		parser
			.set_language(&language)
			.map_err(|e| IncludePyError::PythonParse(format!("{label}: {e}")))?;

		let tree = parser
			.parse(&source, None)
			.ok_or_else(|| IncludePyError::PythonParse(label.to_string()))?;

		let root_node = tree.root_node();
		if root_node.has_error() {
			return Err(IncludePyError::PythonParse(label.to_string()));
		}

		let children = collect_definitions(root_node, source.as_bytes());
		let root = Definition::module(children);

		Ok(Self { source, root })
	}

	pub fn root(&self) -> &Definition {
		&self.root
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	/// The source split into lines, keeping each line's terminator.
	pub fn lines(&self) -> Vec<&str> {
		self.source.split_inclusive('\n').collect()
	}
}

/// Collect the definitions that are immediate statements of `node` (a module
/// or a `block`).
fn collect_definitions(node: Node<'_>, source: &[u8]) -> Vec<Definition> {
	let mut cursor = node.walk();
	let definitions: Vec<Definition> = node
		.named_children(&mut cursor)
		.filter_map(|child| definition_from_node(child, source))
		.collect();

	definitions
}

fn definition_from_node(node: Node<'_>, source: &[u8]) -> Option<Definition> {
	let kind = match node.kind() {
		"function_definition" => DefinitionKind::Function,
		"class_definition" => DefinitionKind::Class,
		"decorated_definition" => {
			return node
				.child_by_field_name("definition")
				.and_then(|definition| definition_from_node(definition, source));
		}
		_ => return None,
	};

	let name = node
		.child_by_field_name("name")
		.and_then(|name| name.utf8_text(source).ok())
		.map(str::to_string);

	let children = node
		.child_by_field_name("body")
		.map(|body| collect_definitions(body, source))
		.unwrap_or_default();

	Some(Definition {
		kind,
		name,
		lines: Some(line_span(node)),
		children,
	})
}

/// Convert a node's 0-indexed positions to a 1-indexed inclusive span. The
/// span ends at the last statement of the definition, so comments trailing
/// the body are not part of it.
fn line_span(node: Node<'_>) -> LineSpan {
	let start = node.start_position();
	let end = last_code_position(node);
	let end_line = if end.column == 0 && end.row > start.row {
		end.row
	} else {
		end.row + 1
	};

	LineSpan::new(start.row + 1, end_line)
}

/// Node kinds whose last child may be a block that absorbed trailing
/// comments.
fn is_compound(kind: &str) -> bool {
	matches!(
		kind,
		"block"
			| "function_definition"
			| "class_definition"
			| "decorated_definition"
			| "if_statement"
			| "for_statement"
			| "while_statement"
			| "try_statement"
			| "with_statement"
			| "match_statement"
	) || kind.ends_with("_clause")
}

/// The end of the last piece of code inside `node`, skipping trailing
/// comments.
fn last_code_position(node: Node<'_>) -> Point {
	if !is_compound(node.kind()) {
		return node.end_position();
	}

	let mut cursor = node.walk();
	let last = node
		.named_children(&mut cursor)
		.filter(|child| child.kind() != "comment")
		.last();

	match last {
		Some(child) => last_code_position(child),
		None => node.end_position(),
	}
}
