use crate::IncludePyError;
use crate::IncludePyResult;

/// An inclusive, 1-indexed span of source lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
	pub start: usize,
	pub end: usize,
}

impl LineSpan {
	pub fn new(start: usize, end: usize) -> Self {
		Self { start, end }
	}
}

/// A node of a parsed source file that can be searched by name.
///
/// Only what the locator needs is exposed: the node's own name and line span,
/// and its immediate children.
pub trait SyntaxNode {
	/// The declared name, for definitions such as functions and classes.
	fn name(&self) -> Option<&str>;

	/// The line span of the node, when the tree recorded one.
	fn line_span(&self) -> Option<LineSpan>;

	/// The immediate children of this node, in source order.
	fn children(&self) -> &[Self]
	where
		Self: Sized;
}

/// Find a named definition by a dotted path such as `Outer.inner`.
///
/// Every segment must match exactly one immediate child of the node reached
/// so far.
pub fn find_object<'a, N: SyntaxNode>(name: Option<&str>, root: &'a N) -> IncludePyResult<&'a N> {
	let Some(name) = name else {
		return Err(IncludePyError::MissingObject);
	};

	let parts: Vec<&str> = name.split('.').collect();
	let mut node = root;

	for (index, part) in parts.iter().enumerate() {
		let matches: Vec<&N> = node
			.children()
			.iter()
			.filter(|child| child.name() == Some(*part))
			.collect();

		let [found] = matches.as_slice() else {
			return Err(IncludePyError::SymbolMatches {
				count: matches.len(),
				path: parts[..=index].join("."),
			});
		};

		node = *found;
	}

	tracing::trace!(object = name, "located python object");

	Ok(node)
}

/// Locate `name` and return its line span, failing when the node carries no
/// line information.
pub fn locate_lines<N: SyntaxNode>(name: Option<&str>, root: &N) -> IncludePyResult<LineSpan> {
	let node = find_object(name, root)?;

	node.line_span().ok_or_else(|| {
		IncludePyError::MissingLineNumbers(name.unwrap_or_default().to_string())
	})
}
