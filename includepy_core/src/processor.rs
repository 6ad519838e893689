use crate::BlockRequest;
use crate::DirectiveMarker;
use crate::IncludePyError;
use crate::IncludePyResult;
use crate::extract::Extractor;
use crate::marker::unescape_line;

/// The state of the line-by-line directive parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorState {
	/// Copy lines through, watching for a block-start directive.
	Echo,
	/// Collect option lines for an open block.
	Collecting(BlockRequest),
}

impl ProcessorState {
	/// Feed one line (or `None` at the end of the document) and return the
	/// next state. Finished lines are appended to `output`.
	pub fn advance(
		self,
		line: Option<&str>,
		extractor: &Extractor,
		output: &mut Vec<String>,
	) -> IncludePyResult<Self> {
		match self {
			Self::Echo => echo(line, output),
			Self::Collecting(request) => collect(request, line, extractor, output),
		}
	}
}

fn echo(line: Option<&str>, output: &mut Vec<String>) -> IncludePyResult<ProcessorState> {
	let Some(line) = line else {
		return Ok(ProcessorState::Echo);
	};

	let Some(marker) = DirectiveMarker::parse(line) else {
		output.push(line.to_string());
		return Ok(ProcessorState::Echo);
	};

	if marker.is_escaped() {
		output.push(unescape_line(line));
		return Ok(ProcessorState::Echo);
	}

	start_block(&marker).map(ProcessorState::Collecting)
}

fn collect(
	mut request: BlockRequest,
	line: Option<&str>,
	extractor: &Extractor,
	output: &mut Vec<String>,
) -> IncludePyResult<ProcessorState> {
	let marker = line.and_then(DirectiveMarker::parse);

	match marker {
		Some(marker) if !marker.is_escaped() => {
			if marker.is_block_start() {
				output.extend(extractor.extract(&request)?);
				return start_block(&marker).map(ProcessorState::Collecting);
			}

			tracing::trace!(option = marker.name, value = marker.value, "block option");
			request.add_option(marker.name, marker.value)?;
			Ok(ProcessorState::Collecting(request))
		}
		_ => {
			output.extend(extractor.extract(&request)?);
			echo(line, output)
		}
	}
}

fn start_block(marker: &DirectiveMarker<'_>) -> IncludePyResult<BlockRequest> {
	if marker.is_escaped() {
		return Err(IncludePyError::EscapedBlockStart);
	}

	if !marker.is_block_start() {
		return Err(IncludePyError::UnexpectedOption(marker.name.to_string()));
	}

	tracing::debug!(path = marker.value, indent = marker.indent.len(), "opening block");

	Ok(BlockRequest::new(marker.value, marker.indent))
}

/// The includepy preprocessor: replaces directive blocks in a document with
/// the python code they name.
#[derive(Debug, Clone, Default)]
pub struct IncludePy {
	extractor: Extractor,
}

impl IncludePy {
	pub fn new(extractor: Extractor) -> Self {
		Self { extractor }
	}

	pub fn extractor(&self) -> &Extractor {
		&self.extractor
	}

	/// Process every line of one document and return the resulting lines.
	/// The first failing directive aborts the whole document.
	pub fn run<S: AsRef<str>>(&self, lines: &[S]) -> IncludePyResult<Vec<String>> {
		let mut output = Vec::with_capacity(lines.len());
		let mut state = ProcessorState::Echo;

		for line in lines {
			state = state.advance(Some(line.as_ref()), &self.extractor, &mut output)?;
		}
		state.advance(None, &self.extractor, &mut output)?;

		Ok(output)
	}
}
