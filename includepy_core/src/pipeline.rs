use crate::IncludePy;
use crate::IncludePyResult;

/// Priority `includepy` registers with by default. Stages that escape `<` and
/// `>` into entities must run after it, so they need a lower value.
pub const DEFAULT_PRIORITY: i32 = 100;

/// The name `includepy` registers under.
pub const PREPROCESSOR_NAME: &str = "includepy";

/// A stage that rewrites the lines of a document before it is rendered.
pub trait Preprocessor {
	fn run(&self, lines: Vec<String>) -> IncludePyResult<Vec<String>>;

	/// Process a whole document held as a string. Lines are split on `\n`,
	/// so a trailing newline is preserved.
	fn run_text(&self, text: &str) -> IncludePyResult<String> {
		let lines = text.split('\n').map(str::to_string).collect();
		Ok(self.run(lines)?.join("\n"))
	}
}

impl Preprocessor for IncludePy {
	fn run(&self, lines: Vec<String>) -> IncludePyResult<Vec<String>> {
		IncludePy::run(self, &lines)
	}
}

struct Registration {
	name: String,
	priority: i32,
	preprocessor: Box<dyn Preprocessor>,
}

/// An ordered set of named preprocessors. Higher priorities run first and
/// equal priorities run in registration order.
#[derive(Default)]
pub struct Pipeline {
	stages: Vec<Registration>,
}

impl std::fmt::Debug for Pipeline {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list()
			.entries(self.stages.iter().map(|s| (&s.name, s.priority)))
			.finish()
	}
}

impl Pipeline {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `preprocessor` as `name`. An existing stage with the same name
	/// is replaced.
	pub fn register(
		&mut self,
		preprocessor: impl Preprocessor + 'static,
		name: impl Into<String>,
		priority: i32,
	) -> &mut Self {
		let name = name.into();
		self.deregister(&name);

		// Insert after every stage with a priority at least as high so that
		// ties keep registration order.
		let index = self
			.stages
			.iter()
			.position(|stage| stage.priority < priority)
			.unwrap_or(self.stages.len());

		self.stages.insert(
			index,
			Registration {
				name,
				priority,
				preprocessor: Box::new(preprocessor),
			},
		);

		self
	}

	/// Remove the stage registered as `name`. Returns whether a stage was
	/// removed.
	pub fn deregister(&mut self, name: &str) -> bool {
		let before = self.stages.len();
		self.stages.retain(|stage| stage.name != name);
		self.stages.len() != before
	}

	/// Stage names in the order they run.
	pub fn names(&self) -> Vec<&str> {
		self.stages.iter().map(|stage| stage.name.as_str()).collect()
	}

	pub fn is_empty(&self) -> bool {
		self.stages.is_empty()
	}

	/// Run every stage over `lines`, feeding each stage's output to the next.
	pub fn run(&self, lines: Vec<String>) -> IncludePyResult<Vec<String>> {
		let mut lines = lines;

		for stage in &self.stages {
			tracing::debug!(stage = %stage.name, priority = stage.priority, "running preprocessor");
			lines = stage.preprocessor.run(lines)?;
		}

		Ok(lines)
	}
}

impl Preprocessor for Pipeline {
	fn run(&self, lines: Vec<String>) -> IncludePyResult<Vec<String>> {
		Pipeline::run(self, lines)
	}
}

/// Closures over line lists can be registered directly.
impl<F> Preprocessor for F
where
	F: Fn(Vec<String>) -> IncludePyResult<Vec<String>>,
{
	fn run(&self, lines: Vec<String>) -> IncludePyResult<Vec<String>> {
		self(lines)
	}
}
