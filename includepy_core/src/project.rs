use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use serde::Serialize;

use crate::IncludePyError;
use crate::IncludePyResult;
use crate::Preprocessor;
use crate::config::CONFIG_FILE_CANDIDATES;
use crate::config::IncludePyConfig;

/// Options for controlling how directories are walked for documents.
///
/// Use [`ScanOptions::default()`] for sensible defaults or
/// [`ScanOptions::from_config`] to construct from an [`IncludePyConfig`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Gitignore-style patterns to exclude from scanning.
	pub exclude_patterns: Vec<String>,
	/// Glob patterns for extra documents beyond the markdown defaults.
	pub include_set: GlobSet,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			exclude_patterns: Vec::new(),
			include_set: GlobSet::empty(),
			disable_gitignore: false,
		}
	}
}

impl ScanOptions {
	pub fn from_config(config: Option<&IncludePyConfig>) -> Self {
		let exclude_patterns = config
			.map(|c| c.exclude.patterns.clone())
			.unwrap_or_default();
		let include_patterns = config.map(|c| &c.include.patterns[..]).unwrap_or_default();
		let disable_gitignore = config.is_some_and(|c| c.disable_gitignore);

		Self {
			exclude_patterns,
			include_set: build_glob_set(include_patterns),
			disable_gitignore,
		}
	}
}

/// A document that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
	/// Path to the document.
	pub file: PathBuf,
	/// The error message of the first failing directive.
	pub message: String,
}

/// Result of processing a set of documents without writing anything.
#[derive(Debug, Default)]
pub struct CheckResult {
	/// Documents that processed cleanly.
	pub passed: Vec<PathBuf>,
	/// Documents whose directives failed.
	pub failures: Vec<DocumentFailure>,
}

impl CheckResult {
	/// Returns true if every document processed without error.
	pub fn is_ok(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Build a `GlobSet` from a list of glob pattern strings. Invalid patterns
/// are skipped.
fn build_glob_set(patterns: &[String]) -> GlobSet {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		if let Ok(glob) = Glob::new(pattern) {
			builder.add(glob);
		}
	}
	builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// Read a document from disk and run it through `preprocessor`.
pub fn render_document<P: Preprocessor + ?Sized>(
	path: &Path,
	preprocessor: &P,
) -> IncludePyResult<String> {
	let raw = std::fs::read_to_string(path)
		.map_err(|e| IncludePyError::io(path.display().to_string(), e))?;
	let content = normalize_line_endings(&raw);

	tracing::debug!(path = %path.display(), "rendering document");

	preprocessor.run_text(&content)
}

/// Process every file in `files`, collecting failures instead of stopping at
/// the first one.
pub fn check_documents<P: Preprocessor + ?Sized>(
	files: &[PathBuf],
	preprocessor: &P,
) -> CheckResult {
	let mut result = CheckResult::default();

	for file in files {
		match render_document(file, preprocessor) {
			Ok(_) => result.passed.push(file.clone()),
			Err(e) => {
				result.failures.push(DocumentFailure {
					file: file.clone(),
					message: e.to_string(),
				});
			}
		}
	}

	result
}

/// Expand the given inputs into a sorted list of documents. Files are kept as
/// they are; directories are walked for markdown documents and files matching
/// the include patterns.
pub fn collect_documents(
	root: &Path,
	inputs: &[PathBuf],
	options: &ScanOptions,
) -> IncludePyResult<Vec<PathBuf>> {
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;

	let mut files = Vec::new();

	for input in inputs {
		if input.is_dir() {
			let mut visited_dirs = HashSet::new();
			let walker = Walker {
				root,
				gitignore: &gitignore,
				custom_exclude: &custom_exclude,
				include_set: &options.include_set,
			};
			walker.walk_dir(input, &mut files, &mut visited_dirs)?;
		} else {
			files.push(input.clone());
		}
	}

	files.sort();
	files.dedup();
	Ok(files)
}

/// Build a `Gitignore` matcher from exclude patterns in `includepy.toml`.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> IncludePyResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			IncludePyError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| IncludePyError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::warn!(
				path = %gitignore_path.display(),
				%error,
				"invalid .gitignore rules were skipped"
			);
		}
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

struct Walker<'a> {
	root: &'a Path,
	gitignore: &'a Gitignore,
	custom_exclude: &'a Gitignore,
	include_set: &'a GlobSet,
}

impl Walker<'_> {
	fn walk_dir(
		&self,
		dir: &Path,
		files: &mut Vec<PathBuf>,
		visited_dirs: &mut HashSet<PathBuf>,
	) -> IncludePyResult<()> {
		// Detect symlink cycles by tracking canonical paths.
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !visited_dirs.insert(canonical) {
			return Err(IncludePyError::SymlinkCycle {
				path: dir.display().to_string(),
			});
		}

		let entries =
			std::fs::read_dir(dir).map_err(|e| IncludePyError::io(dir.display().to_string(), e))?;

		for entry in entries {
			let entry = entry.map_err(|e| IncludePyError::io(dir.display().to_string(), e))?;
			let path = entry.path();

			if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
				if is_ignored_directory_name(name) {
					continue;
				}
			}

			let is_dir = path.is_dir();

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.custom_exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				// A nested config marks a separate project.
				if has_project_config(&path) {
					continue;
				}
				self.walk_dir(&path, files, visited_dirs)?;
			} else if is_document_file(&path) || self.is_included(&path) {
				files.push(path);
			}
		}

		Ok(())
	}

	fn is_included(&self, path: &Path) -> bool {
		path.strip_prefix(self.root)
			.is_ok_and(|rel_path| self.include_set.is_match(rel_path))
	}
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

fn has_project_config(dir: &Path) -> bool {
	CONFIG_FILE_CANDIDATES
		.iter()
		.any(|candidate| dir.join(candidate).is_file())
}

/// Check if a file is a markdown document that may contain directives.
pub fn is_document_file(path: &Path) -> bool {
	let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
		return false;
	};

	matches!(ext, "md" | "mdx" | "markdown")
}
