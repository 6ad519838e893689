use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Extractor;
use crate::IncludePy;
use crate::IncludePyError;
use crate::IncludePyResult;
use crate::pipeline::DEFAULT_PRIORITY;

/// Default maximum python source size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"includepy.toml",
	".includepy.toml",
	".config/includepy.toml",
];

/// Configuration loaded from an `includepy.toml` file.
///
/// ```toml
/// priority = 100
/// base_dir = "src"
/// max_file_size = 10485760
/// disable_gitignore = false
///
/// [exclude]
/// patterns = ["vendor/", "*.generated.md"]
///
/// [include]
/// patterns = ["notes/**/*.txt"]
/// ```
#[derive(Debug, Deserialize)]
pub struct IncludePyConfig {
	/// Where `includepy` sits in a preprocessor pipeline. Higher values run
	/// earlier.
	#[serde(default = "default_priority")]
	pub priority: i32,
	/// Directory, relative to the project root, that source paths in
	/// directives are resolved against. Defaults to the project root.
	#[serde(default)]
	pub base_dir: Option<PathBuf>,
	/// Python files larger than this are rejected. Defaults to 10 MB.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` files are not used to filter documents found
	/// while walking directories.
	#[serde(default)]
	pub disable_gitignore: bool,
	/// Documents to skip when walking directories.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Additional documents to process when walking directories.
	#[serde(default)]
	pub include: IncludeConfig,
}

impl Default for IncludePyConfig {
	fn default() -> Self {
		Self {
			priority: DEFAULT_PRIORITY,
			base_dir: None,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
			exclude: ExcludeConfig::default(),
			include: IncludeConfig::default(),
		}
	}
}

fn default_priority() -> i32 {
	DEFAULT_PRIORITY
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

/// Gitignore-style patterns, relative to the project root, for documents to
/// skip.
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Glob patterns, relative to the project root, for extra documents to
/// process beyond the markdown files found by default.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

impl IncludePyConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> IncludePyResult<Option<IncludePyConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)
			.map_err(|e| IncludePyError::io(config_path.display().to_string(), e))?;
		let config: IncludePyConfig =
			toml::from_str(&content).map_err(|e| IncludePyError::ConfigParse(e.to_string()))?;

		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Load the config at `root`, falling back to defaults when there is none.
	pub fn load_or_default(root: &Path) -> IncludePyResult<IncludePyConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	/// The directory that source paths resolve against for a project rooted
	/// at `root`.
	pub fn base_dir(&self, root: &Path) -> PathBuf {
		match &self.base_dir {
			Some(dir) => root.join(dir),
			None => root.to_path_buf(),
		}
	}

	/// Build the preprocessor described by this config for a project rooted
	/// at `root`.
	pub fn preprocessor(&self, root: &Path) -> IncludePy {
		IncludePy::new(
			Extractor::new(self.base_dir(root)).with_max_file_size(self.max_file_size),
		)
	}
}
