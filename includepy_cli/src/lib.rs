use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Render python functions and classes into markdown documents.",
	long_about = "includepy replaces directive blocks in markdown documents with the source of \
	              the python object they name, so documentation always shows the real \
	              code.\n\nA block looks like:\n  -->includepy<-- path/to/module.py\n  \
	              -->pyobject<-- Outer.inner\n\nQuick start:\n  includepy render README.md   \
	              Print the rendered document\n  includepy check              Verify every \
	              directive resolves\n  includepy diff README.md     Show what rendering would \
	              change"
)]
pub struct IncludePyCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. Relative python paths in
	/// directives resolve against it unless `base_dir` is configured.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output and debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Render one document and print the result.
	///
	/// Every directive block is replaced with the python code it names. Use
	/// `-` as the input to read the document from stdin.
	Render {
		/// The document to render, or `-` for stdin.
		input: PathBuf,

		/// Write the rendered document to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// Check that every directive in a set of documents resolves.
	///
	/// Directories are walked for markdown documents (`.md`, `.mdx`,
	/// `.markdown`) plus any files matching `[include].patterns` in
	/// `includepy.toml`. Exits with a non-zero status code if any document
	/// fails to render.
	Check {
		/// Documents or directories to check. Defaults to the project root.
		paths: Vec<PathBuf>,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Show a unified diff between a document and its rendered form.
	Diff {
		/// The document to compare.
		input: PathBuf,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each failure includes the
	/// document path and the error message.
	Json,
	/// GitHub Actions annotation format. Emits one `::error` annotation per
	/// failing document.
	Github,
}
