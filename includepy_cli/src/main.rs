use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use includepy_cli::Commands;
use includepy_cli::IncludePyCli;
use includepy_cli::OutputFormat;
use includepy_core::AnyEmptyResult;
use includepy_core::AnyResult;
use includepy_core::IncludePyConfig;
use includepy_core::IncludePyError;
use includepy_core::PREPROCESSOR_NAME;
use includepy_core::Pipeline;
use includepy_core::Preprocessor;
use includepy_core::project::CheckResult;
use includepy_core::project::ScanOptions;
use includepy_core::project::check_documents;
use includepy_core::project::collect_documents;
use includepy_core::project::normalize_line_endings;
use includepy_core::project::render_document;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = IncludePyCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Render { input, output }) => run_render(&args, input, output.as_deref()),
		Some(Commands::Check { paths, format }) => run_check(&args, paths, *format),
		Some(Commands::Diff { input }) => run_diff(&args, input),
		None => {
			eprintln!("No subcommand specified. Run `includepy --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Render core errors through miette so their codes and help text
		// are shown.
		match e.downcast::<IncludePyError>() {
			Ok(error) => {
				let report: miette::Report = (*error).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Send log events to stderr. `--verbose` forces debug output, otherwise
/// `RUST_LOG` decides and falls back to warnings only.
fn init_tracing(verbose: bool, use_color: bool) {
	let base_filter = if verbose {
		"debug".to_string()
	} else {
		std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string())
	};

	let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

	tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_target(true)
				.with_ansi(use_color)
				.with_writer(std::io::stderr)
				.compact(),
		)
		.init();
}

fn resolve_root(args: &IncludePyCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(root: &Path) -> AnyResult<Option<IncludePyConfig>> {
	let config = IncludePyConfig::load(root)?;
	if let Some(config) = &config {
		tracing::debug!(priority = config.priority, "using project config");
	}
	Ok(config)
}

/// Register the includepy preprocessor at its configured priority.
fn build_pipeline(root: &Path, config: Option<&IncludePyConfig>) -> Pipeline {
	let defaults = IncludePyConfig::default();
	let config = config.unwrap_or(&defaults);

	let mut pipeline = Pipeline::new();
	pipeline.register(config.preprocessor(root), PREPROCESSOR_NAME, config.priority);
	pipeline
}

fn is_stdin(input: &Path) -> bool {
	input.as_os_str() == "-"
}

/// Render `input` (a path, or `-` for stdin) through `pipeline`.
fn render_input(input: &Path, pipeline: &Pipeline) -> AnyResult<String> {
	if is_stdin(input) {
		let mut content = String::new();
		std::io::stdin().read_to_string(&mut content)?;
		return Ok(pipeline.run_text(&normalize_line_endings(&content))?);
	}

	Ok(render_document(input, pipeline)?)
}

fn run_render(args: &IncludePyCli, input: &Path, output: Option<&Path>) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let pipeline = build_pipeline(&root, config.as_ref());

	let rendered = render_input(input, &pipeline)?;

	match output {
		Some(output) => {
			std::fs::write(output, &rendered)?;
			if args.verbose {
				eprintln!(
					"{} {} -> {}",
					colored!("rendered", green),
					input.display(),
					output.display()
				);
			}
		}
		None => print!("{rendered}"),
	}

	Ok(())
}

fn run_check(args: &IncludePyCli, paths: &[PathBuf], format: OutputFormat) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let pipeline = build_pipeline(&root, config.as_ref());
	let options = ScanOptions::from_config(config.as_ref());

	let inputs = if paths.is_empty() {
		vec![root.clone()]
	} else {
		paths.to_vec()
	};
	let files = collect_documents(&root, &inputs, &options)?;
	tracing::debug!(documents = files.len(), "collected documents");
	let result = check_documents(&files, &pipeline);

	if args.verbose {
		for file in &result.passed {
			eprintln!("  {} {}", colored!("ok", green), make_relative(file, &root));
		}
	}

	print_check_result(&result, &root, format);

	if !result.is_ok() {
		process::exit(1);
	}

	Ok(())
}

fn print_check_result(result: &CheckResult, root: &Path, format: OutputFormat) {
	let checked = result.passed.len() + result.failures.len();

	match format {
		OutputFormat::Json => {
			let failures: Vec<serde_json::Value> = result
				.failures
				.iter()
				.map(|failure| {
					serde_json::json!({
						"file": make_relative(&failure.file, root),
						"message": failure.message,
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": result.is_ok(),
				"checked": checked,
				"failures": failures,
			});
			println!("{output}");
		}
		OutputFormat::Github => {
			for failure in &result.failures {
				let rel = make_relative(&failure.file, root);
				println!("::error file={rel}::{}", failure.message);
			}
			eprintln!("{}", check_summary(result));
		}
		OutputFormat::Text => {
			if result.is_ok() {
				println!("Check passed: {checked} document(s) rendered cleanly.");
				return;
			}

			eprintln!("{}", colored!("Check failed.", bold));
			for failure in &result.failures {
				let rel = make_relative(&failure.file, root);
				eprintln!("  {} {rel}: {}", colored!("error", red), failure.message);
			}
			eprintln!();
			eprintln!("{}", check_summary(result));
		}
	}
}

fn check_summary(result: &CheckResult) -> String {
	let checked = result.passed.len() + result.failures.len();
	if result.is_ok() {
		format!("{checked} document(s) rendered cleanly")
	} else {
		format!(
			"{} of {checked} document(s) failed to render",
			result.failures.len()
		)
	}
}

fn run_diff(args: &IncludePyCli, input: &Path) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let pipeline = build_pipeline(&root, config.as_ref());

	let current = std::fs::read_to_string(input)
		.map_err(|e| format!("failed to read `{}`: {e}", input.display()))?;
	let current = normalize_line_endings(&current);
	let rendered = pipeline.run_text(&current)?;

	if current == rendered {
		println!("No changes: {}", input.display());
		return Ok(());
	}

	println!("{}", colored!(format!("--- {}", input.display()), bold));
	println!("{}", colored!(format!("+++ {} (rendered)", input.display()), bold));
	print_diff(&current, &rendered);

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("{}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("{}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!(" {change}");
			}
		}
		if change.missing_newline() {
			println!();
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
