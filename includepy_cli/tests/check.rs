mod common;

use clap::CommandFactory;
use includepy_cli::IncludePyCli;
use includepy_core::AnyEmptyResult;
use rstest::rstest;
use serde_json::Value;

const GOOD_DOC: &str = "# Good\n\n```python\n-->includepy<-- module.py\n-->pyobject<-- greet\n```\n";
const BAD_DOC: &str = "# Bad\n\n```python\n-->includepy<-- module.py\n-->pyobject<-- nope\n```\n";

fn project() -> std::io::Result<tempfile::TempDir> {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "module.py", common::MODULE)?;
	Ok(tmp)
}

#[test]
fn cli_definition_is_valid() {
	IncludePyCli::command().debug_assert();
}

#[test]
fn check_passes_when_every_directive_resolves() -> AnyEmptyResult {
	let tmp = project()?;
	common::write(tmp.path(), "readme.md", GOOD_DOC)?;
	common::write(tmp.path(), "docs/guide.md", "# Guide without directives\n")?;

	common::includepy_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Check passed: 2 document(s) rendered cleanly.",
		));

	Ok(())
}

#[test]
fn check_fails_when_a_directive_is_broken() -> AnyEmptyResult {
	let tmp = project()?;
	common::write(tmp.path(), "good.md", GOOD_DOC)?;
	common::write(tmp.path(), "bad.md", BAD_DOC)?;

	common::includepy_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("Check failed."))
		.stderr(predicates::str::contains("bad.md: Found 0 matches for nope"))
		.stderr(predicates::str::contains("1 of 2 document(s) failed to render"));

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = project()?;
	common::write(tmp.path(), "good.md", GOOD_DOC)?;
	common::write(tmp.path(), "bad.md", BAD_DOC)?;

	let output = common::includepy_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.get_output()
		.stdout
		.clone();

	let json: Value = serde_json::from_slice(&output)?;
	assert_eq!(json["ok"], Value::Bool(false));
	assert_eq!(json["checked"], Value::from(2));
	assert_eq!(json["failures"][0]["file"], Value::from("bad.md"));
	assert_eq!(
		json["failures"][0]["message"],
		Value::from("Found 0 matches for nope")
	);

	Ok(())
}

#[test]
fn check_github_annotations() -> AnyEmptyResult {
	let tmp = project()?;
	common::write(tmp.path(), "docs/bad.md", BAD_DOC)?;

	common::includepy_cmd()
		.arg("check")
		.arg("--format")
		.arg("github")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains(
			"::error file=docs/bad.md::Found 0 matches for nope",
		));

	Ok(())
}

#[rstest]
#[case::exclude_pattern("[exclude]\npatterns = [\"vendor/\"]\n", "vendor/bad.md")]
#[case::nested_project("", "nested/bad.md")]
#[case::hidden_directory("", ".cache/bad.md")]
fn check_skips_documents_outside_the_project(
	#[case] config: &str,
	#[case] bad_path: &str,
) -> AnyEmptyResult {
	let tmp = project()?;
	common::write(tmp.path(), "includepy.toml", config)?;
	common::write(tmp.path(), "readme.md", GOOD_DOC)?;
	common::write(tmp.path(), bad_path, BAD_DOC)?;
	common::write(tmp.path(), "nested/includepy.toml", "")?;

	common::includepy_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	Ok(())
}

#[test]
fn check_includes_configured_patterns() -> AnyEmptyResult {
	let tmp = project()?;
	common::write(
		tmp.path(),
		"includepy.toml",
		"[include]\npatterns = [\"notes/*.txt\"]\n",
	)?;
	common::write(tmp.path(), "notes/todo.txt", BAD_DOC)?;

	common::includepy_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("notes/todo.txt"));

	Ok(())
}

#[test]
fn check_explicit_paths() -> AnyEmptyResult {
	let tmp = project()?;
	common::write(tmp.path(), "good.md", GOOD_DOC)?;
	common::write(tmp.path(), "bad.md", BAD_DOC)?;

	common::includepy_cmd()
		.arg("check")
		.arg(tmp.path().join("good.md"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("1 document(s)"));

	Ok(())
}

#[test]
fn check_reports_invalid_config() -> AnyEmptyResult {
	let tmp = project()?;
	common::write(tmp.path(), "includepy.toml", "priority = \"first\"\n")?;

	common::includepy_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}
