mod common;

use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;
use ziggurat_core::AnyEmptyResult;

#[test]
fn check_passes_for_valid_templates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("a.txt"), "@if x@{x}@endif@")?;
	std::fs::write(tmp.path().join("b.txt"), "@macro m(a)@{a}@endmacro@{!m a='1'}")?;

	let mut cmd = common::ziggurat_cmd();
	let _ = cmd
		.arg("check")
		.arg("a.txt")
		.arg("b.txt")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("ok a.txt"))
		.stdout(predicates::str::contains("All 2 templates parsed."));

	Ok(())
}

#[test]
fn check_fails_for_syntax_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("good.txt"), "{name}")?;
	std::fs::write(tmp.path().join("bad.txt"), "@if x@never closed")?;

	let mut cmd = common::ziggurat_cmd();
	let _ = cmd
		.arg("check")
		.arg("good.txt")
		.arg("bad.txt")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(
			predicates::str::contains("failed bad.txt")
				.and(predicates::str::contains("1 of 2 templates failed to parse.")),
		)
		.stderr(predicates::str::contains("ziggurat::syntax"));

	Ok(())
}

#[test]
fn check_does_not_follow_includes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("page.txt"), "@include missing.txt@")?;

	let mut cmd = common::ziggurat_cmd();
	let _ = cmd
		.arg("check")
		.arg("page.txt")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("bad.txt"), "{}")?;

	let mut cmd = common::ziggurat_cmd();
	let output = cmd
		.arg("check")
		.arg("bad.txt")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert_eq!(output.status.code(), Some(1));
	let report: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(report["ok"], false);
	assert_eq!(report["checked"], 1);
	assert_eq!(report["templates"][0]["path"], "bad.txt");
	assert_eq!(report["templates"][0]["kind"], "syntax");

	Ok(())
}

#[test]
fn check_requires_a_template() {
	let mut cmd = common::ziggurat_cmd();
	let _ = cmd.arg("check").assert().failure();
}
