mod common;

use ziggurat_core::AnyEmptyResult;

#[test]
fn tree_prints_syntax_tree() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("t.txt"),
		"Hi {name|upper}\n@for i in xs@{i}@endfor@",
	)?;

	let expected = "Block([
  Text(\"Hi \")
  Lookup(name | upper)
  Text(\"\\n\")
  For(
    name=i
    iterator=xs
    Block([
      Lookup(i)
    ])
  )
])
";

	let mut cmd = common::ziggurat_cmd();
	let _ = cmd
		.arg("tree")
		.arg("t.txt")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(expected);

	Ok(())
}

#[test]
fn tree_reports_syntax_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("t.txt"), "@iff x@")?;

	let mut cmd = common::ziggurat_cmd();
	let _ = cmd
		.arg("tree")
		.arg("t.txt")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("ziggurat::syntax"));

	Ok(())
}
