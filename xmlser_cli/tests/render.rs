mod common;

use predicates::prelude::PredicateBooleanExt;
use similar_asserts::assert_eq;
use xmlser_core::AnyEmptyResult;

const PEOPLE: &str = r#"{"people": [{"name": "Ada", "age": 36}, {"name": "Alan", "age": 41}]}"#;

#[test]
fn render_reads_stdin() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("<people<person*.people=name.name&.age>>")
		.write_stdin(PEOPLE)
		.assert()
		.success()
		.stdout(
			"<people><person name=\"Ada\">36</person><person \
			 name=\"Alan\">41</person></people>\n",
		);

	Ok(())
}

#[test]
fn render_reads_input_file_with_declaration() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("person.json");
	std::fs::write(&input, r#"{"name": "Ada"}"#)?;

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("-f")
		.arg("<person&.name>")
		.arg("--input")
		.arg(&input)
		.arg("--encoding")
		.arg("UTF-8")
		.assert()
		.success()
		.stdout("<?xml version=\"1.0\" encoding=\"UTF-8\"?><person>Ada</person>\n");

	Ok(())
}

#[test]
fn render_fragment_has_no_declaration() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("<person*.people&.name>")
		.arg("--fragment")
		.arg("--encoding")
		.arg("UTF-8")
		.write_stdin(PEOPLE)
		.assert()
		.success()
		.stdout("<person>Ada</person><person>Alan</person>\n");

	Ok(())
}

#[test]
fn render_named_template_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("xmlser.toml"),
		"encoding = \"UTF-8\"\n\n[templates]\nnames = { format = \"<name*.people&.name>\", \
		 fragment = true }\npeople = \"<people<person*.people=age.age>>\"\n",
	)?;

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--template")
		.arg("people")
		.write_stdin(PEOPLE)
		.assert()
		.success()
		.stdout(
			"<?xml version=\"1.0\" encoding=\"UTF-8\"?><people><person age=\"36\"></person><person \
			 age=\"41\"></person></people>\n",
		);

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("-t")
		.arg("names")
		.write_stdin(PEOPLE)
		.assert()
		.success()
		.stdout("<name>Ada</name><name>Alan</name>\n");

	Ok(())
}

#[test]
fn render_writes_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let output = tmp.path().join("out.xml");

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("<root&?>")
		.arg("--output")
		.arg(&output)
		.write_stdin("\"hello & goodbye\"")
		.assert()
		.success()
		.stdout("");

	assert_eq!(
		std::fs::read_to_string(&output)?,
		"<root>hello &amp; goodbye</root>"
	);

	Ok(())
}

#[test]
fn render_without_input_uses_null() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("<root<sub*2>>")
		.write_stdin("")
		.assert()
		.success()
		.stdout("<root><sub></sub><sub></sub></root>\n");

	Ok(())
}

#[test]
fn render_reports_format_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("<root<sub*abc>>")
		.write_stdin("{}")
		.assert()
		.code(2)
		.stdout("")
		.stderr(
			predicates::str::contains("xmlser::format")
				.and(predicates::str::contains("Invalid repetition at 10")),
		);

	Ok(())
}

#[test]
fn render_reports_missing_data() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("<root&.name>")
		.write_stdin(r#"{"title": "x"}"#)
		.assert()
		.code(2)
		.stderr(predicates::str::contains("lookup of `.name` failed: no such key"));

	Ok(())
}

#[test]
fn render_reports_invalid_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("<root>")
		.write_stdin("{not json")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse input data"));

	Ok(())
}

#[test]
fn render_reports_unknown_templates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::xmlser_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--template")
		.arg("nope")
		.write_stdin("{}")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unknown template: `nope`"));

	Ok(())
}
